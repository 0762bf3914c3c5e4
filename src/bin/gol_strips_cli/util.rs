use chrono::Local;
use num_format::{CustomFormat, Grouping, ToFormattedString};

pub(super) fn print_population(population: u64) {
    let fmt = CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator("_")
        .build()
        .unwrap();
    println!("Population: {}", population.to_formatted_string(&fmt));
}

pub(super) fn local_time() -> String {
    Local::now().format("%Y-%m-%dT%H:%M:%S%.3f").to_string()
}

/// Parses `ROW,COL`.
pub(super) fn parse_offset(s: &str) -> Result<(usize, usize), String> {
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected ROW,COL, got {:?}", s))?;
    let parse = |x: &str| x.trim().parse::<usize>().map_err(|err| err.to_string());
    Ok((parse(row)?, parse(col)?))
}
