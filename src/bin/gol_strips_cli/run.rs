use crate::util::{local_time, parse_offset, print_population};
use anyhow::{Context, Result};
use clap::Args;
use gol_strips::{
    run_cluster, Config, Pattern, RunReport, Simulation, DEFAULT_GENERATIONS, DEFAULT_SIZE,
    RUNTIME_THREADS,
};
use std::sync::atomic::Ordering;

#[derive(Args, Debug)]
pub(super) struct RunArgs {
    /// Side length of the square grid
    #[arg(short, long, default_value_t = DEFAULT_SIZE)]
    size: usize,

    /// Number of rows, overrides `size`
    #[arg(long)]
    height: Option<usize>,

    /// Number of columns, overrides `size`
    #[arg(long)]
    width: Option<usize>,

    /// The number of generations to simulate
    #[arg(short, long, default_value_t = DEFAULT_GENERATIONS)]
    generations: u64,

    /// The number of workers (row strips), defaults to the number of CPUs
    #[arg(short, long)]
    workers: Option<usize>,

    /// The number of runtime threads executing the workers, defaults to the number of CPUs
    #[arg(short, long)]
    threads: Option<u32>,

    /// Path to an .rle file with the initial pattern; a glider and an R-pentomino are used by default
    #[arg(short, long, conflicts_with = "random")]
    pattern: Option<String>,

    /// Where the top-left corner of the pattern file is placed, as ROW,COL
    #[arg(long, value_parser = parse_offset, default_value = "0,0", requires = "pattern")]
    at: (usize, usize),

    /// Fill the grid randomly, every cell being alive with this probability
    #[arg(short, long)]
    random: Option<f64>,

    /// Seed for `random`, seeds from the OS if omitted
    #[arg(long, requires = "random")]
    seed: Option<u64>,

    /// Advance all strips in lockstep on the current thread, copying halo rows directly
    #[arg(long)]
    sequential: bool,

    /// Do not print the population of every generation
    #[arg(short, long)]
    quiet: bool,
}

pub(super) fn run_simulation(args: RunArgs) -> Result<()> {
    if let Some(threads) = args.threads {
        RUNTIME_THREADS.store(threads, Ordering::Relaxed);
    }
    let height = args.height.unwrap_or(args.size);
    let width = args.width.unwrap_or(args.size);

    let timer = std::time::Instant::now();
    let pattern = match (&args.pattern, args.random) {
        (Some(path), _) => Pattern::from_file(path)?
            .placed_at(args.at.0, args.at.1)
            .context("Invalid pattern offset")?,
        (None, Some(density)) => Pattern::random(height, width, density, args.seed)?,
        (None, None) => Pattern::demo(),
    };
    println!(
        "Loaded pattern of {} cells in {:.1} secs",
        pattern.population(),
        timer.elapsed().as_secs_f64()
    );

    let mut config = Config::default()
        .with_dimensions(height, width)
        .with_generations(args.generations)
        .with_pattern(pattern)
        .with_echo(!args.quiet);
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }

    println!(
        "[{}] Running {} generations of a {}x{} torus on {} workers",
        local_time(),
        config.generations,
        config.height,
        config.width,
        config.workers
    );
    let report: RunReport = if args.sequential {
        let mut simulation = Simulation::new(&config)?;
        simulation.run(config.generations, config.echo)
    } else {
        run_cluster(&config).context("Simulation failed")?
    };
    println!("{}", report.elapsed_line());
    if let Some(population) = report.final_population() {
        print_population(population);
    }
    Ok(())
}
