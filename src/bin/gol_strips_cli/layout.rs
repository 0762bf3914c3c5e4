use clap::Args;
use gol_strips::{Partition, Ring};

#[derive(Args, Debug)]
pub(super) struct LayoutArgs {
    /// Number of rows of the grid
    #[arg(long, default_value_t = gol_strips::DEFAULT_SIZE)]
    height: usize,

    /// The number of workers sharing the rows
    #[arg(short, long)]
    workers: usize,
}

pub(super) fn run_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let partition = Partition::new(args.height, args.workers)?;
    println!("{:>6} {:>6} {:>10} {:>6} {:>6}", "rank", "prev", "rows", "count", "next");
    for (rank, first_row, rows) in partition.iter() {
        let ring = Ring::new(rank, partition.workers());
        println!(
            "{:>6} {:>6} {:>10} {:>6} {:>6}",
            rank,
            ring.prev(),
            format!("{}..{}", first_row, first_row + rows),
            rows,
            ring.next()
        );
    }
    Ok(())
}
