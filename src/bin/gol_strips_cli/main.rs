mod layout;
mod run;
mod util;

use anyhow::Result;
use clap::{Parser, Subcommand};
use layout::{run_layout, LayoutArgs};
use run::{run_simulation, RunArgs};

#[derive(Parser, Debug)]
#[command(version, about)]
struct CLIParser {
    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand, Debug)]
enum Action {
    /// Run the simulation on a torus split into row strips, one worker per strip
    Run(RunArgs),
    /// Print which rows every worker would own
    Layout(LayoutArgs),
}

fn main() -> Result<()> {
    env_logger::init();
    let args = CLIParser::parse();

    match args.action {
        Action::Run(args) => run_simulation(args),
        Action::Layout(args) => run_layout(args),
    }
}
