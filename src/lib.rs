#![warn(clippy::all)]

mod cluster;
mod config;
mod exchange;
mod neighbors;
mod partition;
mod pattern;
mod reduce;
mod report;
mod simulation;
mod strip;
mod topology;
mod traits;
mod update;
mod worker;

pub use cluster::run_cluster;
pub use config::{Config, DEFAULT_GENERATIONS, DEFAULT_SIZE};
pub use exchange::{exchange_all, ChannelExchanger, HaloMessage, LoopbackExchanger};
pub use neighbors::{count_neighbors, count_neighbors_in_rows};
pub use partition::Partition;
pub use pattern::Pattern;
pub use reduce::{GlobalReducer, Tally};
pub use report::RunReport;
pub use simulation::Simulation;
pub use strip::{Cell, HaloSide, LocalStrip};
pub use topology::Ring;
pub use traits::HaloExchanger;
pub use update::{next_state, update_strip};
pub use worker::{Phase, Worker};

pub const VERSION: &str = "0.1.0";

/// Rank of the worker that aggregates populations and prints the report.
pub const COORDINATOR: usize = 0;

use std::sync::atomic::AtomicU32;
/// Worker threads of the runtime built by [`run_cluster`], 0 means tokio's default.
pub static RUNTIME_THREADS: AtomicU32 = AtomicU32::new(0);
