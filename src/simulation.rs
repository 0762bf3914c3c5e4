use crate::{exchange_all, update_strip, Config, LocalStrip, Partition, RunReport};
use anyhow::{Context, Result};
use std::time::Instant;

/// All strips of a run held by a single process and advanced in lockstep.
///
/// Halo rows are copied directly between the strips instead of being sent as
/// messages, which makes this the reference the message-passing run must
/// agree with, whatever the number of strips.
pub struct Simulation {
    partition: Partition,
    strips: Vec<LocalStrip>,
    generation: u64,
}

impl Simulation {
    pub fn new(config: &Config) -> Result<Self> {
        let partition = config.validate()?;
        let mut strips = Vec::with_capacity(partition.workers());
        for (rank, first_row, rows) in partition.iter() {
            let mut strip = LocalStrip::new(rows, config.width, first_row)
                .with_context(|| format!("Failed to allocate the strip of worker {}", rank))?;
            strip.seed(&config.pattern);
            strips.push(strip);
        }
        Ok(Self {
            partition,
            strips,
            generation: 0,
        })
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn strips(&self) -> &[LocalStrip] {
        &self.strips
    }

    /// Number of generations computed so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Advances every strip by one generation and returns the global
    /// population.
    pub fn step(&mut self) -> u64 {
        exchange_all(&mut self.strips);
        let alive: u64 = self.strips.iter_mut().map(update_strip).sum();
        for strip in self.strips.iter_mut() {
            strip.swap();
        }
        self.generation += 1;
        alive
    }

    /// Runs `generations` steps; with `echo`, prints every generation line
    /// as it is computed.
    pub fn run(&mut self, generations: u64, echo: bool) -> RunReport {
        let timer = Instant::now();
        let mut counts = Vec::new();
        for _ in 0..generations {
            let alive = self.step();
            if echo {
                println!("{}", RunReport::generation_line(self.generation, alive));
            }
            counts.push(alive);
        }
        RunReport {
            counts,
            elapsed: timer.elapsed(),
        }
    }

    pub fn population(&self) -> u64 {
        self.strips.iter().map(LocalStrip::population).sum()
    }

    /// Alive cells of the whole grid in row-major order.
    pub fn alive_cells(&self) -> Vec<(usize, usize)> {
        self.strips.iter().flat_map(LocalStrip::alive_cells).collect()
    }
}
