use crate::{
    update_strip, Config, GlobalReducer, HaloExchanger, LocalStrip, Partition, Ring, RunReport,
};
use anyhow::{bail, Context, Result};
use log::debug;

/// Where a worker is in its run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Strip allocated and seeded, no generation computed yet.
    Init,
    /// The next call to [`Worker::step`] computes this generation (0-based).
    Running(u64),
    Done,
}

/// One worker of the ring: owns a strip and drives it through the
/// generations, talking to its peers only through the exchanger and the
/// reducer.
pub struct Worker<E: HaloExchanger> {
    ring: Ring,
    strip: LocalStrip,
    exchanger: E,
    reducer: GlobalReducer,
    generations: u64,
    echo: bool,
    phase: Phase,
}

impl<E: HaloExchanger> Worker<E> {
    /// Allocates the strip of `ring.rank()` and seeds the pattern cells it
    /// owns. `config` must have passed [`Config::validate`].
    pub fn new(
        ring: Ring,
        partition: &Partition,
        config: &Config,
        exchanger: E,
        reducer: GlobalReducer,
    ) -> Result<Self> {
        let rank = ring.rank();
        let mut strip =
            LocalStrip::new(partition.rows(rank), config.width, partition.first_row(rank))
                .with_context(|| format!("Worker {} failed to allocate its strip", rank))?;
        let seeded = strip.seed(&config.pattern);
        debug!(
            "worker {}: rows {}..{}, {} seeded cells",
            rank,
            strip.first_row(),
            strip.first_row() + strip.rows(),
            seeded
        );
        Ok(Self {
            ring,
            strip,
            exchanger,
            reducer,
            generations: config.generations,
            echo: config.echo,
            phase: Phase::Init,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn strip(&self) -> &LocalStrip {
        &self.strip
    }

    /// Computes one generation: exchange halos, update, promote the next
    /// buffer, reduce. Returns the global population on the coordinator.
    pub async fn step(&mut self) -> Result<Option<u64>> {
        let generation = match self.phase {
            Phase::Init if self.generations > 0 => 0,
            Phase::Running(generation) => generation,
            _ => bail!("Worker {} has no generations left", self.ring.rank()),
        };

        self.exchanger.exchange(&mut self.strip).await?;
        let alive = update_strip(&mut self.strip);
        self.strip.swap();
        let total = self.reducer.reduce(generation, alive).await?;
        if let (Some(total), true) = (total, self.echo) {
            println!("{}", RunReport::generation_line(generation + 1, total));
        }

        self.phase = if generation + 1 == self.generations {
            Phase::Done
        } else {
            Phase::Running(generation + 1)
        };
        Ok(total)
    }

    /// Runs all remaining generations. Returns the global population of
    /// every generation on the coordinator, `None` elsewhere.
    pub async fn run(&mut self) -> Result<Option<Vec<u64>>> {
        if self.generations == 0 {
            self.phase = Phase::Done;
        }
        let mut counts = self.reducer.is_coordinator().then(Vec::new);
        while self.phase != Phase::Done {
            let total = self.step().await?;
            if let (Some(counts), Some(total)) = (counts.as_mut(), total) {
                counts.push(total);
            }
        }
        debug!(
            "worker {}: done after {} exchanges",
            self.ring.rank(),
            self.exchanger.generation()
        );
        Ok(counts)
    }
}
