use crate::COORDINATOR;
use ahash::AHashMap as HashMap;
use anyhow::{anyhow, bail, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Local population of one worker after one generation.
#[derive(Clone, Copy, Debug)]
pub struct Tally {
    pub rank: usize,
    pub generation: u64,
    pub alive: u64,
}

/// Sums the local populations of all workers at the coordinator.
///
/// Members never wait: they post their tally and carry on, so the
/// coordinator may receive tallies of later generations before the current
/// one is complete. Those are kept aside until their turn comes.
pub enum GlobalReducer {
    Coordinator {
        workers: usize,
        from_members: UnboundedReceiver<Tally>,
        /// generation -> (sum so far, contributions so far)
        pending: HashMap<u64, (u64, usize)>,
    },
    Member {
        rank: usize,
        to_coordinator: UnboundedSender<Tally>,
    },
}

impl GlobalReducer {
    /// Creates the reducers of all workers; element `r` belongs to rank `r`
    /// and element [`COORDINATOR`] is the coordinator.
    pub fn group(workers: usize) -> Vec<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut coordinator = Some(Self::Coordinator {
            workers,
            from_members: rx,
            pending: HashMap::new(),
        });
        (0..workers)
            .map(|rank| {
                if rank == COORDINATOR {
                    coordinator.take().expect("single coordinator")
                } else {
                    Self::Member {
                        rank,
                        to_coordinator: tx.clone(),
                    }
                }
            })
            .collect()
    }

    pub fn is_coordinator(&self) -> bool {
        matches!(self, Self::Coordinator { .. })
    }

    /// Contributes `alive` cells for `generation`.
    ///
    /// Returns the global population on the coordinator, `None` elsewhere.
    /// Generations must be reduced in increasing order.
    pub async fn reduce(&mut self, generation: u64, alive: u64) -> Result<Option<u64>> {
        match self {
            Self::Member {
                rank,
                to_coordinator,
            } => {
                to_coordinator
                    .send(Tally {
                        rank: *rank,
                        generation,
                        alive,
                    })
                    .map_err(|_| anyhow!("Coordinator hung up during generation {}", generation))?;
                Ok(None)
            }
            Self::Coordinator {
                workers,
                from_members,
                pending,
            } => {
                Self::add(pending, generation, alive);
                while pending[&generation].1 < *workers {
                    let tally = from_members.recv().await.ok_or_else(|| {
                        anyhow!("A worker hung up before reducing generation {}", generation)
                    })?;
                    if tally.generation < generation {
                        bail!(
                            "Worker {} reported generation {} after it was reduced",
                            tally.rank,
                            tally.generation
                        );
                    }
                    Self::add(pending, tally.generation, tally.alive);
                }
                let (total, _) = pending
                    .remove(&generation)
                    .expect("generation was just completed");
                Ok(Some(total))
            }
        }
    }

    fn add(pending: &mut HashMap<u64, (u64, usize)>, generation: u64, alive: u64) {
        let entry = pending.entry(generation).or_insert((0, 0));
        entry.0 += alive;
        entry.1 += 1;
    }
}
