use crate::{Cell, HaloExchanger, HaloSide, LocalStrip, Ring};
use anyhow::{anyhow, bail, Result};
use log::trace;
use tokio::sync::mpsc::{self, Receiver, Sender};

/// A worker is at most one generation ahead of its ring neighbors, so two
/// messages per link never block a sender.
const HALO_CHANNEL_CAPACITY: usize = 2;

/// One boundary row in flight between two workers.
#[derive(Debug)]
pub struct HaloMessage {
    /// Generation of the sender's owned rows when the row was taken.
    pub generation: u64,
    pub row: Vec<Cell>,
}

/// Exchanges halo rows with the ring neighbors over tokio channels.
///
/// Workers share nothing but these channels: every row is copied into a
/// message, so the sender may start overwriting its buffers right away.
pub struct ChannelExchanger {
    ring: Ring,
    generation: u64,
    /// Own first row, lands in the bottom halo of the previous worker.
    to_prev: Sender<HaloMessage>,
    /// Own last row, lands in the top halo of the next worker.
    to_next: Sender<HaloMessage>,
    from_prev: Receiver<HaloMessage>,
    from_next: Receiver<HaloMessage>,
}

impl ChannelExchanger {
    /// Wires up a full ring; element `r` of the result belongs to rank `r`.
    pub fn ring(workers: usize) -> Vec<Self> {
        assert!(workers > 0, "a ring needs at least one worker");
        // `down` links carry last rows from rank r to r + 1,
        // `up` links carry first rows from rank r to r - 1
        let (down_tx, mut down_rx): (Vec<_>, Vec<_>) = (0..workers)
            .map(|_| mpsc::channel(HALO_CHANNEL_CAPACITY))
            .unzip();
        let (up_tx, mut up_rx): (Vec<_>, Vec<_>) = (0..workers)
            .map(|_| mpsc::channel(HALO_CHANNEL_CAPACITY))
            .unzip();
        // rank r reads the down link of r - 1 and the up link of r + 1
        down_rx.rotate_right(1);
        up_rx.rotate_left(1);

        down_tx
            .into_iter()
            .zip(up_tx)
            .zip(down_rx.into_iter().zip(up_rx))
            .enumerate()
            .map(|(rank, ((to_next, to_prev), (from_prev, from_next)))| Self {
                ring: Ring::new(rank, workers),
                generation: 0,
                to_prev,
                to_next,
                from_prev,
                from_next,
            })
            .collect()
    }
}

impl HaloExchanger for ChannelExchanger {
    async fn exchange(&mut self, strip: &mut LocalStrip) -> Result<()> {
        let generation = self.generation;
        let (prev, next) = (self.ring.prev(), self.ring.next());
        let up = HaloMessage {
            generation,
            row: strip.first_owned_row().to_vec(),
        };
        let down = HaloMessage {
            generation,
            row: strip.last_owned_row().to_vec(),
        };

        let (to_prev, to_next) = (&self.to_prev, &self.to_next);
        let (from_prev, from_next) = (&mut self.from_prev, &mut self.from_next);
        let hung_up = |peer: usize| anyhow!("Worker {} hung up during generation {}", peer, generation);
        let (_, _, top, bottom) = tokio::try_join!(
            async move { to_prev.send(up).await.map_err(|_| hung_up(prev)) },
            async move { to_next.send(down).await.map_err(|_| hung_up(next)) },
            async move { from_prev.recv().await.ok_or_else(|| hung_up(prev)) },
            async move { from_next.recv().await.ok_or_else(|| hung_up(next)) },
        )?;

        for (side, peer, message) in [(HaloSide::Top, prev, top), (HaloSide::Bottom, next, bottom)] {
            if message.generation != generation {
                bail!(
                    "Worker {} sent a halo row of generation {} while worker {} is at generation {}",
                    peer,
                    message.generation,
                    self.ring.rank(),
                    generation
                );
            }
            if message.row.len() != strip.width() {
                bail!(
                    "Worker {} sent a halo row of {} cells, expected {}",
                    peer,
                    message.row.len(),
                    strip.width()
                );
            }
            strip.set_halo(side, &message.row);
        }
        trace!(
            "worker {}: exchanged halos of generation {}",
            self.ring.rank(),
            generation
        );
        self.generation += 1;
        Ok(())
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// Halo exchange of a worker that is alone in its ring: both halos are
/// copies of its own boundary rows.
#[derive(Default)]
pub struct LoopbackExchanger {
    generation: u64,
}

impl HaloExchanger for LoopbackExchanger {
    async fn exchange(&mut self, strip: &mut LocalStrip) -> Result<()> {
        exchange_all(std::slice::from_mut(strip));
        self.generation += 1;
        Ok(())
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

/// Refreshes the halos of a whole ring of strips held by one process,
/// copying boundary rows directly between the buffers.
///
/// `strips[r]` must be the strip of rank `r`.
pub fn exchange_all(strips: &mut [LocalStrip]) {
    let boundaries: Vec<_> = strips
        .iter()
        .map(|s| (s.first_owned_row().to_vec(), s.last_owned_row().to_vec()))
        .collect();
    let workers = strips.len();
    for (rank, strip) in strips.iter_mut().enumerate() {
        let ring = Ring::new(rank, workers);
        strip.set_halo(HaloSide::Top, &boundaries[ring.prev()].1);
        strip.set_halo(HaloSide::Bottom, &boundaries[ring.next()].0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strip::ALIVE;

    /// Strip of `rank` whose row `i` is filled with `10 * rank + i`, so every
    /// row is recognizable after an exchange.
    fn tagged_strip(rank: usize, rows: usize, width: usize) -> LocalStrip {
        let mut strip = LocalStrip::new(rows, width, rank * rows).unwrap();
        let (_, next) = strip.buffers_mut();
        for i in 1..=rows {
            next[i * width..(i + 1) * width].fill((10 * rank + i) as Cell);
        }
        strip.swap();
        strip
    }

    fn assert_halos(strip: &LocalStrip, top: Cell, bottom: Cell) {
        assert!(strip.halo(HaloSide::Top).iter().all(|&c| c == top));
        assert!(strip.halo(HaloSide::Bottom).iter().all(|&c| c == bottom));
    }

    #[test]
    fn test_exchange_all_ring() {
        let mut strips: Vec<_> = (0..3).map(|r| tagged_strip(r, 2, 4)).collect();
        exchange_all(&mut strips);
        assert_halos(&strips[0], 22, 11);
        assert_halos(&strips[1], 2, 21);
        assert_halos(&strips[2], 12, 1);
    }

    #[test]
    fn test_exchange_all_single_strip() {
        let mut strips = vec![tagged_strip(0, 3, 5)];
        exchange_all(&mut strips);
        assert_halos(&strips[0], 3, 1);
    }

    #[tokio::test]
    async fn test_loopback_matches_direct_copy() {
        let mut strip = tagged_strip(0, 4, 3);
        let mut exchanger = LoopbackExchanger::default();
        exchanger.exchange(&mut strip).await.unwrap();
        assert_halos(&strip, 4, 1);
        assert_eq!(exchanger.generation(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_channel_ring() {
        for workers in [1, 2, 3, 5] {
            let handles: Vec<_> = ChannelExchanger::ring(workers)
                .into_iter()
                .enumerate()
                .map(|(rank, mut exchanger)| {
                    tokio::spawn(async move {
                        let mut strip = tagged_strip(rank, 2, 4);
                        for _ in 0..3 {
                            exchanger.exchange(&mut strip).await.unwrap();
                        }
                        (exchanger.generation(), strip)
                    })
                })
                .collect();

            let mut strips = Vec::new();
            for handle in handles {
                let (generation, strip) = handle.await.unwrap();
                assert_eq!(generation, 3);
                strips.push(strip);
            }
            for (rank, strip) in strips.iter().enumerate() {
                let ring = Ring::new(rank, workers);
                assert_halos(strip, (10 * ring.prev() + 2) as Cell, (10 * ring.next() + 1) as Cell);
            }
        }
    }

    #[tokio::test]
    async fn test_channel_peer_gone() {
        let mut ring = ChannelExchanger::ring(2);
        drop(ring.pop());
        let mut exchanger = ring.pop().unwrap();
        let mut strip = tagged_strip(0, 2, 4);
        let err = exchanger.exchange(&mut strip).await.unwrap_err();
        assert!(err.to_string().contains("hung up"), "{}", err);
    }

    #[tokio::test]
    async fn test_channel_rejects_wrong_width() {
        let mut ring = ChannelExchanger::ring(2);
        let mut second = ring.pop().unwrap();
        let mut first = ring.pop().unwrap();
        let (a, b) = tokio::join!(
            async move { first.exchange(&mut tagged_strip(0, 2, 4)).await },
            async move { second.exchange(&mut tagged_strip(1, 2, 5)).await },
        );
        assert!(a.unwrap_err().to_string().contains("expected 4"));
        assert!(b.unwrap_err().to_string().contains("expected 5"));
    }

    #[tokio::test]
    async fn test_channel_rejects_stale_generation() {
        let mut exchanger = ChannelExchanger::ring(1).pop().unwrap();
        // a lone worker is its own neighbor: this lands in its top halo
        // queue ahead of the row of generation 0
        exchanger
            .to_next
            .send(HaloMessage {
                generation: 9,
                row: vec![ALIVE; 4],
            })
            .await
            .unwrap();
        let mut strip = tagged_strip(0, 2, 4);
        let err = exchanger.exchange(&mut strip).await.unwrap_err();
        assert!(
            err.to_string().contains("sent a halo row of generation 9"),
            "{}",
            err
        );
        assert_eq!(exchanger.generation(), 0);
    }
}
