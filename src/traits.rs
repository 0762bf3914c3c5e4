use crate::LocalStrip;
use anyhow::Result;
use std::future::Future;

/// Boundary synchronization between row-adjacent workers.
pub trait HaloExchanger: Send {
    /// Refreshes both halo rows of `strip` for the current generation.
    ///
    /// The first owned row goes to the previous worker and the last owned
    /// row to the next worker, while the previous worker's last row lands in
    /// the top halo and the next worker's first row in the bottom halo.
    /// All four transfers are in flight at the same time and awaited
    /// together, so a ring of workers calling this simultaneously cannot
    /// deadlock.
    ///
    /// # Postcondition
    ///
    /// When the future resolves, the halo rows hold the neighbors' rows of
    /// the same generation as the owned rows of `strip`.
    ///
    /// # Errors
    ///
    /// Returns an error if a peer is gone or sends a row that does not match
    /// this generation or width. Both are fatal for the run.
    fn exchange(&mut self, strip: &mut LocalStrip) -> impl Future<Output = Result<()>> + Send;

    /// Number of exchanges completed so far, i.e. the generation whose halos
    /// the next call will deliver.
    fn generation(&self) -> u64;
}
