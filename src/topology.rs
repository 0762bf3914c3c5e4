/// Ring of workers along the partitioned axis.
///
/// The previous and next ranks wrap around, which stitches the top and
/// bottom edges of the grid together. Columns wrap inside each strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ring {
    rank: usize,
    workers: usize,
}

impl Ring {
    pub fn new(rank: usize, workers: usize) -> Self {
        assert!(rank < workers, "rank {} outside of a ring of {}", rank, workers);
        Self { rank, workers }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Owner of the strip above this one.
    pub fn prev(&self) -> usize {
        (self.rank + self.workers - 1) % self.workers
    }

    /// Owner of the strip below this one.
    pub fn next(&self) -> usize {
        (self.rank + 1) % self.workers
    }
}
