use anyhow::{anyhow, Result};

/// Static split of the grid rows into contiguous horizontal strips.
///
/// Every worker owns `height / workers` rows; the last worker also absorbs
/// the remainder `height % workers`. The split never changes during a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Partition {
    height: usize,
    workers: usize,
}

impl Partition {
    /// Splits `height` rows between `workers` strips.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no workers, no rows, or more workers
    /// than rows (some strips would be empty).
    pub fn new(height: usize, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(anyhow!("At least one worker is required"));
        }
        if height == 0 {
            return Err(anyhow!("Grid height must be positive"));
        }
        if workers > height {
            return Err(anyhow!(
                "Cannot split {} rows between {} workers: every worker must own at least one row",
                height,
                workers
            ));
        }
        Ok(Self { height, workers })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Number of rows owned by `rank`.
    pub fn rows(&self, rank: usize) -> usize {
        assert!(rank < self.workers, "rank {} out of range", rank);
        let base = self.height / self.workers;
        if rank == self.workers - 1 {
            base + self.height % self.workers
        } else {
            base
        }
    }

    /// Global index of the first row owned by `rank`.
    pub fn first_row(&self, rank: usize) -> usize {
        assert!(rank < self.workers, "rank {} out of range", rank);
        rank * (self.height / self.workers)
    }

    /// Rank of the worker owning global row `row`.
    pub fn owner_of(&self, row: usize) -> usize {
        assert!(row < self.height, "row {} out of range", row);
        (row / (self.height / self.workers)).min(self.workers - 1)
    }

    /// Iterates over `(rank, first_row, rows)` of every strip.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        (0..self.workers).map(|rank| (rank, self.first_row(rank), self.rows(rank)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes_cover_height() {
        for height in 1..64 {
            for workers in 1..=height {
                let partition = Partition::new(height, workers).unwrap();
                let total: usize = partition.iter().map(|(_, _, rows)| rows).sum();
                assert_eq!(total, height, "H={} P={}", height, workers);
                assert!(partition.iter().all(|(_, _, rows)| rows > 0));
            }
        }
    }

    #[test]
    fn test_strips_are_contiguous() {
        let partition = Partition::new(2048, 7).unwrap();
        let mut expected_first = 0;
        for (rank, first, rows) in partition.iter() {
            assert_eq!(first, expected_first, "rank {}", rank);
            expected_first += rows;
        }
        assert_eq!(expected_first, 2048);
        assert_eq!(partition.rows(6), 2048 / 7 + 2048 % 7);
    }

    #[test]
    fn test_owner_of_matches_strips() {
        for (height, workers) in [(10, 3), (17, 5), (7, 7), (100, 1)] {
            let partition = Partition::new(height, workers).unwrap();
            for (rank, first, rows) in partition.iter() {
                for row in first..first + rows {
                    assert_eq!(partition.owner_of(row), rank);
                }
            }
        }
    }

    #[test]
    fn test_infeasible_partitions() {
        assert!(Partition::new(8, 0).is_err());
        assert!(Partition::new(0, 1).is_err());
        let err = Partition::new(4, 5).unwrap_err();
        assert!(err.to_string().contains("4 rows between 5 workers"));
    }
}
