use crate::{Partition, Pattern};
use anyhow::{Context, Result};

/// Side length of the default square grid.
pub const DEFAULT_SIZE: usize = 2048;
pub const DEFAULT_GENERATIONS: u64 = 2000;

/// Parameters of one run. They stay fixed for the whole run.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub width: usize,
    pub height: usize,
    pub generations: u64,
    pub workers: usize,
    /// Alive cells at generation 0, in absolute grid coordinates.
    pub pattern: Pattern,
    /// Print `Generation <n>: <alive>` as soon as each generation is reduced.
    pub echo: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            generations: DEFAULT_GENERATIONS,
            workers: std::thread::available_parallelism().map_or(1, |n| n.get()),
            pattern: Pattern::demo(),
            echo: false,
        }
    }
}

impl Config {
    /// Square `size` x `size` grid.
    pub fn with_size(self, size: usize) -> Self {
        self.with_dimensions(size, size)
    }

    pub fn with_dimensions(self, height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            ..self
        }
    }

    pub fn with_generations(self, generations: u64) -> Self {
        Self {
            generations,
            ..self
        }
    }

    pub fn with_workers(self, workers: usize) -> Self {
        Self { workers, ..self }
    }

    pub fn with_pattern(self, pattern: Pattern) -> Self {
        Self { pattern, ..self }
    }

    pub fn with_echo(self, echo: bool) -> Self {
        Self { echo, ..self }
    }

    /// Checks that the run is feasible and returns its row partition.
    ///
    /// # Errors
    ///
    /// Returns an error if the grid is empty, the rows cannot be split
    /// between the workers, or the pattern does not fit on the grid.
    pub fn validate(&self) -> Result<Partition> {
        if self.width == 0 {
            return Err(anyhow::anyhow!("Grid width must be positive"));
        }
        let partition =
            Partition::new(self.height, self.workers).context("Infeasible partition")?;
        self.pattern
            .validate(self.height, self.width)
            .context("Invalid initial pattern")?;
        Ok(partition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert_eq!((config.width, config.height), (2048, 2048));
        assert_eq!(config.generations, 2000);
        let partition = config.validate().unwrap();
        assert_eq!(partition.height(), 2048);
    }

    #[test]
    fn test_invalid_configs() {
        let base = Config::default().with_workers(4);
        assert!(base.clone().with_dimensions(16, 0).validate().is_err());
        let err = base.clone().with_size(3).validate().unwrap_err();
        assert!(format!("{:#}", err).contains("Infeasible partition"));
        let err = base.with_size(20).validate().unwrap_err();
        assert!(format!("{:#}", err).contains("outside of the 20x20 grid"));
    }
}
