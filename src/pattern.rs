use anyhow::{anyhow, Context, Result};
use rand::{Rng, SeedableRng};
use std::{ops::Range, path::Path};

/// Initial configuration of the grid: the set of alive cells, as absolute
/// `(row, col)` coordinates.
///
/// Cells are kept sorted in row-major order without duplicates, so the
/// cells of a strip form one contiguous slice (see [`Pattern::cells_in_rows`]).
/// A pattern knows nothing about the grid it will be placed on; use
/// [`Pattern::validate`] before seeding.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pattern {
    cells: Vec<(usize, usize)>,
}

impl Pattern {
    pub fn new(mut cells: Vec<(usize, usize)>) -> Self {
        cells.sort_unstable();
        cells.dedup();
        Self { cells }
    }

    /// The standard glider, heading down and right, in a 3x3 box.
    pub fn glider() -> Self {
        Self::new(vec![(0, 1), (1, 2), (2, 0), (2, 1), (2, 2)])
    }

    /// A horizontal blinker (period 2).
    pub fn blinker() -> Self {
        Self::new(vec![(0, 0), (0, 1), (0, 2)])
    }

    /// A 2x2 block (still life).
    pub fn block() -> Self {
        Self::new(vec![(0, 0), (0, 1), (1, 0), (1, 1)])
    }

    pub fn r_pentomino() -> Self {
        Self::new(vec![(0, 1), (0, 2), (1, 0), (1, 1), (2, 1)])
    }

    /// A glider near the top-left corner and an R-pentomino slightly below
    /// and to the right of it. Needs a grid of at least 12 rows and 33
    /// columns.
    pub fn demo() -> Self {
        Self::glider()
            .translated(0, 1)
            .union(&Self::r_pentomino().translated(9, 30))
    }

    /// Creates a random pattern filling a `height` x `width` box.
    ///
    /// # Arguments
    ///
    /// * `density` - Probability of every cell to be alive, in `0.0..=1.0`.
    /// * `seed` - Optional seed for the random number generator.
    ///   If None, seeds from the OS.
    ///
    /// # Errors
    ///
    /// Returns an error if `density` is not a probability.
    pub fn random(height: usize, width: usize, density: f64, seed: Option<u64>) -> Result<Self> {
        if !(0.0..=1.0).contains(&density) {
            return Err(anyhow!("Density {} is not within 0..=1", density));
        }
        let mut rng = if let Some(x) = seed {
            rand_chacha::ChaCha8Rng::seed_from_u64(x)
        } else {
            rand_chacha::ChaCha8Rng::from_os_rng()
        };
        let mut cells = Vec::new();
        for row in 0..height {
            for col in 0..width {
                if rng.random_bool(density) {
                    cells.push((row, col));
                }
            }
        }
        Ok(Self { cells })
    }

    /// Loads a pattern from a file. Only `.rle` files are supported.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.extension().map_or(true, |ext| ext != "rle") {
            return Err(anyhow!(
                "Unsupported pattern file {}: expected an .rle file",
                path.display()
            ));
        }
        let data =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_rle(&data).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Creates a pattern from data in the
    /// [Extended RLE](https://golly.sourceforge.io/Help/formats.html#rle) format.
    /// The top-left corner of the RLE box lands at `(0, 0)`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Data is invalid
    /// - Cells lie outside of the box declared by the header
    /// - Rule is not B3/S23
    pub fn from_rle(data: &[u8]) -> Result<Self> {
        let mut lines = data
            .split(|&b| b == b'\n')
            .map(|x| x.strip_suffix(b"\r").unwrap_or(x))
            .filter(|x| !x.is_empty() && x[0] != b'#');

        let header = lines.next().ok_or_else(|| anyhow!("Missing header"))?;
        let mut parts = header.split(|&b| b == b',').map(|x| x.trim_ascii());
        let extract_value = |part: Option<&[u8]>, expected_key: &[u8]| -> Result<Vec<u8>> {
            let part = part.ok_or_else(|| {
                anyhow!(
                    "Invalid header: missing \"{}\"",
                    String::from_utf8_lossy(expected_key)
                )
            })?;
            let mut items = part.split(|&b| b == b'=');
            let key = items.next().unwrap_or(&[]).trim_ascii_end();
            if key != expected_key {
                return Err(anyhow!(
                    "Invalid header: expected {}, got {}",
                    String::from_utf8_lossy(expected_key),
                    String::from_utf8_lossy(key)
                ));
            }
            let value = items.next().unwrap_or(&[]).trim_ascii_start();
            if items.next().is_some() {
                return Err(anyhow!("Invalid header: missing ',' between '='"));
            }
            Ok(value.to_vec())
        };
        let width: usize = std::str::from_utf8(&extract_value(parts.next(), b"x")?)?.parse()?;
        let height: usize = std::str::from_utf8(&extract_value(parts.next(), b"y")?)?.parse()?;
        // rule is optional
        if let Some(part) = parts.next() {
            let rule = extract_value(Some(part), b"rule")?;
            if !rule.eq_ignore_ascii_case(b"B3/S23") {
                return Err(anyhow!("Only B3/S23 rule is supported"));
            }
        }

        let mut cells = Vec::new();
        let (mut x, mut y, mut count) = (0, 0, 0);
        'outer: for line in lines {
            for &b in line {
                let run = if count == 0 { 1 } else { count };
                match b {
                    b'0'..=b'9' => {
                        count = count * 10 + (b - b'0') as usize;
                        continue;
                    }
                    b'b' => x += run,
                    b'o' => {
                        if x + run > width || y >= height {
                            return Err(anyhow!(
                                "Pattern data out of bounds: x = {}, y = {}",
                                x + run - 1,
                                y
                            ));
                        }
                        cells.extend((x..x + run).map(|col| (y, col)));
                        x += run;
                    }
                    b'$' => {
                        y += run;
                        x = 0;
                    }
                    b'!' => break 'outer,
                    b' ' | b'\t' => continue,
                    _ => return Err(anyhow!("Invalid RLE character: '{}'", b as char)),
                }
                count = 0;
                if x > width {
                    return Err(anyhow!("Pattern data out of bounds: x = {}, y = {}", x, y));
                }
            }
        }
        Ok(Self::new(cells))
    }

    /// Shifts every cell by `rows` down and `cols` right.
    pub fn translated(&self, rows: usize, cols: usize) -> Self {
        Self::new(self.cells.iter().map(|&(r, c)| (r + rows, c + cols)).collect())
    }

    /// Like [`Pattern::translated`], but fails instead of overflowing when
    /// the offset is too large.
    pub fn placed_at(&self, rows: usize, cols: usize) -> Result<Self> {
        let cells = self
            .cells
            .iter()
            .map(|&(r, c)| match (r.checked_add(rows), c.checked_add(cols)) {
                (Some(r), Some(c)) => Ok((r, c)),
                _ => Err(anyhow!(
                    "Cell ({}, {}) moved by ({}, {}) does not fit in usize",
                    r,
                    c,
                    rows,
                    cols
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(cells))
    }

    /// Shifts every cell on a `height` x `width` torus.
    pub fn translated_on_torus(&self, rows: usize, cols: usize, height: usize, width: usize) -> Self {
        Self::new(
            self.cells
                .iter()
                .map(|&(r, c)| ((r + rows) % height, (c + cols) % width))
                .collect(),
        )
    }

    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.cells.iter().chain(&other.cells).copied().collect())
    }

    /// Checks that every cell lies on a `height` x `width` grid.
    pub fn validate(&self, height: usize, width: usize) -> Result<()> {
        match self.cells.iter().find(|&&(r, c)| r >= height || c >= width) {
            Some(&(r, c)) => Err(anyhow!(
                "Seed cell ({}, {}) lies outside of the {}x{} grid",
                r,
                c,
                height,
                width
            )),
            None => Ok(()),
        }
    }

    pub fn population(&self) -> usize {
        self.cells.len()
    }

    /// All alive cells in row-major order.
    pub fn cells(&self) -> &[(usize, usize)] {
        &self.cells
    }

    /// Alive cells whose row falls into `rows`, in row-major order.
    pub fn cells_in_rows(&self, rows: Range<usize>) -> &[(usize, usize)] {
        let lo = self.cells.partition_point(|&(r, _)| r < rows.start);
        let hi = self.cells.partition_point(|&(r, _)| r < rows.end);
        &self.cells[lo..hi]
    }
}
