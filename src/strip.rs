use crate::Pattern;
use anyhow::{anyhow, Result};

/// A single cell: 0 is dead, 1 is alive. Storing cells as integers lets the
/// neighbor count be a plain sum.
pub type Cell = u8;

pub(crate) const DEAD: Cell = 0;
pub(crate) const ALIVE: Cell = 1;

/// Which halo row of a strip.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaloSide {
    /// Row 0, a copy of the last owned row of the previous worker.
    Top,
    /// Row `rows + 1`, a copy of the first owned row of the next worker.
    Bottom,
}

/// Double-buffered storage of one horizontal strip of the grid.
///
/// Both buffers hold `rows + 2` rows of `width` cells in row-major order.
/// Rows `1..=rows` are owned; rows `0` and `rows + 1` are halo rows that only
/// ever hold copies of the neighbors' boundary rows.
#[derive(Debug)]
pub struct LocalStrip {
    current: Vec<Cell>,
    next: Vec<Cell>,
    rows: usize,
    width: usize,
    /// Global index of owned row 1.
    first_row: usize,
}

impl LocalStrip {
    /// Allocates a blank strip of `rows` owned rows starting at global row
    /// `first_row`.
    ///
    /// # Errors
    ///
    /// Returns an error naming the buffer if either buffer cannot be
    /// allocated, or if the strip is empty.
    pub fn new(rows: usize, width: usize, first_row: usize) -> Result<Self> {
        if rows == 0 || width == 0 {
            return Err(anyhow!("Strip must be non-empty, got {}x{}", rows, width));
        }
        let len = (rows + 2)
            .checked_mul(width)
            .ok_or_else(|| anyhow!("Strip of {} rows x {} columns is too large", rows, width))?;
        Ok(Self {
            current: Self::alloc_buffer("current", len, rows, width)?,
            next: Self::alloc_buffer("next", len, rows, width)?,
            rows,
            width,
            first_row,
        })
    }

    fn alloc_buffer(name: &str, len: usize, rows: usize, width: usize) -> Result<Vec<Cell>> {
        let mut buffer = Vec::new();
        buffer.try_reserve_exact(len).map_err(|err| {
            anyhow!(
                "Failed to allocate the `{}` buffer: {} cells ({} rows x {} columns): {}",
                name,
                len,
                rows + 2,
                width,
                err
            )
        })?;
        buffer.resize(len, DEAD);
        Ok(buffer)
    }

    /// Number of owned rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn width(&self) -> usize {
        self.width
    }

    /// Global index of the first owned row.
    pub fn first_row(&self) -> usize {
        self.first_row
    }

    /// Returns whether the owned cell at local row `i` (`1..=rows`) and
    /// column `j` is alive.
    pub fn get(&self, i: usize, j: usize) -> bool {
        self.check_owned(i, j);
        self.current[i * self.width + j] == ALIVE
    }

    pub fn set(&mut self, i: usize, j: usize, alive: bool) {
        self.check_owned(i, j);
        self.current[i * self.width + j] = if alive { ALIVE } else { DEAD };
    }

    fn check_owned(&self, i: usize, j: usize) {
        assert!(
            (1..=self.rows).contains(&i) && j < self.width,
            "cell ({}, {}) is outside of the owned {}x{} area",
            i,
            j,
            self.rows,
            self.width
        );
    }

    /// Any row of the current buffer, halo rows included (`0..=rows + 1`).
    pub fn row(&self, i: usize) -> &[Cell] {
        &self.current[i * self.width..(i + 1) * self.width]
    }

    /// Row 1, sent to the previous worker.
    pub fn first_owned_row(&self) -> &[Cell] {
        self.row(1)
    }

    /// Row `rows`, sent to the next worker.
    pub fn last_owned_row(&self) -> &[Cell] {
        self.row(self.rows)
    }

    fn halo_index(&self, side: HaloSide) -> usize {
        match side {
            HaloSide::Top => 0,
            HaloSide::Bottom => self.rows + 1,
        }
    }

    pub fn halo(&self, side: HaloSide) -> &[Cell] {
        self.row(self.halo_index(side))
    }

    /// Overwrites a halo row of the current buffer.
    ///
    /// # Panics
    ///
    /// Panics if `cells` is not exactly one row wide.
    pub fn set_halo(&mut self, side: HaloSide, cells: &[Cell]) {
        assert_eq!(cells.len(), self.width, "halo row has wrong width");
        let i = self.halo_index(side);
        self.current[i * self.width..(i + 1) * self.width].copy_from_slice(cells);
    }

    /// Splits the strip into the read-only current buffer and the writable
    /// next buffer.
    pub(crate) fn buffers_mut(&mut self) -> (&[Cell], &mut [Cell]) {
        (&self.current, &mut self.next)
    }

    /// Promotes the next generation to current. The old current buffer
    /// becomes scratch space for the following update.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }

    /// Marks alive every pattern cell that falls into the owned rows.
    /// Returns how many cells were seeded.
    pub fn seed(&mut self, pattern: &Pattern) -> usize {
        let mut seeded = 0;
        for &(row, col) in pattern.cells_in_rows(self.first_row..self.first_row + self.rows) {
            assert!(col < self.width, "seed column {} out of range", col);
            self.set(row - self.first_row + 1, col, true);
            seeded += 1;
        }
        seeded
    }

    /// Number of alive owned cells in the current buffer.
    pub fn population(&self) -> u64 {
        self.current[self.width..(self.rows + 1) * self.width]
            .iter()
            .map(|&c| c as u64)
            .sum()
    }

    /// Alive owned cells as global `(row, col)` coordinates, in row-major order.
    pub fn alive_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for i in 1..=self.rows {
            for (j, &c) in self.row(i).iter().enumerate() {
                if c == ALIVE {
                    cells.push((self.first_row + i - 1, j));
                }
            }
        }
        cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_strip_is_blank() {
        let strip = LocalStrip::new(3, 5, 0).unwrap();
        assert_eq!(strip.population(), 0);
        assert!(strip.halo(HaloSide::Top).iter().all(|&c| c == DEAD));
        assert!(strip.halo(HaloSide::Bottom).iter().all(|&c| c == DEAD));
    }

    #[test]
    fn test_empty_strip_is_rejected() {
        assert!(LocalStrip::new(0, 5, 0).is_err());
        assert!(LocalStrip::new(5, 0, 0).is_err());
    }

    #[test]
    fn test_huge_strip_reports_buffer() {
        let err = LocalStrip::new(usize::MAX / 4, 2, 0).unwrap_err().to_string();
        assert!(err.contains("`current` buffer"), "{}", err);
    }

    #[test]
    fn test_halo_rows_are_not_owned() {
        let mut strip = LocalStrip::new(2, 4, 0).unwrap();
        strip.set_halo(HaloSide::Top, &[1, 1, 1, 1]);
        strip.set_halo(HaloSide::Bottom, &[1, 0, 0, 1]);
        assert_eq!(strip.population(), 0);
        assert_eq!(strip.row(0), &[1, 1, 1, 1]);
        assert_eq!(strip.row(3), &[1, 0, 0, 1]);
    }

    #[test]
    fn test_seed_uses_global_rows() {
        let pattern = Pattern::new(vec![(4, 1), (5, 2), (9, 0), (2, 3)]);
        let mut strip = LocalStrip::new(3, 4, 4).unwrap();
        assert_eq!(strip.seed(&pattern), 2);
        assert!(strip.get(1, 1));
        assert!(strip.get(2, 2));
        assert_eq!(strip.alive_cells(), vec![(4, 1), (5, 2)]);
    }

    #[test]
    fn test_swap_promotes_next() {
        let mut strip = LocalStrip::new(1, 3, 0).unwrap();
        strip.buffers_mut().1[3 + 1] = ALIVE;
        assert!(!strip.get(1, 1));
        strip.swap();
        assert!(strip.get(1, 1));
        assert_eq!(strip.population(), 1);
    }
}
