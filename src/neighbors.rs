use crate::{Cell, LocalStrip};

/// Number of alive cells among the 8 neighbors of column `j` of `row_curr`.
///
/// Columns wrap inside the rows. Rows are given explicitly: for the first
/// and the last owned row of a strip, `row_prev` or `row_next` is a halo row.
#[inline]
pub fn count_neighbors_in_rows(
    row_prev: &[Cell],
    row_curr: &[Cell],
    row_next: &[Cell],
    j: usize,
) -> u8 {
    let w = row_curr.len();
    let left = if j == 0 { w - 1 } else { j - 1 };
    let right = if j == w - 1 { 0 } else { j + 1 };
    row_prev[left]
        + row_prev[j]
        + row_prev[right]
        + row_curr[left]
        + row_curr[right]
        + row_next[left]
        + row_next[j]
        + row_next[right]
}

/// Number of alive neighbors of the owned cell at local row `i` (`1..=rows`)
/// and column `j`, read from the current buffer.
///
/// Row wraparound comes from the halo rows, which must hold the neighbors'
/// boundary rows of the same generation.
pub fn count_neighbors(strip: &LocalStrip, i: usize, j: usize) -> u8 {
    assert!(
        (1..=strip.rows()).contains(&i) && j < strip.width(),
        "cell ({}, {}) is not owned",
        i,
        j
    );
    count_neighbors_in_rows(strip.row(i - 1), strip.row(i), strip.row(i + 1), j)
}
