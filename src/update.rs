use crate::{
    neighbors::count_neighbors_in_rows,
    strip::{ALIVE, DEAD},
    Cell, LocalStrip,
};

/// B3/S23: a live cell with fewer than 2 or more than 3 neighbors dies,
/// a dead cell with exactly 3 neighbors is born, everything else stays.
#[inline]
pub fn next_state(cell: Cell, neighbors: u8) -> Cell {
    match (cell, neighbors) {
        (ALIVE, n) if !(2..=3).contains(&n) => DEAD,
        (DEAD, 3) => ALIVE,
        (cell, _) => cell,
    }
}

fn update_row(row_prev: &[Cell], row_curr: &[Cell], row_next: &[Cell], dst: &mut [Cell]) -> u64 {
    let mut alive = 0;
    for (j, dst) in dst.iter_mut().enumerate() {
        let neighbors = count_neighbors_in_rows(row_prev, row_curr, row_next, j);
        *dst = next_state(row_curr[j], neighbors);
        alive += *dst as u64;
    }
    alive
}

/// Writes the next generation of every owned cell into the next buffer and
/// returns how many of them are alive.
///
/// Neighbors are read from the current buffer only, so the result does not
/// depend on the traversal order. Halo rows of the next buffer are left
/// untouched; they are refreshed by the following exchange.
pub fn update_strip(strip: &mut LocalStrip) -> u64 {
    let (rows, w) = (strip.rows(), strip.width());
    let (current, next) = strip.buffers_mut();
    let mut alive = 0;
    for i in 1..=rows {
        alive += update_row(
            &current[(i - 1) * w..i * w],
            &current[i * w..(i + 1) * w],
            &current[(i + 1) * w..(i + 2) * w],
            &mut next[i * w..(i + 1) * w],
        );
    }
    alive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{exchange_all, Pattern};

    fn strip_with(pattern: &Pattern, rows: usize, width: usize) -> LocalStrip {
        let mut strip = LocalStrip::new(rows, width, 0).unwrap();
        strip.seed(pattern);
        strip
    }

    fn advance(strip: &mut LocalStrip) -> u64 {
        exchange_all(std::slice::from_mut(strip));
        let alive = update_strip(strip);
        strip.swap();
        alive
    }

    #[test]
    fn test_rule_table() {
        for n in 0..=8 {
            let survives = next_state(ALIVE, n) == ALIVE;
            let born = next_state(DEAD, n) == ALIVE;
            assert_eq!(survives, n == 2 || n == 3, "survival with {} neighbors", n);
            assert_eq!(born, n == 3, "birth with {} neighbors", n);
        }
    }

    #[test]
    fn test_block_is_still() {
        let block = Pattern::block().translated(3, 3);
        let mut strip = strip_with(&block, 8, 8);
        for _ in 0..10 {
            assert_eq!(advance(&mut strip), 4);
            assert_eq!(strip.alive_cells(), block.cells().to_vec());
        }
    }

    #[test]
    fn test_blinker_period() {
        let blinker = Pattern::blinker().translated(4, 3);
        let mut strip = strip_with(&blinker, 9, 9);
        assert_eq!(advance(&mut strip), 3);
        assert_ne!(strip.alive_cells(), blinker.cells().to_vec());
        assert_eq!(advance(&mut strip), 3);
        assert_eq!(strip.alive_cells(), blinker.cells().to_vec());
    }

    #[test]
    fn test_count_matches_population() {
        let pattern = Pattern::random(16, 16, 0.4, Some(7)).unwrap();
        let mut strip = strip_with(&pattern, 16, 16);
        for _ in 0..20 {
            let alive = advance(&mut strip);
            assert_eq!(alive, strip.population());
        }
    }

    #[test]
    fn test_halo_rows_are_never_written() {
        let mut strip = strip_with(&Pattern::block(), 4, 4);
        exchange_all(std::slice::from_mut(&mut strip));
        let (_, next) = strip.buffers_mut();
        next[..4].fill(ALIVE);
        next[5 * 4..].fill(ALIVE);
        update_strip(&mut strip);
        let (_, next) = strip.buffers_mut();
        assert!(next[..4].iter().all(|&c| c == ALIVE));
        assert!(next[5 * 4..].iter().all(|&c| c == ALIVE));
    }
}
