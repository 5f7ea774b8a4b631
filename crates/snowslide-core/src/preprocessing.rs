//! Terrain conditioning: depression filling.
//!
//! Priority-flood fill (Barnes et al., 2014): cells are visited outward
//! from the grid border in order of increasing elevation, and any cell
//! below its spill level is raised to it. Pits become flats at the spill
//! elevation rather than being given an artificial micro-gradient, so a
//! uniform input stays uniform and filled basins behave as terminal
//! accumulation zones for the redistribution engine.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use ndarray::Array2;

use crate::routing::NEIGHBOR_OFFSETS;

/// Heap entry ordered so the lowest elevation pops first.
struct Candidate {
    elevation: f64,
    row: usize,
    col: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.elevation.total_cmp(&other.elevation) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we need the minimum first.
        other.elevation.total_cmp(&self.elevation)
    }
}

/// Fill every undrainable depression of `elevation` up to its spill level.
///
/// Returns a grid in which each cell either lies on a non-ascending path
/// to the border or belongs to a flat at its basin's spill elevation.
pub fn fill_depressions(elevation: &Array2<f64>) -> Array2<f64> {
    let (nrows, ncols) = elevation.dim();
    let mut filled = elevation.clone();
    if nrows < 3 || ncols < 3 {
        return filled;
    }

    let mut closed = Array2::from_elem((nrows, ncols), false);
    let mut heap = BinaryHeap::with_capacity(2 * (nrows + ncols));

    let mut seed = |heap: &mut BinaryHeap<Candidate>, closed: &mut Array2<bool>, r: usize, c: usize| {
        if !closed[[r, c]] {
            closed[[r, c]] = true;
            heap.push(Candidate {
                elevation: filled[[r, c]],
                row: r,
                col: c,
            });
        }
    };

    for c in 0..ncols {
        seed(&mut heap, &mut closed, 0, c);
        seed(&mut heap, &mut closed, nrows - 1, c);
    }
    for r in 0..nrows {
        seed(&mut heap, &mut closed, r, 0);
        seed(&mut heap, &mut closed, r, ncols - 1);
    }

    while let Some(cell) = heap.pop() {
        for &(dr, dc) in NEIGHBOR_OFFSETS.iter() {
            let (nr, nc) = (cell.row as isize + dr, cell.col as isize + dc);
            if nr < 0 || nr >= nrows as isize || nc < 0 || nc >= ncols as isize {
                continue;
            }
            let (nr, nc) = (nr as usize, nc as usize);
            if closed[[nr, nc]] {
                continue;
            }
            closed[[nr, nc]] = true;
            if filled[[nr, nc]] < cell.elevation {
                filled[[nr, nc]] = cell.elevation;
            }
            heap.push(Candidate {
                elevation: filled[[nr, nc]],
                row: nr,
                col: nc,
            });
        }
    }

    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn single_pit_raised_to_spill_level() {
        let dem = array![
            [3.0, 3.0, 3.0, 3.0, 3.0],
            [3.0, 4.0, 4.0, 4.0, 3.0],
            [3.0, 4.0, 1.0, 4.0, 3.0],
            [3.0, 4.0, 4.0, 4.0, 3.0],
            [3.0, 3.0, 3.0, 3.0, 3.0],
        ];
        let filled = fill_depressions(&dem);
        // The pit spills over the ring of 4s.
        assert_eq!(filled[[2, 2]], 4.0);
        // Nothing else moved.
        assert_eq!(filled[[1, 1]], 4.0);
        assert_eq!(filled[[0, 0]], 3.0);
    }

    #[test]
    fn drained_terrain_unchanged() {
        let dem = Array2::from_shape_fn((6, 9), |(_, c)| 100.0 - 10.0 * c as f64);
        let filled = fill_depressions(&dem);
        assert_eq!(filled, dem);
    }

    #[test]
    fn uniform_terrain_stays_uniform() {
        let dem = Array2::from_elem((8, 8), 42.0);
        let filled = fill_depressions(&dem);
        assert_eq!(filled, dem);
    }

    #[test]
    fn nested_depression_filled_through_outer_sill() {
        // Basin draining over a 6.0 sill to a 5.0 border outlet; an inner
        // pit (0.5) must rise with the rest of the basin.
        let dem = array![
            [9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0],
            [9.0, 3.0, 3.0, 3.0, 3.0, 6.0, 5.0],
            [9.0, 3.0, 1.0, 0.5, 3.0, 9.0, 9.0],
            [9.0, 3.0, 1.0, 1.0, 3.0, 9.0, 9.0],
            [9.0, 3.0, 3.0, 3.0, 3.0, 9.0, 9.0],
            [9.0, 9.0, 9.0, 9.0, 9.0, 9.0, 9.0],
        ];
        let filled = fill_depressions(&dem);
        // Everything inside the basin rises to the sill elevation.
        for &(r, c) in &[(2usize, 2usize), (2, 3), (3, 2), (3, 3), (1, 1), (4, 4)] {
            assert_eq!(filled[[r, c]], 6.0, "cell ({r}, {c})");
        }
        // The sill and the outlet keep their elevations.
        assert_eq!(filled[[1, 5]], 6.0);
        assert_eq!(filled[[1, 6]], 5.0);
    }

    #[test]
    fn tiny_grids_returned_as_is() {
        let dem = array![[3.0, 1.0], [2.0, 4.0]];
        assert_eq!(fill_depressions(&dem), dem);
    }
}
