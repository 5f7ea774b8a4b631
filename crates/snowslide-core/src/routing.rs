//! Flow-routing tables over the 8-neighborhood.
//!
//! The table is built once per simulation from the static (optionally
//! depression-filled) elevation grid and reused every iteration. Weights
//! are stored densely as a `[f64; 8]` per cell, indexed by the fixed scan
//! order below, plus one scalar per cell for mass exported past the grid
//! boundary when `compute_edges` is enabled.

use ndarray::Array2;

use crate::params::{RoutingMethod, RoutingParams};

/// Neighbor scan order: clockwise from north.
///
/// Index 0..8 maps to N, NE, E, SE, S, SW, W, NW as `(drow, dcol)`.
/// This order is also the D8 tie-break: the first neighbor reaching the
/// maximum drop wins, which keeps reference outputs reproducible.
pub const NEIGHBOR_OFFSETS: [(isize, isize); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// Per-cell outgoing flow weights.
///
/// For any cell, `weights(r, c)` sums with `edge_fraction(r, c)` to 1.0
/// when the cell has at least one strictly lower (real or virtual)
/// neighbor, and to 0.0 when the cell is a sink.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    nrows: usize,
    ncols: usize,
    weights: Vec<[f64; 8]>,
    edge: Vec<f64>,
}

impl RoutingTable {
    /// Build routing weights for `elevation` with the given cell spacing.
    pub fn build(
        elevation: &Array2<f64>,
        resx: f64,
        resy: f64,
        params: &RoutingParams,
    ) -> Self {
        let (nrows, ncols) = elevation.dim();
        let mut table = Self {
            nrows,
            ncols,
            weights: vec![[0.0; 8]; nrows * ncols],
            edge: vec![0.0; nrows * ncols],
        };

        let distances = neighbor_distances(resx, resy);

        for r in 0..nrows {
            for c in 0..ncols {
                let (drops, edge_drops) =
                    neighbor_drops(elevation, r, c, params.compute_edges);
                let idx = r * ncols + c;
                match params.method {
                    RoutingMethod::D8 => fill_d8(
                        &mut table.weights[idx],
                        &mut table.edge[idx],
                        &drops,
                        &edge_drops,
                    ),
                    RoutingMethod::Mfd => fill_mfd(
                        &mut table.weights[idx],
                        &mut table.edge[idx],
                        &drops,
                        &edge_drops,
                        &distances,
                        params.mfd_exponent,
                    ),
                }
            }
        }

        table
    }

    #[inline]
    pub fn weights(&self, r: usize, c: usize) -> &[f64; 8] {
        &self.weights[r * self.ncols + c]
    }

    /// Fraction of a cell's excess that leaves the modeled domain.
    #[inline]
    pub fn edge_fraction(&self, r: usize, c: usize) -> f64 {
        self.edge[r * self.ncols + c]
    }

    /// A sink keeps all of its excess: no lower neighbor, no edge export.
    #[inline]
    pub fn is_sink(&self, r: usize, c: usize) -> bool {
        let idx = r * self.ncols + c;
        self.edge[idx] == 0.0 && self.weights[idx].iter().all(|&w| w == 0.0)
    }

    pub fn dim(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }
}

/// Physical distance to each neighbor in scan order.
fn neighbor_distances(resx: f64, resy: f64) -> [f64; 8] {
    let diag = resx.hypot(resy);
    [resy, diag, resx, diag, resy, diag, resx, diag]
}

/// Elevation drop toward each neighbor; `None` marks directions that
/// receive no flow (off-grid without edge export, or no virtual neighbor).
///
/// When `compute_edges` is set, an off-grid neighbor is given a virtual
/// elevation linearly extrapolated from the opposite in-grid neighbor:
/// `z_out = 2 * z(cell) - z(opposite)`. Corner directions whose opposite
/// neighbor is also off-grid never export.
fn neighbor_drops(
    elevation: &Array2<f64>,
    r: usize,
    c: usize,
    compute_edges: bool,
) -> ([Option<f64>; 8], [Option<f64>; 8]) {
    let (nrows, ncols) = elevation.dim();
    let z = elevation[[r, c]];
    let mut drops = [None; 8];
    let mut edge_drops = [None; 8];

    for (k, &(dr, dc)) in NEIGHBOR_OFFSETS.iter().enumerate() {
        let (nr, nc) = (r as isize + dr, c as isize + dc);
        if nr >= 0 && nr < nrows as isize && nc >= 0 && nc < ncols as isize {
            drops[k] = Some(z - elevation[[nr as usize, nc as usize]]);
        } else if compute_edges {
            let (or, oc) = (r as isize - dr, c as isize - dc);
            if or >= 0 && or < nrows as isize && oc >= 0 && oc < ncols as isize {
                // drop = z - (2z - z_opposite) = z_opposite - z
                edge_drops[k] = Some(elevation[[or as usize, oc as usize]] - z);
            }
        }
    }

    (drops, edge_drops)
}

/// Steepest descent: the full unit weight goes to the first neighbor (scan
/// order) with the maximum strictly positive drop.
fn fill_d8(
    weights: &mut [f64; 8],
    edge: &mut f64,
    drops: &[Option<f64>; 8],
    edge_drops: &[Option<f64>; 8],
) {
    let mut best: Option<(usize, f64, bool)> = None;
    for k in 0..8 {
        for (drop, is_edge) in [(drops[k], false), (edge_drops[k], true)] {
            let Some(drop) = drop else { continue };
            if drop <= 0.0 {
                continue;
            }
            if best.map_or(true, |(_, d, _)| drop > d) {
                best = Some((k, drop, is_edge));
            }
        }
    }
    match best {
        Some((_, _, true)) => *edge = 1.0,
        Some((k, _, false)) => weights[k] = 1.0,
        None => {}
    }
}

/// Multiple flow direction: weights proportional to a power of each lower
/// neighbor's descent gradient, normalized to sum to 1.
fn fill_mfd(
    weights: &mut [f64; 8],
    edge: &mut f64,
    drops: &[Option<f64>; 8],
    edge_drops: &[Option<f64>; 8],
    distances: &[f64; 8],
    exponent: f64,
) {
    let mut raw = [0.0f64; 8];
    let mut raw_edge = [0.0f64; 8];
    let mut total = 0.0;

    for k in 0..8 {
        if let Some(drop) = drops[k] {
            if drop > 0.0 {
                raw[k] = (drop / distances[k]).powf(exponent);
                total += raw[k];
            }
        }
        if let Some(drop) = edge_drops[k] {
            if drop > 0.0 {
                raw_edge[k] = (drop / distances[k]).powf(exponent);
                total += raw_edge[k];
            }
        }
    }

    if total == 0.0 {
        return;
    }
    for k in 0..8 {
        weights[k] = raw[k] / total;
        *edge += raw_edge[k] / total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::RoutingParams;
    use ndarray::{array, Array2};

    fn routing(method: RoutingMethod, compute_edges: bool) -> RoutingParams {
        RoutingParams {
            method,
            compute_edges,
            ..RoutingParams::default()
        }
    }

    /// Bowl: center cell lower than all eight neighbors.
    fn bowl() -> Array2<f64> {
        array![[5.0, 4.0, 5.0], [4.0, 1.0, 4.0], [5.0, 4.0, 5.0]]
    }

    #[test]
    fn d8_routes_everything_to_steepest_neighbor() {
        // Center at 9; steepest drop is SE (9 - 1 = 8).
        let dem = array![[8.0, 7.0, 8.0], [7.0, 9.0, 6.0], [8.0, 7.0, 1.0]];
        let table = RoutingTable::build(&dem, 30.0, 30.0, &routing(RoutingMethod::D8, false));
        let w = table.weights(1, 1);
        assert_eq!(w[3], 1.0); // SE is scan index 3
        assert_eq!(w.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn d8_tie_break_prefers_first_in_scan_order() {
        // North and east drops are equal; north (index 0) must win.
        let dem = array![[8.0, 1.0, 8.0], [7.0, 9.0, 1.0], [8.0, 7.0, 8.0]];
        let table = RoutingTable::build(&dem, 30.0, 30.0, &routing(RoutingMethod::D8, false));
        let w = table.weights(1, 1);
        assert_eq!(w[0], 1.0);
        assert_eq!(w[2], 0.0);
    }

    #[test]
    fn local_minimum_is_sink() {
        let table = RoutingTable::build(&bowl(), 30.0, 30.0, &routing(RoutingMethod::Mfd, false));
        assert!(table.is_sink(1, 1));
        assert_eq!(table.weights(1, 1).iter().sum::<f64>(), 0.0);
    }

    #[test]
    fn flat_terrain_has_only_sinks() {
        let dem = Array2::from_elem((4, 5), 7.0);
        for params in [
            routing(RoutingMethod::D8, false),
            routing(RoutingMethod::Mfd, false),
        ] {
            let table = RoutingTable::build(&dem, 30.0, 30.0, &params);
            for r in 0..4 {
                for c in 0..5 {
                    assert!(table.is_sink(r, c), "({r}, {c}) should be a sink");
                }
            }
        }
    }

    #[test]
    fn mfd_weights_sum_to_one_and_favor_steeper_drops() {
        // Center higher than all neighbors, SE clearly steepest.
        let dem = array![[8.0, 7.0, 8.0], [7.0, 9.0, 6.0], [8.0, 7.0, 1.0]];
        let table = RoutingTable::build(&dem, 30.0, 30.0, &routing(RoutingMethod::Mfd, false));
        let w = table.weights(1, 1);
        let sum: f64 = w.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        for k in 0..8 {
            assert!(w[k] > 0.0, "all lower neighbors should receive flow");
        }
        let max = w.iter().cloned().fold(f64::MIN, f64::max);
        assert_eq!(w[3], max); // SE
    }

    #[test]
    fn mfd_excludes_higher_neighbors() {
        // Ridge running north-south through the center column.
        let dem = array![[9.0, 9.0, 9.0], [1.0, 5.0, 1.0], [9.0, 9.0, 9.0]];
        let table = RoutingTable::build(&dem, 30.0, 30.0, &routing(RoutingMethod::Mfd, false));
        let w = table.weights(1, 1);
        assert!(w[2] > 0.0 && w[6] > 0.0); // E and W
        assert_eq!(w[0], 0.0); // N is higher
        assert_eq!(w[4], 0.0); // S is higher
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn wall_boundary_never_exports() {
        // Plane dropping toward the east border.
        let dem = Array2::from_shape_fn((5, 5), |(_, c)| 100.0 - 10.0 * c as f64);
        let table = RoutingTable::build(&dem, 10.0, 10.0, &routing(RoutingMethod::Mfd, false));
        for r in 0..5 {
            assert_eq!(table.edge_fraction(r, 4), 0.0);
        }
    }

    #[test]
    fn edge_export_follows_outward_gradient() {
        let dem = Array2::from_shape_fn((5, 5), |(_, c)| 100.0 - 10.0 * c as f64);
        let table = RoutingTable::build(&dem, 10.0, 10.0, &routing(RoutingMethod::Mfd, true));
        // East-border interior cell: the west neighbor is higher, so the
        // virtual east neighbor is lower and receives flow off-grid.
        assert!(table.edge_fraction(2, 4) > 0.0);
        let total = table.weights(2, 4).iter().sum::<f64>() + table.edge_fraction(2, 4);
        assert!((total - 1.0).abs() < 1e-12);
        // The high (west) side has no outward gradient.
        assert_eq!(table.edge_fraction(2, 0), 0.0);
    }

    #[test]
    fn d8_exports_when_virtual_neighbor_is_steepest() {
        let dem = Array2::from_shape_fn((5, 5), |(_, c)| 100.0 - 10.0 * c as f64);
        let table = RoutingTable::build(&dem, 10.0, 10.0, &routing(RoutingMethod::D8, true));
        assert_eq!(table.edge_fraction(2, 4), 1.0);
        assert_eq!(table.weights(2, 4).iter().sum::<f64>(), 0.0);
    }
}
