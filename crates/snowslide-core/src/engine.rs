//! The iterative mass-redistribution engine.
//!
//! Each iteration re-evaluates slope against the snow-loaded surface,
//! derives per-cell retention capacity, and moves the excess of every
//! non-sink cell through the routing table. Updates are synchronous:
//! transfers are computed from the depth field as it stood at the start
//! of the iteration and written into a fresh buffer, so results do not
//! depend on cell visit order.

use ndarray::Array2;

use crate::error::{SnowslideError, SnowslideResult};
use crate::params::SimulationParams;
use crate::preprocessing;
use crate::retention;
use crate::routing::{RoutingTable, NEIGHBOR_OFFSETS};
use crate::terrain;

/// Outcome of one simulation run.
#[derive(Debug, Clone)]
pub struct Simulation {
    /// Final snow-depth field, same shape as the input grids.
    pub depth: Array2<f64>,
    /// Number of redistribution iterations performed.
    pub iterations: usize,
    /// Whether the movable excess fell below epsilon within the budget.
    pub converged: bool,
    /// Movable excess at loop exit [depth units]. For a converged run this
    /// is at most epsilon; at the iteration cap it may be larger and small
    /// regions of the field may still exceed capacity.
    pub residual_excess: f64,
    /// Mass routed past the grid boundary (only with `compute_edges`).
    pub exported_mass: f64,
}

/// Redistribute `initial_depth` over `elevation` until equilibrium.
///
/// `resolution` is the `(resx, resy)` cell spacing in elevation units.
/// The inputs are borrowed; the caller gets an owned final state.
/// Reaching the iteration budget is not an error; inspect
/// [`Simulation::converged`] when a strict capacity bound matters.
pub fn run(
    elevation: &Array2<f64>,
    initial_depth: &Array2<f64>,
    resolution: (f64, f64),
    params: &SimulationParams,
) -> SnowslideResult<Simulation> {
    if elevation.dim() != initial_depth.dim() {
        return Err(SnowslideError::InvalidInputShape {
            expected: elevation.dim(),
            actual: initial_depth.dim(),
        });
    }
    let (resx, resy) = resolution;
    params.validate(resx, resy)?;

    let elevation = if params.routing.preprocess {
        preprocessing::fill_depressions(elevation)
    } else {
        elevation.clone()
    };
    let table = RoutingTable::build(&elevation, resx, resy, &params.routing);

    let (nrows, ncols) = elevation.dim();
    let mut depth = initial_depth.clone();
    let mut exported_mass = 0.0;
    let mut iterations = 0;
    let mut converged = false;
    let mut residual_excess = 0.0;

    loop {
        let surface = &elevation + &depth;
        let slope = terrain::slope(&surface, resx, resy);

        // Movable excess, frozen at the start of the iteration. Sinks keep
        // whatever they hold, so they never stall convergence.
        let mut excess = Array2::zeros((nrows, ncols));
        let mut movable = 0.0;
        for r in 0..nrows {
            for c in 0..ncols {
                if table.is_sink(r, c) {
                    continue;
                }
                let cap = retention::capacity(slope[[r, c]], &params.retention);
                let over = depth[[r, c]] - cap;
                if over > 0.0 {
                    excess[[r, c]] = over;
                    movable += over;
                }
            }
        }

        residual_excess = movable;
        if movable <= params.epsilon {
            converged = true;
            break;
        }
        if iterations >= params.max_iterations {
            break;
        }
        iterations += 1;

        let mut next = depth.clone();
        for r in 0..nrows {
            for c in 0..ncols {
                let over = excess[[r, c]];
                if over == 0.0 {
                    continue;
                }
                next[[r, c]] -= over;
                let weights = table.weights(r, c);
                for (k, &(dr, dc)) in NEIGHBOR_OFFSETS.iter().enumerate() {
                    if weights[k] > 0.0 {
                        let nr = (r as isize + dr) as usize;
                        let nc = (c as isize + dc) as usize;
                        next[[nr, nc]] += over * weights[k];
                    }
                }
                exported_mass += over * table.edge_fraction(r, c);
            }
        }
        depth = next;
    }

    Ok(Simulation {
        depth,
        iterations,
        converged,
        residual_excess,
        exported_mass,
    })
}

/// Convenience wrapper returning just the final snow-depth grid.
pub fn simulate(
    elevation: &Array2<f64>,
    initial_depth: &Array2<f64>,
    resolution: (f64, f64),
    params: &SimulationParams,
) -> SnowslideResult<Array2<f64>> {
    run(elevation, initial_depth, resolution, params).map(|sim| sim.depth)
}
