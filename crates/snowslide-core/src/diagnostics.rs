//! Mass-balance and capacity diagnostics for simulation outputs.

use ndarray::Array2;

use crate::params::RetentionParams;
use crate::retention;
use crate::terrain;

/// Total snow mass held by a depth field [depth units x cells].
pub fn total_mass(depth: &Array2<f64>) -> f64 {
    depth.sum()
}

/// Relative mass-balance error of a run: how much of the initial mass is
/// unaccounted for after subtracting what the engine reported as exported.
/// Zero for a perfectly conserving run.
pub fn mass_balance_error(initial: &Array2<f64>, final_depth: &Array2<f64>, exported: f64) -> f64 {
    let initial_mass = total_mass(initial);
    if initial_mass == 0.0 {
        return 0.0;
    }
    (initial_mass - total_mass(final_depth) - exported) / initial_mass
}

/// Largest capacity exceedance of `depth` over the interior of the grid,
/// evaluated against the slope of the snow-loaded surface. Negative when
/// every interior cell is at or below capacity.
pub fn max_capacity_exceedance(
    elevation: &Array2<f64>,
    depth: &Array2<f64>,
    resolution: (f64, f64),
    retention_params: &RetentionParams,
) -> f64 {
    let surface = elevation + depth;
    let slope = terrain::slope(&surface, resolution.0, resolution.1);
    let (nrows, ncols) = depth.dim();

    let mut worst = f64::NEG_INFINITY;
    for r in 1..nrows.saturating_sub(1) {
        for c in 1..ncols.saturating_sub(1) {
            let cap = retention::capacity(slope[[r, c]], retention_params);
            worst = worst.max(depth[[r, c]] - cap);
        }
    }
    worst
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn conserving_run_has_zero_error() {
        let a = Array2::from_elem((4, 4), 2.0);
        let mut b = a.clone();
        b[[0, 0]] = 0.0;
        b[[3, 3]] = 4.0;
        assert!(mass_balance_error(&a, &b, 0.0).abs() < 1e-12);
    }

    #[test]
    fn export_is_credited() {
        let a = Array2::from_elem((4, 4), 1.0);
        let mut b = a.clone();
        b[[2, 2]] = 0.0; // one unit left the domain
        assert!(mass_balance_error(&a, &b, 1.0).abs() < 1e-12);
    }

    #[test]
    fn zero_initial_mass_reports_zero() {
        let a = Array2::zeros((3, 3));
        assert_eq!(mass_balance_error(&a, &a, 0.0), 0.0);
    }

    #[test]
    fn exceedance_negative_when_under_capacity() {
        let dem = Array2::from_elem((5, 5), 100.0);
        let depth = Array2::from_elem((5, 5), 1.0);
        let worst = max_capacity_exceedance(&dem, &depth, (30.0, 30.0), &Default::default());
        // Flat terrain capacity is ~145, so 1.0 of snow is far below it.
        assert!(worst < 0.0);
    }
}
