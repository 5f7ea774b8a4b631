//! Slope-dependent snow retention capacity.
//!
//! Exponential holding-depth model after Bernhardt & Schmidt (2010):
//! steep terrain holds little snow, flat terrain holds a lot. The clamp
//! keeps a thin snow film even on near-vertical cells.

use ndarray::Array2;

use crate::params::RetentionParams;

/// Maximum sustainable snow depth for a cell at `slope_deg` degrees.
#[inline]
pub fn capacity(slope_deg: f64, params: &RetentionParams) -> f64 {
    (params.c * (params.a * slope_deg).exp()).max(params.min)
}

/// Per-cell capacity grid for a slope grid.
pub fn capacity_grid(slope: &Array2<f64>, params: &RetentionParams) -> Array2<f64> {
    slope.mapv(|s| capacity(s, params))
}
