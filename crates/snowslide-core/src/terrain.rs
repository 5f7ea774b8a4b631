//! Slope and aspect from a raster surface.
//!
//! Gradients use central differences in the interior and one-sided
//! differences on the first/last row and column, scaled by the cell
//! resolution. Slope is expressed in degrees and clamped to a small
//! positive floor so the invariant `0 < slope < 90` holds on every cell,
//! flat neighborhoods included (`atan` keeps the upper bound strict).

use ndarray::Array2;

/// Lower bound applied to computed slopes [degrees]. Keeps downstream
/// retention capacities finite and well-defined on perfectly flat cells.
pub const MIN_SLOPE_DEG: f64 = 1e-6;

/// Gradient of `surface` along axis 0 (rows), spacing `resy`.
fn gradient_axis0(surface: &Array2<f64>, resy: f64) -> Array2<f64> {
    let (nrows, ncols) = surface.dim();
    let mut grad = Array2::zeros((nrows, ncols));
    if nrows < 2 {
        return grad;
    }
    for c in 0..ncols {
        grad[[0, c]] = (surface[[1, c]] - surface[[0, c]]) / resy;
        grad[[nrows - 1, c]] = (surface[[nrows - 1, c]] - surface[[nrows - 2, c]]) / resy;
        for r in 1..nrows - 1 {
            grad[[r, c]] = (surface[[r + 1, c]] - surface[[r - 1, c]]) / (2.0 * resy);
        }
    }
    grad
}

/// Gradient of `surface` along axis 1 (columns), spacing `resx`.
fn gradient_axis1(surface: &Array2<f64>, resx: f64) -> Array2<f64> {
    let (nrows, ncols) = surface.dim();
    let mut grad = Array2::zeros((nrows, ncols));
    if ncols < 2 {
        return grad;
    }
    for r in 0..nrows {
        grad[[r, 0]] = (surface[[r, 1]] - surface[[r, 0]]) / resx;
        grad[[r, ncols - 1]] = (surface[[r, ncols - 1]] - surface[[r, ncols - 2]]) / resx;
        for c in 1..ncols - 1 {
            grad[[r, c]] = (surface[[r, c + 1]] - surface[[r, c - 1]]) / (2.0 * resx);
        }
    }
    grad
}

/// Per-cell slope angle [degrees] of a surface sampled at `(resx, resy)`.
///
/// The surface may be bare elevation or the snow-loaded surface
/// (elevation + depth); the engine re-evaluates slope against the loaded
/// surface every iteration since accumulating snow smooths local relief.
pub fn slope(surface: &Array2<f64>, resx: f64, resy: f64) -> Array2<f64> {
    let gy = gradient_axis0(surface, resy);
    let gx = gradient_axis1(surface, resx);

    let mut slp = Array2::zeros(surface.dim());
    for ((r, c), out) in slp.indexed_iter_mut() {
        let magnitude = gx[[r, c]].hypot(gy[[r, c]]);
        *out = magnitude.atan().to_degrees().max(MIN_SLOPE_DEG);
    }
    slp
}

/// Per-cell downslope direction [compass degrees, 0 = north, clockwise].
///
/// Cells with no measurable gradient report 0.
pub fn aspect(surface: &Array2<f64>, resx: f64, resy: f64) -> Array2<f64> {
    let gy = gradient_axis0(surface, resy);
    let gx = gradient_axis1(surface, resx);

    let mut asp = Array2::zeros(surface.dim());
    for ((r, c), out) in asp.indexed_iter_mut() {
        let east = -gx[[r, c]];
        // Row index grows southward, so +gy points south and -gy north.
        let north = gy[[r, c]];
        if east == 0.0 && north == 0.0 {
            *out = 0.0;
        } else {
            let deg = east.atan2(north).to_degrees();
            *out = if deg < 0.0 { deg + 360.0 } else { deg };
        }
    }
    asp
}
