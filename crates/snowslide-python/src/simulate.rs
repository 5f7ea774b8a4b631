use numpy::{PyArray2, PyReadonlyArray2, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use snowslide_core::params::{
    RetentionParams, RoutingMethod, RoutingParams, SimulationParams, DEFAULT_EPSILON,
    DEFAULT_MAX_ITERATIONS, DEFAULT_MFD_EXPONENT, DEFAULT_RETENTION_A, DEFAULT_RETENTION_C,
    DEFAULT_RETENTION_MIN,
};
use snowslide_core::{engine, preprocessing, terrain};

use crate::convert::{check_same_shape, owned_grid, to_py_err};

/// Simulation results with convergence metadata.
#[pyclass(frozen)]
pub struct SimulationResult {
    /// Final snow-depth grid.
    #[pyo3(get)]
    pub snow_depth: Py<PyArray2<f64>>,
    #[pyo3(get)]
    pub iterations: usize,
    #[pyo3(get)]
    pub converged: bool,
    #[pyo3(get)]
    pub residual_excess: f64,
    #[pyo3(get)]
    pub exported_mass: f64,
}

#[allow(clippy::too_many_arguments)]
fn build_params(
    routing: &str,
    preprocess: bool,
    compute_edges: bool,
    mfd_exponent: f64,
    a: f64,
    c: f64,
    min_retention: f64,
    epsilon: f64,
    max_iterations: usize,
) -> PyResult<SimulationParams> {
    let method = RoutingMethod::parse(routing).ok_or_else(|| {
        PyValueError::new_err(format!(
            "unknown routing method {routing:?}, expected 'd8' or 'mfd'"
        ))
    })?;
    let mut params = SimulationParams::new(
        RoutingParams {
            method,
            preprocess,
            compute_edges,
            mfd_exponent,
        },
        RetentionParams {
            a,
            c,
            min: min_retention,
        },
    );
    params.epsilon = epsilon;
    params.max_iterations = max_iterations;
    Ok(params)
}

/// Redistribute snow over a DEM and return the settled depth grid.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(signature = (
    dem,
    resolution,
    snd0,
    routing="mfd",
    preprocess=true,
    compute_edges=true,
    mfd_exponent=DEFAULT_MFD_EXPONENT,
    a=DEFAULT_RETENTION_A,
    c=DEFAULT_RETENTION_C,
    min_retention=DEFAULT_RETENTION_MIN,
    epsilon=DEFAULT_EPSILON,
    max_iterations=DEFAULT_MAX_ITERATIONS,
))]
fn simulate<'py>(
    py: Python<'py>,
    dem: PyReadonlyArray2<'py, f64>,
    resolution: (f64, f64),
    snd0: PyReadonlyArray2<'py, f64>,
    routing: &str,
    preprocess: bool,
    compute_edges: bool,
    mfd_exponent: f64,
    a: f64,
    c: f64,
    min_retention: f64,
    epsilon: f64,
    max_iterations: usize,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    check_same_shape(&dem, &snd0, "dem", "snd0")?;
    let params = build_params(
        routing,
        preprocess,
        compute_edges,
        mfd_exponent,
        a,
        c,
        min_retention,
        epsilon,
        max_iterations,
    )?;
    let elevation = owned_grid(&dem);
    let initial = owned_grid(&snd0);

    let depth = engine::simulate(&elevation, &initial, resolution, &params).map_err(to_py_err)?;
    Ok(depth.to_pyarray(py))
}

/// Like `simulate`, but returns the full result object with convergence
/// metadata instead of just the grid.
#[pyfunction]
#[allow(clippy::too_many_arguments)]
#[pyo3(signature = (
    dem,
    resolution,
    snd0,
    routing="mfd",
    preprocess=true,
    compute_edges=true,
    mfd_exponent=DEFAULT_MFD_EXPONENT,
    a=DEFAULT_RETENTION_A,
    c=DEFAULT_RETENTION_C,
    min_retention=DEFAULT_RETENTION_MIN,
    epsilon=DEFAULT_EPSILON,
    max_iterations=DEFAULT_MAX_ITERATIONS,
))]
fn simulate_report<'py>(
    py: Python<'py>,
    dem: PyReadonlyArray2<'py, f64>,
    resolution: (f64, f64),
    snd0: PyReadonlyArray2<'py, f64>,
    routing: &str,
    preprocess: bool,
    compute_edges: bool,
    mfd_exponent: f64,
    a: f64,
    c: f64,
    min_retention: f64,
    epsilon: f64,
    max_iterations: usize,
) -> PyResult<SimulationResult> {
    check_same_shape(&dem, &snd0, "dem", "snd0")?;
    let params = build_params(
        routing,
        preprocess,
        compute_edges,
        mfd_exponent,
        a,
        c,
        min_retention,
        epsilon,
        max_iterations,
    )?;
    let elevation = owned_grid(&dem);
    let initial = owned_grid(&snd0);

    let sim = engine::run(&elevation, &initial, resolution, &params).map_err(to_py_err)?;
    Ok(SimulationResult {
        snow_depth: sim.depth.to_pyarray(py).unbind(),
        iterations: sim.iterations,
        converged: sim.converged,
        residual_excess: sim.residual_excess,
        exported_mass: sim.exported_mass,
    })
}

/// Per-cell slope angle in degrees for a surface grid.
#[pyfunction]
fn slope<'py>(
    py: Python<'py>,
    dem: PyReadonlyArray2<'py, f64>,
    resx: f64,
    resy: f64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    if !(resx > 0.0) || !(resy > 0.0) {
        return Err(PyValueError::new_err(format!(
            "cell resolution must be strictly positive, got ({resx}, {resy})"
        )));
    }
    let surface = owned_grid(&dem);
    Ok(terrain::slope(&surface, resx, resy).to_pyarray(py))
}

/// Per-cell downslope direction in compass degrees (0 = north, clockwise).
#[pyfunction]
fn aspect<'py>(
    py: Python<'py>,
    dem: PyReadonlyArray2<'py, f64>,
    resx: f64,
    resy: f64,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    if !(resx > 0.0) || !(resy > 0.0) {
        return Err(PyValueError::new_err(format!(
            "cell resolution must be strictly positive, got ({resx}, {resy})"
        )));
    }
    let surface = owned_grid(&dem);
    Ok(terrain::aspect(&surface, resx, resy).to_pyarray(py))
}

/// Fill undrainable depressions of a DEM up to their spill level.
#[pyfunction]
fn fill_depressions<'py>(
    py: Python<'py>,
    dem: PyReadonlyArray2<'py, f64>,
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let elevation = owned_grid(&dem);
    Ok(preprocessing::fill_depressions(&elevation).to_pyarray(py))
}

pub fn register(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<SimulationResult>()?;
    m.add_function(wrap_pyfunction!(simulate, m)?)?;
    m.add_function(wrap_pyfunction!(simulate_report, m)?)?;
    m.add_function(wrap_pyfunction!(slope, m)?)?;
    m.add_function(wrap_pyfunction!(aspect, m)?)?;
    m.add_function(wrap_pyfunction!(fill_depressions, m)?)?;
    Ok(())
}
