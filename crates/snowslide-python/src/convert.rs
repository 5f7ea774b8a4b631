use ndarray::Array2;
use numpy::PyReadonlyArray2;
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use snowslide_core::SnowslideError;

/// Copy a 2-D numpy array into an owned grid.
pub fn owned_grid(arr: &PyReadonlyArray2<'_, f64>) -> Array2<f64> {
    arr.as_array().to_owned()
}

/// Validate that two numpy grids share a shape before any copying.
pub fn check_same_shape(
    a: &PyReadonlyArray2<'_, f64>,
    b: &PyReadonlyArray2<'_, f64>,
    a_name: &str,
    b_name: &str,
) -> PyResult<()> {
    let (sa, sb) = (a.as_array().dim(), b.as_array().dim());
    if sa != sb {
        return Err(PyValueError::new_err(format!(
            "{a_name} and {b_name} must have the same shape, got {sa:?} and {sb:?}"
        )));
    }
    Ok(())
}

/// Map core errors onto ValueError, the conventional numpy-facing failure.
pub fn to_py_err(err: SnowslideError) -> PyErr {
    PyValueError::new_err(err.to_string())
}
