//! utils — conversion helpers for the PyO3 boundary.
//!
//! Purpose
//! -------
//! Turn Python array-likes (numpy arrays, pandas objects, nested sequences)
//! into owned `ndarray` values and build the Rust option types from
//! Python keyword arguments. Everything here is gated behind the
//! `python-bindings` feature.
//!
//! Conventions
//! -----------
//! - 1-D inputs go through [`extract_f64_array`], which prefers a
//!   zero-copy contiguous numpy view and falls back to `to_numpy()` and
//!   then to a `Vec<f64>` extraction.
//! - 2-D inputs go through [`extract_f64_matrix`]; a numpy array of any
//!   other rank, or a flat sequence, is a `ShapeMismatch` surfaced as
//!   `ValueError`.

#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2, Ix2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1,
    PyReadonlyArrayDyn,
    PyUntypedArrayMethods, // .ndim()
};

#[cfg(feature = "python-bindings")]
use crate::{
    statistical_tests::TestStatOptions,
    unfolding::errors::{UnfoldError, UnfoldResult},
};

#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if arr_ro.as_slice().is_ok() {
            return Ok(arr_ro);
        }
    }

    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(series_ro) = obj.extract::<PyReadonlyArray1<f64>>() {
            if series_ro.as_slice().is_ok() {
                return Ok(series_ro);
            }
        }
    }

    let vec: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D numpy.ndarray, pandas.Series, or sequence of float64",
        )
    })?;
    Ok(vec.into_pyarray(py).readonly())
}

/// Copy a 1-D array-like into an owned `Array1<f64>`.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_vector<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>, name: &str,
) -> PyResult<Array1<f64>> {
    let arr = extract_f64_array(py, raw_data)?;
    let slice = arr.as_slice().map_err(|_| {
        PyValueError::new_err(format!("{name} must be a 1-D contiguous float64 array or sequence"))
    })?;
    Ok(Array1::from(slice.to_vec()))
}

/// Copy a 2-D array-like into an owned `Array2<f64>`.
///
/// Parameters
/// ----------
/// - `raw_data`: `&PyAny`
///   A numpy array (any memory layout) or a sequence of equal-length
///   float sequences.
/// - `what`: `&'static str`
///   Label used in shape errors (e.g. `"response"`).
///
/// Returns
/// -------
/// `PyResult<Array2<f64>>`
///
/// Errors
/// ------
/// - `ValueError` (from `UnfoldError::ShapeMismatch`)
///   When the input has rank other than 2 or its rows are ragged.
/// - `TypeError`
///   When the input is not numeric.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(
    raw_data: &Bound<'py, PyAny>, what: &'static str,
) -> PyResult<Array2<f64>> {
    if let Ok(arr) = raw_data.extract::<PyReadonlyArrayDyn<f64>>() {
        return Ok(dyn_to_matrix(&arr, what)?);
    }
    if let Ok(obj) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(arr) = obj.extract::<PyReadonlyArrayDyn<f64>>() {
            return Ok(dyn_to_matrix(&arr, what)?);
        }
    }
    if let Ok(rows) = raw_data.extract::<Vec<Vec<f64>>>() {
        return Ok(rows_to_matrix(rows, what)?);
    }
    if raw_data.extract::<Vec<f64>>().is_ok() {
        return Err(UnfoldError::ShapeMismatch { what, expected: 2, found: 1 }.into());
    }
    Err(pyo3::exceptions::PyTypeError::new_err(
        "expected a 2-D numpy.ndarray, pandas.DataFrame, or nested sequence of float64",
    ))
}

#[cfg(feature = "python-bindings")]
fn dyn_to_matrix(arr: &PyReadonlyArrayDyn<'_, f64>, what: &'static str) -> UnfoldResult<Array2<f64>> {
    let ndim = arr.ndim();
    arr.as_array()
        .to_owned()
        .into_dimensionality::<Ix2>()
        .map_err(|_| UnfoldError::ShapeMismatch { what, expected: 2, found: ndim })
}

#[cfg(feature = "python-bindings")]
fn rows_to_matrix(rows: Vec<Vec<f64>>, what: &'static str) -> UnfoldResult<Array2<f64>> {
    let nrows = rows.len();
    let ncols = rows.first().map_or(0, Vec::len);
    if let Some(bad) = rows.iter().find(|r| r.len() != ncols) {
        return Err(UnfoldError::ShapeMismatch { what, expected: ncols, found: bad.len() });
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((nrows, ncols), flat)
        .map_err(|_| UnfoldError::ShapeMismatch { what, expected: nrows * ncols, found: 0 })
}

/// Build [`TestStatOptions`] from Python keyword arguments.
#[cfg(feature = "python-bindings")]
pub fn extract_test_stat_options<'py>(
    py: Python<'py>, tol: Option<f64>, x_axis: Option<&Bound<'py, PyAny>>,
    test_range: Option<&Bound<'py, PyAny>>,
) -> PyResult<TestStatOptions> {
    let mut opts = TestStatOptions::default();
    if let Some(tol) = tol {
        opts.tol = tol;
    }
    if let Some(x_any) = x_axis {
        opts.x_axis = Some(extract_f64_vector(py, x_any, "x_axis")?.to_vec());
    }
    if let Some(range_any) = test_range {
        let limits = extract_f64_vector(py, range_any, "test_range")?;
        if limits.len() != 2 {
            return Err(PyValueError::new_err(format!(
                "test_range must have exactly two elements, got {}",
                limits.len()
            )));
        }
        opts.test_range = Some((limits[0], limits[1]));
    }
    Ok(opts)
}
