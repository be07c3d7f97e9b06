//! rust_unfold — iterative Bayesian unfolding with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the unfolding engine to Python via the `_rust_unfold` extension
//! module. When the `python-bindings` feature is enabled, this module
//! defines the Python-facing classes and submodules used by the
//! `rust_unfold` package.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`unfolding` and `statistical_tests`)
//!   as the public crate surface.
//! - Define `#[pyclass]` wrappers for the D'Agostini [`Mixer`](unfolding::Mixer)
//!   and the convergence [`TestStat`](statistical_tests::TestStat), and the
//!   `#[pymodule]` initializer for `_rust_unfold`.
//! - Register the Python submodules (`mix`, `statistical_tests`) under
//!   `rust_unfold` so that dot-notation imports work.
//!
//! Invariants & assumptions
//! ------------------------
//! - All numerical work lives in the inner Rust modules; this file performs
//!   only FFI glue, input conversion, and error mapping.
//! - Python-visible types keep the invariants of their Rust counterparts:
//!   shapes are validated once at construction, and every failure surfaces
//!   as `ValueError` carrying the Rust `Display` message.
//!
//! Conventions
//! -----------
//! - Arrays cross the boundary as numpy arrays or nested sequences on the
//!   way in and as (nested) Python lists on the way out.
//! - Method names on the Python side (`get_cov`, `get_stat_err`,
//!   `get_MC_err`, `get_stats`, `pass_tol`) follow the established
//!   unfolding API rather than Rust naming.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should depend on [`unfolding`] and
//!   [`statistical_tests`] directly and can ignore the PyO3 items.
//! - The Python packaging layer imports `_rust_unfold` and drives the
//!   iteration loop (prior → smear → test statistic → stop or continue).
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by `tests/integration_unfolding_pipeline.rs`.
//! - The PyO3 layer is exercised from Python.

pub mod statistical_tests;
pub mod unfolding;
pub mod utils;

#[cfg(feature = "python-bindings")]
use ndarray::Array2;

#[cfg(feature = "python-bindings")]
use pyo3::{prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    statistical_tests::TestStat,
    unfolding::Mixer,
    utils::{extract_f64_matrix, extract_f64_vector, extract_test_stat_options},
};

#[cfg(feature = "python-bindings")]
fn to_rows(m: &Array2<f64>) -> Vec<Vec<f64>> {
    m.rows().into_iter().map(|row| row.to_vec()).collect()
}

/// Mixer — Python-facing wrapper for the D'Agostini mixing step.
///
/// Purpose
/// -------
/// Expose [`unfolding::Mixer`] to Python: one Bayes update per `smear`
/// call plus the Adye covariance of the latest estimate.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `Mixer(data, data_err, efficiencies, efficiencies_err, response,
/// response_err, cov_type="multinomial")`:
/// - `data`, `data_err`: 1-D array-likes of length `effect_bins`.
/// - `efficiencies`, `efficiencies_err`: 1-D array-likes of length
///   `cause_bins`.
/// - `response`, `response_err`: 2-D array-likes of shape
///   `(effect_bins, cause_bins)`.
/// - `cov_type`: `"poisson"` or `"multinomial"`, case-insensitive.
///
/// Fields
/// ------
/// - `inner`: [`unfolding::Mixer`]
///
/// Notes
/// -----
/// - Under `cov_type="multinomial"`, `get_cov` and `get_MC_err` raise
///   `ValueError` (not implemented); `smear` and `get_stat_err` work.
#[cfg(feature = "python-bindings")]
#[pyclass(name = "Mixer", module = "rust_unfold.mix")]
pub struct PyMixer {
    inner: Mixer,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyMixer {
    #[new]
    #[pyo3(
        signature = (
            data,
            data_err,
            efficiencies,
            efficiencies_err,
            response,
            response_err,
            cov_type = "multinomial",
        ),
        text_signature = "(data, data_err, efficiencies, efficiencies_err, response, \
                          response_err, /, cov_type='multinomial')"
    )]
    pub fn new<'py>(
        py: Python<'py>, data: &Bound<'py, PyAny>, data_err: &Bound<'py, PyAny>,
        efficiencies: &Bound<'py, PyAny>, efficiencies_err: &Bound<'py, PyAny>,
        response: &Bound<'py, PyAny>, response_err: &Bound<'py, PyAny>, cov_type: &str,
    ) -> PyResult<Self> {
        let inner = Mixer::from_arrays(
            extract_f64_vector(py, data, "data")?,
            extract_f64_vector(py, data_err, "data_err")?,
            extract_f64_vector(py, efficiencies, "efficiencies")?,
            extract_f64_vector(py, efficiencies_err, "efficiencies_err")?,
            extract_f64_matrix(response, "response")?,
            extract_f64_matrix(response_err, "response_err")?,
            cov_type,
        )?;
        Ok(PyMixer { inner })
    }

    /// Run one Bayesian update from `prior` and return the posterior.
    pub fn smear<'py>(&mut self, py: Python<'py>, prior: &Bound<'py, PyAny>) -> PyResult<Vec<f64>> {
        let prior = extract_f64_vector(py, prior, "prior")?;
        Ok(self.inner.smear(prior.view())?.to_vec())
    }

    /// Total covariance of the latest posterior (cause × cause).
    pub fn get_cov(&self) -> PyResult<Vec<Vec<f64>>> {
        Ok(to_rows(&self.inner.cov()?))
    }

    /// Statistical uncertainty per cause bin.
    pub fn get_stat_err(&self) -> Vec<f64> {
        self.inner.stat_err().to_vec()
    }

    /// Response-matrix (MC) uncertainty per cause bin.
    #[allow(non_snake_case)]
    pub fn get_MC_err(&self) -> PyResult<Vec<f64>> {
        Ok(self.inner.mc_err()?.to_vec())
    }

    /// Mixing matrix of the most recent smear (effect × cause).
    #[getter]
    pub fn mixing_matrix(&self) -> Vec<Vec<f64>> {
        to_rows(self.inner.mixing_matrix())
    }

    #[getter]
    pub fn cause_bins(&self) -> usize {
        self.inner.cause_bins()
    }

    #[getter]
    pub fn effect_bins(&self) -> usize {
        self.inner.effect_bins()
    }

    /// Number of completed smears.
    #[getter]
    pub fn iteration(&self) -> usize {
        self.inner.iteration()
    }

    #[getter]
    pub fn cov_type(&self) -> &'static str {
        self.inner.cov_type().as_str()
    }
}

/// TestStat — Python-facing wrapper for convergence statistics.
///
/// Parameters
/// ----------
/// Constructed from Python via
/// `TestStat(name="ks", tol=None, x_axis=None, test_range=None)`:
/// - `name`: one of `"chi2"`, `"pf"`, `"rmd"`, `"ks"`.
/// - `tol`: convergence tolerance, default `0.01`.
/// - `x_axis`, `test_range`: optional bin positions and `[xlo, xhi]`
///   window.
///
/// Fields
/// ------
/// - `inner`: [`statistical_tests::TestStat`]
#[cfg(feature = "python-bindings")]
#[pyclass(name = "TestStat", module = "rust_unfold.statistical_tests")]
pub struct PyTestStat {
    inner: TestStat,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl PyTestStat {
    #[new]
    #[pyo3(
        signature = (name = "ks", tol = None, x_axis = None, test_range = None),
        text_signature = "(name='ks', tol=None, x_axis=None, test_range=None)"
    )]
    pub fn new<'py>(
        py: Python<'py>, name: &str, tol: Option<f64>, x_axis: Option<&Bound<'py, PyAny>>,
        test_range: Option<&Bound<'py, PyAny>>,
    ) -> PyResult<Self> {
        let opts = extract_test_stat_options(py, tol, x_axis, test_range)?;
        Ok(PyTestStat { inner: TestStat::from_name(name, opts)? })
    }

    /// Compare two distributions; returns `(stat, delstat, prob)`.
    pub fn get_stats<'py>(
        &mut self, py: Python<'py>, n1: &Bound<'py, PyAny>, n2: &Bound<'py, PyAny>,
    ) -> PyResult<(f64, f64, f64)> {
        let n1 = extract_f64_vector(py, n1, "n1")?.to_vec();
        let n2 = extract_f64_vector(py, n2, "n2")?.to_vec();
        let out = self.inner.get_stats(&n1, &n2)?;
        Ok(out.as_tuple())
    }

    /// Whether the latest statistic is below the tolerance.
    pub fn pass_tol(&self) -> bool {
        self.inner.pass_tol()
    }

    #[getter]
    pub fn name(&self) -> &'static str {
        self.inner.kind().as_str()
    }

    #[getter]
    pub fn stat(&self) -> f64 {
        self.inner.stat()
    }

    #[getter]
    pub fn delstat(&self) -> f64 {
        self.inner.delstat()
    }

    #[getter]
    pub fn prob(&self) -> f64 {
        self.inner.prob()
    }

    #[getter]
    pub fn tol(&self) -> f64 {
        self.inner.tol()
    }
}

#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_unfold<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let mix_mod = PyModule::new(_py, "mix")?;
    let statistical_tests_mod = PyModule::new(_py, "statistical_tests")?;
    mix(_py, m, &mix_mod)?;
    statistical_tests(_py, m, &statistical_tests_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?.getattr("modules")?.set_item("rust_unfold.mix", mix_mod)?;

    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_unfold.statistical_tests", statistical_tests_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn mix<'py>(
    _py: Python, rust_unfold: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyMixer>()?;
    rust_unfold.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn statistical_tests<'py>(
    _py: Python, rust_unfold: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<PyTestStat>()?;
    rust_unfold.add_submodule(m)?;
    Ok(())
}
