//! statistical_tests::errors — error type for convergence test statistics.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias shared by the two-distribution
//! comparison statistics in [`test_stat`](super::test_stat) and their input
//! guards in [`validation`](super::validation), together with a conversion
//! into Python exceptions for the PyO3 layer.
//!
//! Key behaviors
//! -------------
//! - Define [`TSResult`] and [`TSError`] as the canonical result and error
//!   types for statistic configuration and evaluation.
//! - Attach `Display` messages phrased in terms of the offending input so
//!   diagnostics are meaningful without extra context.
//! - Implement `From<TSError> for PyErr`, mapping every variant onto
//!   `ValueError`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Configuration errors (`InvalidRange`, `RangeOutsideAxis`,
//!   `UnknownStatistic`, `InvalidTolerance`) are raised at construction;
//!   data errors (`LengthMismatch`, `EmptyInput`, `NonFiniteData`,
//!   `NonPositiveTotal`) at evaluation.
//! - A failed evaluation never updates the stored statistic.
//!
//! Testing notes
//! -------------
//! - Unit tests verify payload embedding in `Display` messages. The PyO3
//!   conversion is exercised from Python.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type TSResult<T> = Result<T, TSError>;

/// TSError — failures of test-statistic configuration and evaluation.
///
/// Variants
/// --------
/// - `LengthMismatch { left, right }`
///   The two distributions (after range selection) differ in length.
/// - `EmptyInput`
///   The compared distributions (after range selection) are empty.
/// - `InvalidRange { xlo, xhi }`
///   The test range is not strictly increasing (`xlo < xhi` required).
/// - `RangeOutsideAxis { xlo, xhi }`
///   The test range selects no bin of the x-axis, or no x-axis was given.
/// - `UnknownStatistic(name)`
///   The statistic name is not one of `chi2`, `pf`, `rmd`, `ks`.
/// - `NonFiniteData(value)`
///   A bin count is NaN or ±∞.
/// - `InvalidTolerance(tol)`
///   The convergence tolerance is negative or non-finite.
/// - `NonPositiveTotal(total)`
///   A distribution total is ≤ 0 for a statistic that normalizes by it.
#[derive(Debug, Clone, PartialEq)]
pub enum TSError {
    // ---- Data ----
    LengthMismatch { left: usize, right: usize },
    EmptyInput,
    NonFiniteData(f64),
    NonPositiveTotal(f64),

    // ---- Configuration ----
    InvalidRange { xlo: f64, xhi: f64 },
    RangeOutsideAxis { xlo: f64, xhi: f64 },
    UnknownStatistic(String),
    InvalidTolerance(f64),
}

impl std::error::Error for TSError {}

impl std::fmt::Display for TSError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TSError::LengthMismatch { left, right } => {
                write!(f, "Test statistic arrays are not equal length: {left} != {right}.")
            }
            TSError::EmptyInput => write!(f, "Test statistic arrays must not be empty."),
            TSError::NonFiniteData(value) => {
                write!(f, "Invalid bin count: {value}. Must be a finite number.")
            }
            TSError::NonPositiveTotal(total) => {
                write!(f, "Distribution total must be positive, got {total}.")
            }
            TSError::InvalidRange { xlo, xhi } => {
                write!(f, "Invalid test range [{xlo}, {xhi}]: xlo must be < xhi.")
            }
            TSError::RangeOutsideAxis { xlo, xhi } => {
                write!(f, "Test range [{xlo}, {xhi}] selects no bins of the x-axis.")
            }
            TSError::UnknownStatistic(name) => {
                write!(f, "Invalid test statistic '{name}'. Must be one of chi2, pf, rmd, ks.")
            }
            TSError::InvalidTolerance(tol) => {
                write!(f, "Invalid tolerance: {tol}. Must be finite and non-negative.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<TSError> for PyErr {
    fn from(err: TSError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}
