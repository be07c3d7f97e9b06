//! unfolding::errors — error type for the mixing and covariance engine.
//!
//! Purpose
//! -------
//! Provide the single error enum, [`UnfoldError`], and result alias,
//! [`UnfoldResult`], shared by input validation, the Bayesian [`Mixer`],
//! and the Adye [`CovarianceMatrix`]. A conversion into `PyErr` is provided
//! when the `python-bindings` feature is enabled.
//!
//! Key behaviors
//! -------------
//! - Report every dimension inconsistency as [`UnfoldError::ShapeMismatch`]
//!   with a short label naming the offending array and both sizes.
//! - Report an unrecognized covariance tag as
//!   [`UnfoldError::InvalidConfig`] at parse time.
//! - Report reads of the multinomial response covariance as
//!   [`UnfoldError::NotImplemented`] at the point of the read.
//!
//! Invariants & assumptions
//! ------------------------
//! - Zero predicted-effect bins and zero prior entries are *not* errors;
//!   they are resolved by the safe-inverse rule in
//!   `unfolding::core::numerics`.
//! - Non-finite inputs (NaN, ±∞) are rejected once, when the input bundle
//!   is validated; the engine never sees them afterwards.
//!
//! Conventions
//! -----------
//! - Messages are phrased in terms of bins and arrays ("response rows",
//!   "prior length") rather than internal buffer names.
//! - At the Python boundary `NotImplemented` maps onto `NotImplementedError`
//!   and every other variant onto `ValueError`, keeping the `Display`
//!   message verbatim.
//!
//! [`Mixer`]: crate::unfolding::mixer::Mixer
//! [`CovarianceMatrix`]: crate::unfolding::covariance::CovarianceMatrix

#[cfg(feature = "python-bindings")]
use pyo3::{
    PyErr,
    exceptions::{PyNotImplementedError, PyValueError},
};

pub type UnfoldResult<T> = Result<T, UnfoldError>;

/// UnfoldError — failures of the unfolding core.
///
/// Variants
/// --------
/// - `ShapeMismatch { what, expected, found }`
///   A vector or matrix dimension disagrees with the bin counts fixed by
///   the response matrix. `what` names the offending quantity.
/// - `InvalidConfig { cov_type }`
///   The response covariance tag is neither `"poisson"` nor
///   `"multinomial"` (case-insensitive).
/// - `NotImplemented { feature }`
///   A code path that is configured but has no implementation was read
///   (currently only the multinomial response covariance).
/// - `NonFiniteInput { what, index, value }`
///   An input array holds NaN or ±∞ at flat (row-major) position `index`.
#[derive(Debug, Clone, PartialEq)]
pub enum UnfoldError {
    // ---- Shapes ----
    ShapeMismatch { what: &'static str, expected: usize, found: usize },

    // ---- Configuration ----
    InvalidConfig { cov_type: String },

    NotImplemented { feature: &'static str },

    // ---- Input values ----
    NonFiniteInput { what: &'static str, index: usize, value: f64 },
}

impl UnfoldError {
    /// Whether the error marks a mode that is accepted but not computable.
    pub fn is_not_implemented(&self) -> bool {
        matches!(self, UnfoldError::NotImplemented { .. })
    }
}

impl std::error::Error for UnfoldError {}

impl std::fmt::Display for UnfoldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnfoldError::ShapeMismatch { what, expected, found } => {
                write!(f, "Shape mismatch in {what}: expected {expected} bins, found {found}.")
            }
            UnfoldError::InvalidConfig { cov_type } => write!(
                f,
                "Invalid response covariance type {cov_type:?}. Must be either \"multinomial\" or \"poisson\"."
            ),
            UnfoldError::NotImplemented { feature } => {
                write!(f, "Not implemented: {feature}.")
            }
            UnfoldError::NonFiniteInput { what, index, value } => {
                write!(f, "Invalid {what} value {value} at index {index}. Must be a finite number.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<UnfoldError> for PyErr {
    fn from(err: UnfoldError) -> PyErr {
        if err.is_not_implemented() {
            PyNotImplementedError::new_err(err.to_string())
        } else {
            PyValueError::new_err(err.to_string())
        }
    }
}
