//! unfolding — iterative Bayesian unfolding with Adye error propagation.
//!
//! Purpose
//! -------
//! Recover a "cause" distribution from an observed "effect" distribution
//! given a detector response matrix and per-cause efficiencies, one
//! D'Agostini update at a time, and propagate the uncertainty of the data
//! and of the response through every update.
//!
//! Key behaviors
//! -------------
//! - [`Mixer::smear`] performs one Bayes update and advances the owned
//!   [`CovarianceMatrix`].
//! - [`CovarianceMatrix`] derives the statistical (`Vc0`) and systematic
//!   (`Vc1`) covariance from the Jacobian history on demand.
//! - [`UnfoldingInputs`] validates shapes and finiteness once at the
//!   boundary.
//! - [`CovarianceType`] selects the response covariance model.
//!
//! Invariants & assumptions
//! ------------------------
//! - All divisions use the safe-inverse rule: a zero denominator yields a
//!   zero quotient. Degenerate bins never produce NaN or an error.
//! - Shape disagreements are reported as [`UnfoldError::ShapeMismatch`];
//!   nothing is truncated or padded.
//! - The iteration loop, the starting prior, and the stopping rule belong
//!   to the caller.
//!
//! Conventions
//! -----------
//! - Matrices are indexed `[effect, cause]`; the response Jacobian `dP` is
//!   flattened over `effect · cause_bins + cause`.
//! - The library emits `log` records (`debug` per step, `trace` on Adye
//!   corrections, `warn` on negative priors) and never installs a logger.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use ndarray::array;
//! use rust_unfold::unfolding::prelude::*;
//!
//! let mut mixer = Mixer::from_arrays(
//!     array![90.0, 110.0],
//!     array![90.0_f64.sqrt(), 110.0_f64.sqrt()],
//!     array![1.0, 1.0],
//!     array![0.01, 0.01],
//!     array![[0.9, 0.1], [0.1, 0.9]],
//!     array![[0.01, 0.01], [0.01, 0.01]],
//!     "poisson",
//! )?;
//! let mut prior = array![100.0, 100.0];
//! for _ in 0..4 {
//!     prior = mixer.smear(prior.view())?;
//! }
//! let cov = mixer.cov()?;
//! assert_eq!(cov.dim(), (2, 2));
//! # Ok::<(), UnfoldError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Each submodule carries unit tests; `tests/integration_unfolding_pipeline.rs`
//!   drives a full loop and checks `dP` against finite differences.

pub mod core;
pub mod covariance;
pub mod errors;
pub mod mixer;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::core::{CovarianceType, JacobianState, UnfoldingInputs, safe_inverse};
pub use self::covariance::CovarianceMatrix;
pub use self::errors::{UnfoldError, UnfoldResult};
pub use self::mixer::Mixer;

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::core::{CovarianceType, UnfoldingInputs};
    pub use super::covariance::CovarianceMatrix;
    pub use super::errors::{UnfoldError, UnfoldResult};
    pub use super::mixer::Mixer;
}
