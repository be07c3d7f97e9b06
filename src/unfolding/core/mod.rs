//! unfolding::core — validated inputs, numerics, and Jacobian propagation.
//!
//! Purpose
//! -------
//! Hold the building blocks shared by the [`Mixer`](crate::unfolding::mixer::Mixer)
//! and the [`CovarianceMatrix`](crate::unfolding::covariance::CovarianceMatrix):
//! the immutable input bundle, the safe-inverse rule, the response
//! covariance models, and the per-iteration Jacobian state.
//!
//! Key behaviors
//! -------------
//! - [`inputs`]: validate shapes and finiteness once; cache `eff_inv`.
//! - [`numerics`]: `safe_inverse` and row/column broadcasting helpers.
//! - [`cov_type`]: the closed [`CovarianceType`] enum with `FromStr`.
//! - [`response_cov`]: Poisson/multinomial response covariance and a
//!   symmetric eigenvalue diagnostic backed by `nalgebra`.
//! - [`jacobian`]: [`JacobianState`] and its Adye update.
//!
//! Conventions
//! -----------
//! - Matrices are `ndarray::Array2<f64>` indexed `[effect, cause]` unless
//!   documented otherwise; the response Jacobian `dP` is flattened with
//!   column index `effect · cause_bins + cause`.

pub mod cov_type;
pub mod inputs;
pub mod jacobian;
pub mod numerics;
pub mod response_cov;

// ---- Re-exports ----

pub use self::cov_type::CovarianceType;
pub use self::inputs::UnfoldingInputs;
pub use self::jacobian::{JacobianState, MixingStep, first_order_response_jacobian};
pub use self::numerics::safe_inverse;
pub use self::response_cov::{multinomial_covariance, poisson_covariance, symmetric_min_eigenvalue};
