//! Adye covariance of the unfolded cause distribution.
//!
//! Purpose
//! -------
//! Track the Jacobians of the current cause estimate across mixing steps
//! and assemble, on demand, the statistical and systematic covariance
//! matrices of the unfolded distribution.
//!
//! Key behaviors
//! -------------
//! - [`CovarianceMatrix::set_current_state`] is the only state transition:
//!   it advances the held [`JacobianState`] by one mixing step.
//! - All covariance accessors are derived from the current state on every
//!   call; nothing is cached.
//! - The response covariance mode is fixed at construction
//!   ([`CovarianceType`]); reading it under `Multinomial` fails with
//!   [`UnfoldError::NotImplemented`].
//!
//! Invariants & assumptions
//! ------------------------
//! - `Vcd = diag(data_err²)` is `effect × effect`.
//! - `Vc0 = dnᵀ · Vcd · dn` and `Vc1 = dP · V_PP · dPᵀ` are
//!   `cause × cause` and symmetric up to floating-point accumulation.
//! - Before any transition both Jacobians are zero, so every covariance is
//!   the zero matrix.
//!
//! Conventions
//! -----------
//! - `stat_err = sqrt(diag(Vc0))`, `mc_err = sqrt(diag(Vc1))`.
//! - `V_PP` is indexed by the flattened response position `e · C + c`.
//!
//! Downstream usage
//! ----------------
//! - Owned by [`Mixer`](crate::unfolding::mixer::Mixer), which feeds it
//!   one [`MixingStep`] per `smear`. Direct use is possible when the
//!   mixing step is computed elsewhere.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the zero state, symmetry and positive
//!   semi-definiteness of `Vc0`, the Poisson systematic term, and the
//!   read-time `NotImplemented` failure of the multinomial mode.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::unfolding::{
    core::{
        cov_type::CovarianceType,
        inputs::UnfoldingInputs,
        jacobian::{JacobianState, MixingStep},
        response_cov::poisson_covariance,
    },
    errors::{UnfoldError, UnfoldResult},
};

/// CovarianceMatrix — Jacobian history plus covariance assembly.
///
/// Fields
/// ------
/// - `inputs`: [`UnfoldingInputs`]
///   Data, efficiencies, response, and their uncertainties.
/// - `cov_type`: [`CovarianceType`]
///   Model for the covariance of response entries.
/// - `state`: [`JacobianState`]
///   Current `{iteration, dn, dP}`.
#[derive(Debug, Clone)]
pub struct CovarianceMatrix {
    inputs: UnfoldingInputs,
    cov_type: CovarianceType,
    state: JacobianState,
}

impl CovarianceMatrix {
    /// Start a covariance tracker at iteration 0 with zero Jacobians.
    pub fn new(inputs: UnfoldingInputs, cov_type: CovarianceType) -> Self {
        let state = JacobianState::zeros(inputs.effect_bins(), inputs.cause_bins());
        CovarianceMatrix { inputs, cov_type, state }
    }

    /// Advance the Jacobians by one mixing step.
    ///
    /// Parameters
    /// ----------
    /// - `mixing`: `ArrayView2<f64>`
    ///   Mixing matrix `M` of the step, shape `(effect_bins, cause_bins)`.
    /// - `predicted`: `ArrayView1<f64>`
    ///   Predicted effects `f = R · n_prev`, length `effect_bins`.
    /// - `posterior`: `ArrayView1<f64>`
    ///   Updated causes `n_new`, length `cause_bins`.
    /// - `prior`: `ArrayView1<f64>`
    ///   Causes `n_prev` the step started from, length `cause_bins`.
    ///
    /// Returns
    /// -------
    /// `UnfoldResult<()>`
    ///   `Ok(())` once the held state has advanced by one iteration.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::ShapeMismatch`
    ///   When any argument disagrees with the bin counts. The held state is
    ///   left unchanged in that case.
    pub fn set_current_state(
        &mut self, mixing: ArrayView2<'_, f64>, predicted: ArrayView1<'_, f64>,
        posterior: ArrayView1<'_, f64>, prior: ArrayView1<'_, f64>,
    ) -> UnfoldResult<()> {
        let step = MixingStep {
            mixing: mixing.reborrow(),
            predicted: predicted.reborrow(),
            posterior: posterior.reborrow(),
            prior: prior.reborrow(),
        };
        self.state.check_step(&step, &self.inputs)?;

        // Shapes are checked above, so `advance` cannot fail on the moved-out state.
        let held = std::mem::replace(&mut self.state, JacobianState::zeros(0, 0));
        self.state = held.advance(&step, &self.inputs)?;
        Ok(())
    }

    /// Number of completed mixing steps.
    pub fn iteration(&self) -> usize {
        self.state.iteration()
    }

    /// `∂n/∂d`, shape `(effect_bins, cause_bins)`.
    pub fn dn(&self) -> &Array2<f64> {
        self.state.dn()
    }

    /// `∂n/∂R`, shape `(cause_bins, cause_bins · effect_bins)`.
    pub fn dp(&self) -> &Array2<f64> {
        self.state.dp()
    }

    pub fn state(&self) -> &JacobianState {
        &self.state
    }

    pub fn inputs(&self) -> &UnfoldingInputs {
        &self.inputs
    }

    pub fn cov_type(&self) -> CovarianceType {
        self.cov_type
    }

    /// Covariance of the observed data, `diag(data_err²)`.
    pub fn vcd(&self) -> Array2<f64> {
        Array2::from_diag(&self.inputs.data_err().mapv(|s| s * s))
    }

    /// Statistical covariance `Vc0 = dnᵀ · Vcd · dn`.
    ///
    /// Returns
    /// -------
    /// `Array2<f64>`
    ///   `cause × cause` symmetric matrix; zero before the first step.
    pub fn vc0(&self) -> Array2<f64> {
        let dn = self.state.dn();
        dn.t().dot(&self.vcd()).dot(dn)
    }

    /// Covariance of the flattened response entries.
    ///
    /// Returns
    /// -------
    /// `UnfoldResult<Array2<f64>>`
    ///   Under `Poisson`, `diag(Rerr²)` with side `effect_bins · cause_bins`.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::NotImplemented`
    ///   Under `Multinomial`.
    pub fn vc_pp(&self) -> UnfoldResult<Array2<f64>> {
        match self.cov_type {
            CovarianceType::Poisson => Ok(poisson_covariance(self.inputs.response_err())),
            CovarianceType::Multinomial => {
                Err(UnfoldError::NotImplemented { feature: "multinomial response covariance" })
            }
        }
    }

    /// Systematic covariance `Vc1 = dP · V_PP · dPᵀ`.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::NotImplemented`
    ///   Propagated from [`CovarianceMatrix::vc_pp`].
    pub fn vc1(&self) -> UnfoldResult<Array2<f64>> {
        let vc_pp = self.vc_pp()?;
        let dp = self.state.dp();
        Ok(dp.dot(&vc_pp).dot(&dp.t()))
    }

    /// Total covariance `Vc0 + Vc1`.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::NotImplemented`
    ///   Propagated from [`CovarianceMatrix::vc_pp`].
    pub fn cov(&self) -> UnfoldResult<Array2<f64>> {
        Ok(self.vc0() + &self.vc1()?)
    }

    /// Statistical uncertainty per cause bin, `sqrt(diag(Vc0))`.
    pub fn stat_err(&self) -> Array1<f64> {
        diag_sqrt(&self.vc0())
    }

    /// Systematic uncertainty per cause bin, `sqrt(diag(Vc1))`.
    pub fn mc_err(&self) -> UnfoldResult<Array1<f64>> {
        Ok(diag_sqrt(&self.vc1()?))
    }
}

// Diagonals of Vc0/Vc1 are sums of squares; clamp round-off below zero.
fn diag_sqrt(m: &Array2<f64>) -> Array1<f64> {
    m.diag().mapv(|v| v.max(0.0).sqrt())
}
