//! D'Agostini mixing step with attached Adye covariance tracking.
//!
//! Purpose
//! -------
//! Perform one Bayesian update of the cause distribution per call to
//! [`Mixer::smear`] and keep the owned [`CovarianceMatrix`] in sync, so the
//! covariance of the latest estimate is available at any point of an
//! external iteration loop.
//!
//! Key behaviors
//! -------------
//! - `smear(prior)` computes
//!   `f = R·prior`, `M[e,c] = R[e,c]·prior[c]·eff_inv[c]·safe_inverse(f)[e]`,
//!   `n_new = dᵀ·M`, caches `M`, and advances the covariance tracker.
//! - `cov`, `stat_err`, `mc_err` delegate to the tracker and reflect the
//!   most recent smear (zero before the first).
//!
//! Invariants & assumptions
//! ------------------------
//! - The prior must have `cause_bins` entries. Negative entries are not
//!   rejected; they are logged at `warn` level since the update stays
//!   defined.
//! - Zero predicted-effect bins yield zero mixing rows instead of NaN.
//! - Calls are sequential; `smear` takes `&mut self`.
//!
//! Conventions
//! -----------
//! - The mixer does not decide when to stop iterating; drivers compare
//!   successive results with a
//!   [`TestStat`](crate::statistical_tests::TestStat).
//!
//! Testing notes
//! -------------
//! - Unit tests cover a hand-computed 2×2 case, count conservation for
//!   normalized responses, determinism across fresh mixers, the first-step
//!   Jacobian identity, and shape rejection.

use log::{debug, warn};
use ndarray::{Array1, Array2, ArrayView1, Axis};

use crate::unfolding::{
    core::{
        cov_type::CovarianceType,
        inputs::{UnfoldingInputs, ensure_finite},
        numerics::safe_inverse,
    },
    covariance::CovarianceMatrix,
    errors::{UnfoldError, UnfoldResult},
};

/// Mixer — one-step Bayesian unfolder.
///
/// Purpose
/// -------
/// Map a prior cause distribution to a posterior using the observed data
/// and the detector response, while tracking the posterior covariance.
///
/// Fields
/// ------
/// - `covariance`: [`CovarianceMatrix`]
///   Owns the validated inputs and the Jacobian history.
/// - `mixing`: `Array2<f64>`
///   Mixing matrix of the most recent smear; zeros before the first.
///
/// Invariants
/// ----------
/// - `mixing.dim() == (effect_bins, cause_bins)`.
/// - `covariance.iteration()` equals the number of successful smears.
///
/// Notes
/// -----
/// - `Mixer` is `Send`; independent runs may live on separate threads.
#[derive(Debug, Clone)]
pub struct Mixer {
    covariance: CovarianceMatrix,
    mixing: Array2<f64>,
}

impl Mixer {
    /// Build a mixer from validated inputs.
    pub fn new(inputs: UnfoldingInputs, cov_type: CovarianceType) -> Self {
        let mixing = Array2::zeros((inputs.effect_bins(), inputs.cause_bins()));
        let covariance = CovarianceMatrix::new(inputs, cov_type);
        Mixer { covariance, mixing }
    }

    /// Validate raw arrays and build a mixer.
    ///
    /// Parameters
    /// ----------
    /// - `data`, `data_err`: `Array1<f64>`, length `effect_bins`.
    /// - `efficiencies`, `efficiencies_err`: `Array1<f64>`, length
    ///   `cause_bins`.
    /// - `response`, `response_err`: `Array2<f64>`, shape
    ///   `(effect_bins, cause_bins)`.
    /// - `cov_type`: `&str`
    ///   `"poisson"` or `"multinomial"`, case-insensitive.
    ///
    /// Returns
    /// -------
    /// `UnfoldResult<Mixer>`
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::InvalidConfig`
    ///   When `cov_type` is not recognized.
    /// - `UnfoldError::ShapeMismatch`, `UnfoldError::NonFiniteInput`
    ///   From [`UnfoldingInputs::new`].
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_unfold::unfolding::Mixer;
    /// let mut mixer = Mixer::from_arrays(
    ///     array![90.0, 110.0],
    ///     array![90.0_f64.sqrt(), 110.0_f64.sqrt()],
    ///     array![1.0, 1.0],
    ///     array![0.01, 0.01],
    ///     array![[0.9, 0.1], [0.1, 0.9]],
    ///     array![[0.01, 0.01], [0.01, 0.01]],
    ///     "poisson",
    /// )
    /// .unwrap();
    /// let n = mixer.smear(array![100.0, 100.0].view()).unwrap();
    /// assert!((n[0] - 92.0).abs() < 1e-12);
    /// assert!((n[1] - 108.0).abs() < 1e-12);
    /// ```
    pub fn from_arrays(
        data: Array1<f64>, data_err: Array1<f64>, efficiencies: Array1<f64>,
        efficiencies_err: Array1<f64>, response: Array2<f64>, response_err: Array2<f64>,
        cov_type: &str,
    ) -> UnfoldResult<Self> {
        let cov_type: CovarianceType = cov_type.parse()?;
        let inputs = UnfoldingInputs::new(
            data,
            data_err,
            efficiencies,
            efficiencies_err,
            response,
            response_err,
        )?;
        Ok(Mixer::new(inputs, cov_type))
    }

    /// Run one Bayesian update.
    ///
    /// Parameters
    /// ----------
    /// - `prior`: `ArrayView1<f64>`
    ///   Current cause distribution, length `cause_bins`.
    ///
    /// Returns
    /// -------
    /// `UnfoldResult<Array1<f64>>`
    ///   Posterior `n_new = dᵀ·M`, length `cause_bins`.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::ShapeMismatch`
    ///   When `prior.len() != cause_bins`.
    /// - `UnfoldError::NonFiniteInput`
    ///   When the prior holds NaN or ±∞.
    ///
    /// No state changes on either error.
    ///
    /// Notes
    /// -----
    /// - Emits a `debug` record per step with the iteration and `Σ n_new`.
    pub fn smear(&mut self, prior: ArrayView1<'_, f64>) -> UnfoldResult<Array1<f64>> {
        let inputs = self.covariance.inputs();
        if prior.len() != inputs.cause_bins() {
            return Err(UnfoldError::ShapeMismatch {
                what: "prior length",
                expected: inputs.cause_bins(),
                found: prior.len(),
            });
        }
        ensure_finite("prior", &prior)?;
        if prior.iter().any(|&v| v < 0.0) {
            warn!("prior has negative entries; mixing proceeds with them as given");
        }

        let response = inputs.response();
        let predicted = response.dot(&prior);
        let predicted_inv = safe_inverse(&predicted);
        let prior_eff = &prior * inputs.eff_inv();

        let mixing = response * &prior_eff * &predicted_inv.view().insert_axis(Axis(1));
        let posterior = inputs.data().dot(&mixing);

        self.covariance.set_current_state(
            mixing.view(),
            predicted.view(),
            posterior.view(),
            prior,
        )?;
        self.mixing = mixing;

        debug!(
            "mixing step {}: sum(n_new) = {:.6}",
            self.covariance.iteration(),
            posterior.sum()
        );
        Ok(posterior)
    }

    /// Mixing matrix of the most recent smear.
    pub fn mixing_matrix(&self) -> &Array2<f64> {
        &self.mixing
    }

    pub fn cause_bins(&self) -> usize {
        self.covariance.inputs().cause_bins()
    }

    pub fn effect_bins(&self) -> usize {
        self.covariance.inputs().effect_bins()
    }

    pub fn cov_type(&self) -> CovarianceType {
        self.covariance.cov_type()
    }

    /// Number of completed smears.
    pub fn iteration(&self) -> usize {
        self.covariance.iteration()
    }

    pub fn covariance(&self) -> &CovarianceMatrix {
        &self.covariance
    }

    /// Total covariance of the latest posterior.
    pub fn cov(&self) -> UnfoldResult<Array2<f64>> {
        self.covariance.cov()
    }

    /// Statistical uncertainty of the latest posterior.
    pub fn stat_err(&self) -> Array1<f64> {
        self.covariance.stat_err()
    }

    /// Systematic (response) uncertainty of the latest posterior.
    pub fn mc_err(&self) -> UnfoldResult<Array1<f64>> {
        self.covariance.mc_err()
    }
}
