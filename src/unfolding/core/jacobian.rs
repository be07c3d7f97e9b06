//! Jacobian state and its iteration-over-iteration update (Adye propagation).
//!
//! Purpose
//! -------
//! Hold the sensitivities of the current cause estimate with respect to the
//! observed data (`dn`) and to the response-matrix entries (`dP`), and
//! advance them by one D'Agostini mixing step. From the second step on, the
//! update includes Adye's correction for the dependence of the prior on the
//! same data and response used in earlier steps.
//!
//! Key behaviors
//! -------------
//! - [`JacobianState`] is a plain value `{iteration, dn, dP}`. It is advanced
//!   by ownership through [`JacobianState::advance`], which never mutates a
//!   shared instance.
//! - [`first_order_response_jacobian`] computes the one-step derivative
//!   `dP⁰` of the Bayes update with the prior held fixed.
//! - At `iteration > 0`, [`JacobianState::advance`] chains the previous
//!   `dn`, `dP` through `∂n_new/∂n_prev`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `dn` has shape `(effect_bins, cause_bins)`, `dn[e, c] = ∂n_c/∂d_e`.
//! - `dP` has shape `(cause_bins, cause_bins · effect_bins)` with column
//!   index `e · cause_bins + k`, `dP[c, e·C + k] = ∂n_c/∂R[e, k]`.
//! - At `iteration == 0` both are identically zero.
//! - A [`MixingStep`] must be sized by the same bins as the state; this is
//!   checked and reported as [`UnfoldError::ShapeMismatch`].
//!
//! Conventions
//! -----------
//! With `g = d ⊙ safe_inverse(f)`, `r = n_new ⊙ safe_inverse(n_prev)`,
//! `s = eff ⊙ safe_inverse(n_prev)`:
//!
//! ```text
//! dP⁰[c, e·C + k] = −g[e]·M[e,c]·n_prev[k]
//!                  + δ(c,k)·(n_prev[c]·g[e] − n_new[c])·eff_inv[c]
//!
//! t = 0:  dn = M
//!         dP = dP⁰
//!
//! t > 0:  A  = −(M ⊙_col s)ᵀ, columns scaled by d         (C × E)
//!         dn = M + M·(A·dn_prev) + dn_prev ⊙_col r
//!         B  = (Mᵀ, columns scaled by d) · (M ⊙_col s)    (C × C)
//!         dP = dP⁰ + (r ⊙_row dP_prev − B·dP_prev)
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests check the zero state, the exact `t = 0` transition, a
//!   hand-expanded `t = 1` transition, counter increments, and shape
//!   rejection. Finite-difference checks of `dP` live in the integration
//!   tests.

use log::trace;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, s};

use crate::unfolding::{
    core::{
        inputs::UnfoldingInputs,
        numerics::{safe_inverse, scale_columns, scale_rows},
    },
    errors::{UnfoldError, UnfoldResult},
};

/// MixingStep — the quantities of one Bayes update needed for propagation.
///
/// Fields
/// ------
/// - `mixing`: `M`, shape `(effect_bins, cause_bins)`.
/// - `predicted`: `f = R · n_prev`, length `effect_bins`.
/// - `posterior`: `n_new = dᵀ · M`, length `cause_bins`.
/// - `prior`: `n_prev`, length `cause_bins`.
#[derive(Debug, Clone, Copy)]
pub struct MixingStep<'a> {
    pub mixing: ArrayView2<'a, f64>,
    pub predicted: ArrayView1<'a, f64>,
    pub posterior: ArrayView1<'a, f64>,
    pub prior: ArrayView1<'a, f64>,
}

impl<'a> MixingStep<'a> {
    /// Check every field against the given bin counts.
    fn validate(&self, effect_bins: usize, cause_bins: usize) -> UnfoldResult<()> {
        let checks = [
            ("mixing matrix rows", effect_bins, self.mixing.nrows()),
            ("mixing matrix columns", cause_bins, self.mixing.ncols()),
            ("predicted effects length", effect_bins, self.predicted.len()),
            ("posterior length", cause_bins, self.posterior.len()),
            ("prior length", cause_bins, self.prior.len()),
        ];
        for (what, expected, found) in checks {
            if expected != found {
                return Err(UnfoldError::ShapeMismatch { what, expected, found });
            }
        }
        Ok(())
    }
}

/// JacobianState — sensitivities of the cause estimate after `iteration`
/// mixing steps.
///
/// Purpose
/// -------
/// Carry the history-dependent derivatives needed for the statistical
/// (`dn`) and systematic (`dP`) covariance of the unfolded distribution.
///
/// Fields
/// ------
/// - `iteration`: `usize`
///   Number of completed mixing steps.
/// - `dn`: `Array2<f64>`, shape `(effect_bins, cause_bins)`.
/// - `dp`: `Array2<f64>`, shape `(cause_bins, cause_bins · effect_bins)`.
///
/// Invariants
/// ----------
/// - `iteration == 0` ⇒ `dn` and `dp` are all zero.
/// - Shapes never change after [`JacobianState::zeros`].
///
/// Notes
/// -----
/// - The state is not tied to a particular [`UnfoldingInputs`] value;
///   callers must advance it with the inputs it was created for.
#[derive(Debug, Clone, PartialEq)]
pub struct JacobianState {
    iteration: usize,
    dn: Array2<f64>,
    dp: Array2<f64>,
}

impl JacobianState {
    /// Zero state for `effect_bins × cause_bins` inputs.
    pub fn zeros(effect_bins: usize, cause_bins: usize) -> Self {
        JacobianState {
            iteration: 0,
            dn: Array2::zeros((effect_bins, cause_bins)),
            dp: Array2::zeros((cause_bins, cause_bins * effect_bins)),
        }
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// `∂n/∂d`, shape `(effect_bins, cause_bins)`.
    pub fn dn(&self) -> &Array2<f64> {
        &self.dn
    }

    /// `∂n/∂R`, shape `(cause_bins, cause_bins · effect_bins)`.
    pub fn dp(&self) -> &Array2<f64> {
        &self.dp
    }

    /// Check that `step` and `inputs` are sized by this state's bins.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::ShapeMismatch`
    ///   On the first disagreeing dimension.
    pub fn check_step(&self, step: &MixingStep<'_>, inputs: &UnfoldingInputs) -> UnfoldResult<()> {
        let (effect_bins, cause_bins) = self.dn.dim();
        if inputs.effect_bins() != effect_bins {
            return Err(UnfoldError::ShapeMismatch {
                what: "input effect bins",
                expected: effect_bins,
                found: inputs.effect_bins(),
            });
        }
        if inputs.cause_bins() != cause_bins {
            return Err(UnfoldError::ShapeMismatch {
                what: "input cause bins",
                expected: cause_bins,
                found: inputs.cause_bins(),
            });
        }
        step.validate(effect_bins, cause_bins)
    }

    /// Advance the state by one mixing step.
    ///
    /// Parameters
    /// ----------
    /// - `self`: `JacobianState`
    ///   State after `t` steps; consumed.
    /// - `step`: `&MixingStep`
    ///   Quantities of step `t + 1` as produced by the mixer.
    /// - `inputs`: `&UnfoldingInputs`
    ///   The inputs this state was created for (data, efficiencies,
    ///   `eff_inv`).
    ///
    /// Returns
    /// -------
    /// `UnfoldResult<JacobianState>`
    ///   State after `t + 1` steps. For `t = 0` this is exactly
    ///   `{dn: M, dP: dP⁰}`; for `t > 0` the Adye-corrected Jacobians.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::ShapeMismatch`
    ///   When the step or the inputs disagree with this state's bin
    ///   counts. The consumed state is dropped in that case.
    ///
    /// Panics
    /// ------
    /// - Never panics once shapes have been validated.
    pub fn advance(self, step: &MixingStep<'_>, inputs: &UnfoldingInputs) -> UnfoldResult<Self> {
        self.check_step(step, inputs)?;

        let dp_local = first_order_response_jacobian(step, inputs);
        let (dn, dp) = if self.iteration > 0 {
            trace!("applying Adye propagation corrections at iteration {}", self.iteration);
            adye_corrections(dp_local, step, inputs, &self.dn, &self.dp)
        } else {
            (step.mixing.to_owned(), dp_local)
        };

        Ok(JacobianState { iteration: self.iteration + 1, dn, dp })
    }
}

/// First-order derivative of one Bayes update with respect to the response.
///
/// Parameters
/// ----------
/// - `step`: `&MixingStep`
///   Mixing matrix, predicted effects, posterior, and prior of the step.
///   Shapes are assumed consistent with `inputs`.
/// - `inputs`: `&UnfoldingInputs`
///   Source of the observed data and `eff_inv`.
///
/// Returns
/// -------
/// `Array2<f64>`
///   `dP⁰` of shape `(cause_bins, cause_bins · effect_bins)`:
///   `dP⁰[c, e·C + k] = −g[e]·M[e,c]·n_prev[k]`, plus
///   `(n_prev[c]·g[e] − n_new[c])·eff_inv[c]` on the `k = c` entries,
///   where `g = d ⊙ safe_inverse(f)`.
///
/// Panics
/// ------
/// - If the step shapes disagree with `inputs`; [`JacobianState::advance`]
///   validates them first.
///
/// Notes
/// -----
/// - The `−n_new[c]·eff_inv[c]` part is the derivative through the
///   efficiency when it is read as the column sum of the response.
pub fn first_order_response_jacobian(
    step: &MixingStep<'_>, inputs: &UnfoldingInputs,
) -> Array2<f64> {
    let (effect_bins, cause_bins) = step.mixing.dim();
    let g: Array1<f64> = inputs.data() * &safe_inverse(&step.predicted);
    let eff_inv = inputs.eff_inv();

    let mut dp = Array2::<f64>::zeros((cause_bins, cause_bins * effect_bins));
    for e in 0..effect_bins {
        let g_e = g[e];
        let cols = e * cause_bins..(e + 1) * cause_bins;
        for c in 0..cause_bins {
            let coeff = -g_e * step.mixing[[e, c]];
            let mut block = dp.slice_mut(s![c, cols.clone()]);
            block.assign(&(&step.prior * coeff));
            block[c] += (step.prior[c] * g_e - step.posterior[c]) * eff_inv[c];
        }
    }
    dp
}

// ---- Helpers ----

/// Adye-corrected `(dn, dP)` for a step with history.
fn adye_corrections(
    dp_local: Array2<f64>, step: &MixingStep<'_>, inputs: &UnfoldingInputs,
    dn_prev: &Array2<f64>, dp_prev: &Array2<f64>,
) -> (Array2<f64>, Array2<f64>) {
    let mixing = &step.mixing;
    let data = inputs.data().view();

    let prior_inv = safe_inverse(&step.prior);
    let ratio = &step.posterior * &prior_inv;
    let eff_ratio = inputs.efficiencies() * &prior_inv;

    // ∂n/∂d
    let mixing_eff = scale_columns(mixing, eff_ratio.view());
    let neg_mixing_eff_t = mixing_eff.t().mapv(|v| -v);
    let a = scale_columns(&neg_mixing_eff_t, data);
    let mut dn = mixing.to_owned();
    dn += &mixing.dot(&a.dot(dn_prev));
    dn += &scale_columns(dn_prev, ratio.view());

    // ∂n/∂R
    let weighted_t = scale_columns(&mixing.t(), data);
    let b = weighted_t.dot(&mixing_eff);
    let dp_update = b.dot(dp_prev);
    let dp = dp_local + &(scale_rows(dp_prev, ratio.view()) - &dp_update);

    (dn, dp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The all-zero initial state and its shapes.
    // - The first transition: dn == M and dP == dP⁰ exactly, counter = 1.
    // - The second transition against a hand-expanded Adye formula.
    // - ShapeMismatch on inconsistent steps or inputs.
    //
    // They intentionally DO NOT cover:
    // - Construction of M itself (see `unfolding::mixer`).
    // - Finite-difference validation of dP (integration tests).
    // -------------------------------------------------------------------------

    fn inputs_2x3() -> UnfoldingInputs {
        UnfoldingInputs::new(
            array![40.0, 60.0],
            array![40.0_f64.sqrt(), 60.0_f64.sqrt()],
            array![0.8, 0.9, 1.0],
            array![0.01, 0.01, 0.01],
            array![[0.5, 0.3, 0.4], [0.3, 0.6, 0.6]],
            array![[0.01, 0.02, 0.03], [0.02, 0.01, 0.03]],
        )
        .expect("valid inputs")
    }

    /// Reference one-step Bayes update, written out independently of the mixer.
    fn bayes_step(inputs: &UnfoldingInputs, prior: &Array1<f64>) -> (Array2<f64>, Array1<f64>, Array1<f64>) {
        let r = inputs.response();
        let f = r.dot(prior);
        let (ne, nc) = r.dim();
        let mut m = Array2::<f64>::zeros((ne, nc));
        for e in 0..ne {
            for c in 0..nc {
                let f_inv = if f[e] == 0.0 { 0.0 } else { 1.0 / f[e] };
                m[[e, c]] = r[[e, c]] * (prior[c] * inputs.eff_inv()[c]) * f_inv;
            }
        }
        let n_new = inputs.data().dot(&m);
        (m, f, n_new)
    }

    #[test]
    // Purpose
    // -------
    // Verify the zero state has the documented shapes and is all zero.
    //
    // Given
    // -----
    // - 2 effect bins, 3 cause bins.
    //
    // Expect
    // ------
    // - iteration = 0, dn 2×3 zeros, dP 3×6 zeros.
    fn zeros_state_has_documented_shapes() {
        let state = JacobianState::zeros(2, 3);
        assert_eq!(state.iteration(), 0);
        assert_eq!(state.dn().dim(), (2, 3));
        assert_eq!(state.dp().dim(), (3, 6));
        assert!(state.dn().iter().all(|&v| v == 0.0));
        assert!(state.dp().iter().all(|&v| v == 0.0));
    }

    #[test]
    // Purpose
    // -------
    // Ensure the first transition stores M and dP⁰ without correction.
    //
    // Given
    // -----
    // - A fresh 2×3 state and one Bayes step from a flat prior.
    //
    // Expect
    // ------
    // - iteration = 1, dn == M bit-for-bit, dP == dP⁰ bit-for-bit.
    // - Spot-check dP⁰ entries against the closed form.
    fn first_transition_is_first_order_only() {
        // Arrange
        let inputs = inputs_2x3();
        let prior = array![30.0, 30.0, 30.0];
        let (m, f, n_new) = bayes_step(&inputs, &prior);
        let step = MixingStep {
            mixing: m.view(),
            predicted: f.view(),
            posterior: n_new.view(),
            prior: prior.view(),
        };

        // Act
        let state = JacobianState::zeros(2, 3).advance(&step, &inputs).expect("shapes agree");
        let dp0 = first_order_response_jacobian(&step, &inputs);

        // Assert
        assert_eq!(state.iteration(), 1);
        assert_eq!(state.dn(), &m);
        assert_eq!(state.dp(), &dp0);

        let g1 = inputs.data()[1] / f[1];
        // Off-diagonal entry: c = 0, e = 1, k = 2.
        assert_relative_eq!(dp0[[0, 3 + 2]], -g1 * m[[1, 0]] * prior[2], epsilon = 1e-12);
        // Diagonal entry: c = k = 1, e = 1.
        let expected_diag = -g1 * m[[1, 1]] * prior[1]
            + (prior[1] * g1 - n_new[1]) * inputs.eff_inv()[1];
        assert_relative_eq!(dp0[[1, 3 + 1]], expected_diag, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check the second transition against an element-wise expansion of
    // the Adye recursion.
    //
    // Given
    // -----
    // - Two Bayes steps on 2×3 inputs, the second using the first posterior
    //   as its prior.
    //
    // Expect
    // ------
    // - iteration = 2.
    // - dn[e', c'] = M[e',c'] − Σ_c Σ_e M[e',c]·M[e,c]·s[c]·d[e]·dn₁[e,c']
    //                + dn₁[e',c']·r[c'].
    // - dP[c, j]   = dP⁰[c, j] + r[c]·dP₁[c, j]
    //                − Σ_k Σ_e M[e,c]·d[e]·M[e,k]·s[k]·dP₁[k, j].
    fn second_transition_matches_expanded_adye_formula() {
        // Arrange
        let inputs = inputs_2x3();
        let prior0 = array![30.0, 30.0, 30.0];
        let (m1, f1, n1) = bayes_step(&inputs, &prior0);
        let step1 =
            MixingStep { mixing: m1.view(), predicted: f1.view(), posterior: n1.view(), prior: prior0.view() };
        let state1 = JacobianState::zeros(2, 3).advance(&step1, &inputs).expect("step 1");
        let dn1 = state1.dn().clone();
        let dp1 = state1.dp().clone();

        let (m2, f2, n2) = bayes_step(&inputs, &n1);
        let step2 =
            MixingStep { mixing: m2.view(), predicted: f2.view(), posterior: n2.view(), prior: n1.view() };
        let dp0_2 = first_order_response_jacobian(&step2, &inputs);

        // Act
        let state2 = state1.advance(&step2, &inputs).expect("step 2");

        // Assert
        assert_eq!(state2.iteration(), 2);
        let d = inputs.data();
        let eff = inputs.efficiencies();
        let r: Vec<f64> = (0..3).map(|c| n2[c] / n1[c]).collect();
        let sv: Vec<f64> = (0..3).map(|c| eff[c] / n1[c]).collect();

        for ep in 0..2 {
            for cp in 0..3 {
                let mut corr = 0.0;
                for c in 0..3 {
                    for e in 0..2 {
                        corr -= m2[[ep, c]] * m2[[e, c]] * sv[c] * d[e] * dn1[[e, cp]];
                    }
                }
                let expected = m2[[ep, cp]] + corr + dn1[[ep, cp]] * r[cp];
                assert_relative_eq!(state2.dn()[[ep, cp]], expected, epsilon = 1e-10, max_relative = 1e-10);
            }
        }

        for c in 0..3 {
            for j in 0..6 {
                let mut upd = 0.0;
                for k in 0..3 {
                    for e in 0..2 {
                        upd += m2[[e, c]] * d[e] * m2[[e, k]] * sv[k] * dp1[[k, j]];
                    }
                }
                let expected = dp0_2[[c, j]] + r[c] * dp1[[c, j]] - upd;
                assert_relative_eq!(state2.dp()[[c, j]], expected, epsilon = 1e-10, max_relative = 1e-10);
            }
        }
        assert_ne!(state2.dn(), &m2, "Adye branch must differ from the first-order dn");
        assert_ne!(state2.dp(), &dp0_2, "Adye branch must differ from the first-order dP");
    }

    #[test]
    // Purpose
    // -------
    // Ensure inconsistent steps are rejected instead of panicking.
    //
    // Given
    // -----
    // - A 2×3 state and a step whose prior has length 2.
    // - A 2×2 state advanced with 2×3 inputs.
    //
    // Expect
    // ------
    // - ShapeMismatch in both cases.
    fn advance_rejects_inconsistent_shapes() {
        // Arrange
        let inputs = inputs_2x3();
        let prior = array![30.0, 30.0, 30.0];
        let (m, f, n_new) = bayes_step(&inputs, &prior);
        let short_prior = array![1.0, 1.0];
        let bad_step = MixingStep {
            mixing: m.view(),
            predicted: f.view(),
            posterior: n_new.view(),
            prior: short_prior.view(),
        };
        let good_step =
            MixingStep { mixing: m.view(), predicted: f.view(), posterior: n_new.view(), prior: prior.view() };

        // Act
        let bad_prior = JacobianState::zeros(2, 3).advance(&bad_step, &inputs);
        let bad_state = JacobianState::zeros(2, 2).advance(&good_step, &inputs);

        // Assert
        assert!(matches!(bad_prior, Err(UnfoldError::ShapeMismatch { what: "prior length", .. })));
        assert!(matches!(bad_state, Err(UnfoldError::ShapeMismatch { .. })));
        assert!(JacobianState::zeros(2, 3).check_step(&good_step, &inputs).is_ok());
        assert!(JacobianState::zeros(2, 3).check_step(&bad_step, &inputs).is_err());
    }
}
