//! Validated input bundle for the unfolding engine.
//!
//! Purpose
//! -------
//! Collect the six immutable inputs of an unfolding run (observed data,
//! efficiencies, response matrix, and their uncertainties) into one
//! container whose construction enforces every shape invariant. Downstream
//! code ([`Mixer`], [`CovarianceMatrix`]) relies on these invariants and
//! does not re-check them.
//!
//! Key behaviors
//! -------------
//! - [`UnfoldingInputs::new`] checks all dimensions against the response
//!   matrix and rejects non-finite entries.
//! - Precomputes `eff_inv = safe_inverse(efficiencies)`, which both the
//!   mixing step and the response Jacobian use.
//! - Exposes derived quantities of the raw inputs: the effective
//!   number of simulated events per cause bin and the total observed count.
//!
//! Invariants & assumptions
//! ------------------------
//! - `effect_bins = response.nrows() = data.len() = data_err.len()`.
//! - `cause_bins = response.ncols() = efficiencies.len()
//!   = efficiencies_err.len()`.
//! - `response_err.dim() == response.dim()`.
//! - Every entry of every input is finite.
//! - The response is assumed (not checked) to hold conditional
//!   probabilities `P(effect | cause)`; unnormalized responses still run,
//!   they just do not conserve counts.
//!
//! Conventions
//! -----------
//! - Rows index effect bins, columns index cause bins.
//! - Checks run in a fixed order (data vs response rows first) so the
//!   first reported mismatch is deterministic.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the happy path, each shape mismatch, non-finite
//!   rejection, and the derived quantities.
//!
//! [`Mixer`]: crate::unfolding::mixer::Mixer
//! [`CovarianceMatrix`]: crate::unfolding::covariance::CovarianceMatrix

use ndarray::{Array1, Array2, ArrayBase, Data, Dimension};

use crate::unfolding::{
    core::numerics::safe_inverse,
    errors::{UnfoldError, UnfoldResult},
};

/// `UnfoldingInputs` — shape-checked inputs of one unfolding run.
///
/// Purpose
/// -------
/// Own the observed effect distribution, the detector description, and
/// their uncertainties, guaranteeing mutually consistent bin counts.
///
/// Fields
/// ------
/// - `data`, `data_err`: `Array1<f64>` of length `effect_bins`
///   Observed counts and their per-bin uncertainty.
/// - `efficiencies`, `efficiencies_err`: `Array1<f64>` of length `cause_bins`
///   Detection efficiency per cause bin and its uncertainty.
/// - `response`, `response_err`: `Array2<f64>` of shape
///   `(effect_bins, cause_bins)`
///   `P(effect | cause)` and its per-element uncertainty.
/// - `eff_inv`: `Array1<f64>`
///   Cached `safe_inverse(efficiencies)`.
///
/// Invariants
/// ----------
/// - See the module docs; all are established by [`UnfoldingInputs::new`]
///   and the fields are private so they cannot be broken afterwards.
///
/// Performance
/// -----------
/// - Validation is a single O(effect·cause) scan; afterwards the type is a
///   plain owner of its arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct UnfoldingInputs {
    data: Array1<f64>,
    data_err: Array1<f64>,
    efficiencies: Array1<f64>,
    efficiencies_err: Array1<f64>,
    response: Array2<f64>,
    response_err: Array2<f64>,
    eff_inv: Array1<f64>,
}

impl UnfoldingInputs {
    /// Validate and bundle the inputs of an unfolding run.
    ///
    /// Parameters
    /// ----------
    /// - `data`: `Array1<f64>`
    ///   Observed effect counts, length `effect_bins`.
    /// - `data_err`: `Array1<f64>`
    ///   Uncertainty on `data`, same length.
    /// - `efficiencies`: `Array1<f64>`
    ///   Cause-bin efficiencies, length `cause_bins`.
    /// - `efficiencies_err`: `Array1<f64>`
    ///   Uncertainty on `efficiencies`, same length.
    /// - `response`: `Array2<f64>`
    ///   Response matrix `R[e, c] = P(e | c)`, shape
    ///   `(effect_bins, cause_bins)`.
    /// - `response_err`: `Array2<f64>`
    ///   Per-element uncertainty on `response`, same shape.
    ///
    /// Returns
    /// -------
    /// `UnfoldResult<UnfoldingInputs>`
    ///   The validated bundle with `eff_inv` precomputed.
    ///
    /// Errors
    /// ------
    /// - `UnfoldError::ShapeMismatch`
    ///   When any length disagrees with the response dimensions. `data`
    ///   against the response rows is checked first.
    /// - `UnfoldError::NonFiniteInput`
    ///   When any entry is NaN or ±∞; the first offending entry is reported.
    ///
    /// Panics
    /// ------
    /// - Never panics.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use ndarray::array;
    /// # use rust_unfold::unfolding::core::inputs::UnfoldingInputs;
    /// let inputs = UnfoldingInputs::new(
    ///     array![90.0, 110.0],
    ///     array![90.0_f64.sqrt(), 110.0_f64.sqrt()],
    ///     array![1.0, 1.0],
    ///     array![0.01, 0.01],
    ///     array![[0.9, 0.1], [0.1, 0.9]],
    ///     array![[0.01, 0.01], [0.01, 0.01]],
    /// )
    /// .unwrap();
    /// assert_eq!(inputs.cause_bins(), 2);
    /// assert_eq!(inputs.effect_bins(), 2);
    /// ```
    pub fn new(
        data: Array1<f64>, data_err: Array1<f64>, efficiencies: Array1<f64>,
        efficiencies_err: Array1<f64>, response: Array2<f64>, response_err: Array2<f64>,
    ) -> UnfoldResult<Self> {
        let (effect_bins, cause_bins) = response.dim();

        ensure_len("data length (response rows)", effect_bins, data.len())?;
        ensure_len("data_err length", effect_bins, data_err.len())?;
        ensure_len("response_err rows", effect_bins, response_err.nrows())?;
        ensure_len("response_err columns", cause_bins, response_err.ncols())?;
        ensure_len("efficiencies length (response columns)", cause_bins, efficiencies.len())?;
        ensure_len("efficiencies_err length", cause_bins, efficiencies_err.len())?;

        ensure_finite("data", &data)?;
        ensure_finite("data_err", &data_err)?;
        ensure_finite("efficiencies", &efficiencies)?;
        ensure_finite("efficiencies_err", &efficiencies_err)?;
        ensure_finite("response", &response)?;
        ensure_finite("response_err", &response_err)?;

        let eff_inv = safe_inverse(&efficiencies);

        Ok(UnfoldingInputs {
            data,
            data_err,
            efficiencies,
            efficiencies_err,
            response,
            response_err,
            eff_inv,
        })
    }

    /// Number of cause (true) bins.
    pub fn cause_bins(&self) -> usize {
        self.response.ncols()
    }

    /// Number of effect (observed) bins.
    pub fn effect_bins(&self) -> usize {
        self.response.nrows()
    }

    pub fn data(&self) -> &Array1<f64> {
        &self.data
    }

    pub fn data_err(&self) -> &Array1<f64> {
        &self.data_err
    }

    pub fn efficiencies(&self) -> &Array1<f64> {
        &self.efficiencies
    }

    pub fn efficiencies_err(&self) -> &Array1<f64> {
        &self.efficiencies_err
    }

    pub fn response(&self) -> &Array2<f64> {
        &self.response
    }

    pub fn response_err(&self) -> &Array2<f64> {
        &self.response_err
    }

    /// `safe_inverse(efficiencies)`, computed once at construction.
    pub fn eff_inv(&self) -> &Array1<f64> {
        &self.eff_inv
    }

    /// Effective number of simulated events per cause bin.
    ///
    /// Returns `(eff[c] / eff_err[c])²`, with the safe-inverse rule applied
    /// to `eff_err` so that a zero uncertainty yields a zero count. This is
    /// the per-cause normalization consumed by
    /// [`multinomial_covariance`](crate::unfolding::core::response_cov::multinomial_covariance).
    pub fn effective_mc_counts(&self) -> Array1<f64> {
        let ratio = &self.efficiencies * &safe_inverse(&self.efficiencies_err);
        ratio.mapv(|r| r * r)
    }

    /// Total number of observed effects, `Σ_e data[e]`.
    pub fn total_observed(&self) -> f64 {
        self.data.sum()
    }
}

// ---- Helpers ----

#[inline]
fn ensure_len(what: &'static str, expected: usize, found: usize) -> UnfoldResult<()> {
    if expected != found {
        return Err(UnfoldError::ShapeMismatch { what, expected, found });
    }
    Ok(())
}

pub(crate) fn ensure_finite<S, D>(what: &'static str, arr: &ArrayBase<S, D>) -> UnfoldResult<()>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    match arr.iter().enumerate().find(|(_, v)| !v.is_finite()) {
        Some((index, &value)) => Err(UnfoldError::NonFiniteInput { what, index, value }),
        None => Ok(()),
    }
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
    // - Successful construction and bin-count accessors.
    // - ShapeMismatch for each input whose length disagrees with the
    //   response matrix.
    // - NonFiniteInput for NaN / ±∞ entries.
    // - Derived quantities: eff_inv, effective MC counts, total observed.
    // -------------------------------------------------------------------------

    fn two_by_three() -> (Array1<f64>, Array1<f64>, Array1<f64>, Array1<f64>, Array2<f64>, Array2<f64>)
    {
        (
            array![10.0, 20.0],
            array![1.0, 2.0],
            array![0.5, 1.0, 0.0],
            array![0.05, 0.1, 0.0],
            array![[0.2, 0.5, 0.0], [0.3, 0.5, 0.0]],
            array![[0.01, 0.01, 0.0], [0.01, 0.01, 0.0]],
        )
    }

    #[test]
    // Purpose
    // -------
    // Verify that consistent inputs validate and expose their bin counts.
    //
    // Given
    // -----
    // - 2 effect bins, 3 cause bins, one empty cause bin (eff = 0).
    //
    // Expect
    // ------
    // - Ok; cause_bins = 3, effect_bins = 2; eff_inv = [2, 1, 0].
    fn new_accepts_consistent_inputs() {
        // Arrange
        let (d, de, e, ee, r, re) = two_by_three();

        // Act
        let inputs = UnfoldingInputs::new(d, de, e, ee, r, re).expect("valid inputs");

        // Assert
        assert_eq!(inputs.cause_bins(), 3);
        assert_eq!(inputs.effect_bins(), 2);
        assert_eq!(inputs.eff_inv(), &array![2.0, 1.0, 0.0]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure that data whose length differs from the response row count is
    // rejected before anything else.
    //
    // Given
    // -----
    // - data of length 3 against a 2-row response.
    //
    // Expect
    // ------
    // - ShapeMismatch with expected = 2, found = 3.
    fn new_rejects_data_response_row_mismatch() {
        // Arrange
        let (_, de, e, ee, r, re) = two_by_three();

        // Act
        let err = UnfoldingInputs::new(array![1.0, 2.0, 3.0], de, e, ee, r, re).unwrap_err();

        // Assert
        assert!(matches!(err, UnfoldError::ShapeMismatch { expected: 2, found: 3, .. }));
    }

    #[test]
    // Purpose
    // -------
    // Ensure every other shape inconsistency is reported as ShapeMismatch.
    //
    // Given
    // -----
    // - Separate variants with a wrong data_err, efficiencies,
    //   efficiencies_err, and response_err shape.
    //
    // Expect
    // ------
    // - Each construction fails with ShapeMismatch.
    fn new_rejects_each_secondary_shape_mismatch() {
        let (d, de, e, ee, r, re) = two_by_three();

        let bad_data_err = UnfoldingInputs::new(
            d.clone(),
            array![1.0],
            e.clone(),
            ee.clone(),
            r.clone(),
            re.clone(),
        );
        let bad_eff =
            UnfoldingInputs::new(d.clone(), de.clone(), array![1.0], ee.clone(), r.clone(), re.clone());
        let bad_eff_err =
            UnfoldingInputs::new(d.clone(), de.clone(), e.clone(), array![1.0], r.clone(), re.clone());
        let bad_resp_err =
            UnfoldingInputs::new(d, de, e, ee, r, array![[0.1, 0.1], [0.1, 0.1]]);

        for result in [bad_data_err, bad_eff, bad_eff_err, bad_resp_err] {
            assert!(
                matches!(result, Err(UnfoldError::ShapeMismatch { .. })),
                "expected ShapeMismatch, got {result:?}"
            );
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure non-finite entries are rejected with their flat index.
    //
    // Given
    // -----
    // - A response matrix with NaN at row 1, column 0 (flat index 3).
    //
    // Expect
    // ------
    // - NonFiniteInput { what: "response", index: 3, .. }.
    fn new_rejects_non_finite_response_entry() {
        // Arrange
        let (d, de, e, ee, mut r, re) = two_by_three();
        r[[1, 0]] = f64::NAN;

        // Act
        let err = UnfoldingInputs::new(d, de, e, ee, r, re).unwrap_err();

        // Assert
        assert!(matches!(err, UnfoldError::NonFiniteInput { what: "response", index: 3, .. }));
    }

    #[test]
    // Purpose
    // -------
    // Check the derived effective MC counts and total observed effects.
    //
    // Given
    // -----
    // - eff = [0.5, 1.0, 0.0], eff_err = [0.05, 0.1, 0.0], data = [10, 20].
    //
    // Expect
    // ------
    // - counts = [100, 100, 0] (zero uncertainty ⇒ zero count);
    //   total = 30.
    fn derived_quantities_follow_safe_inverse_rule() {
        // Arrange
        let (d, de, e, ee, r, re) = two_by_three();
        let inputs = UnfoldingInputs::new(d, de, e, ee, r, re).expect("valid inputs");

        // Act
        let counts = inputs.effective_mc_counts();

        // Assert
        assert_relative_eq!(counts[0], 100.0, epsilon = 1e-9);
        assert_relative_eq!(counts[1], 100.0, epsilon = 1e-9);
        assert_eq!(counts[2], 0.0);
        assert_eq!(inputs.total_observed(), 30.0);
    }
}
