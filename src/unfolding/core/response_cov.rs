//! Covariance models for response-matrix entries and a PSD diagnostic.
//!
//! Purpose
//! -------
//! Build the `(effect·cause) × (effect·cause)` covariance of the flattened
//! response matrix consumed by the systematic term
//! `Vc1 = dP · V_PP · dPᵀ`, and provide an eigenvalue diagnostic for
//! checking that assembled covariance matrices are positive semi-definite.
//!
//! Key behaviors
//! -------------
//! - [`poisson_covariance`]: independent entries, `diag(Rerr²)`.
//! - [`multinomial_covariance`]: each response row treated as a multinomial
//!   fraction with per-cause effective simulation counts. This builder is
//!   complete but is **not** used by `CovarianceMatrix::vc_pp`, which
//!   reports `NotImplemented` for the multinomial mode.
//! - [`symmetric_min_eigenvalue`]: copy a symmetric `ndarray` matrix into a
//!   `nalgebra::DMatrix` and return its smallest eigenvalue.
//!
//! Conventions
//! -----------
//! - Flat response index: `e · cause_bins + c` (row-major over `R[e, c]`),
//!   matching the column layout of the response Jacobian `dP`.
//! - The per-cause normalization `nc_inv` is indexed by the cause axis and
//!   broadcast across effect rows.

use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView1};

use crate::unfolding::errors::{UnfoldError, UnfoldResult};

/// Diagonal Poisson covariance of the flattened response matrix.
///
/// Parameters
/// ----------
/// - `response_err`: `&Array2<f64>`
///   Per-element uncertainty `Rerr[e, c]`, shape `(effect_bins, cause_bins)`.
///
/// Returns
/// -------
/// `Array2<f64>`
///   Square matrix of side `effect_bins · cause_bins` with
///   `V[e·C + c, e·C + c] = Rerr[e, c]²` and zeros elsewhere.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_unfold::unfolding::core::response_cov::poisson_covariance;
/// let v = poisson_covariance(&array![[0.1, 0.2], [0.3, 0.4]]);
/// assert_eq!(v.dim(), (4, 4));
/// assert!((v[[2, 2]] - 0.09).abs() < 1e-15);
/// ```
pub fn poisson_covariance(response_err: &Array2<f64>) -> Array2<f64> {
    let flat: Vec<f64> = response_err.iter().map(|&s| s * s).collect();
    Array2::from_diag(&ArrayView1::from(&flat[..]))
}

/// Multinomial covariance of the flattened response matrix.
///
/// Parameters
/// ----------
/// - `nc_inv`: `ArrayView1<f64>`
///   Inverse effective number of simulated events per cause bin, length
///   `cause_bins` (typically `safe_inverse(effective_mc_counts)`).
/// - `response`: `&Array2<f64>`
///   Response matrix `R[e, c]`, shape `(effect_bins, cause_bins)`.
///
/// Returns
/// -------
/// `UnfoldResult<Array2<f64>>`
///   Square matrix of side `effect_bins · cause_bins` with, for every cause
///   `c` and effect rows `e ≠ e'`:
///   - `V[e·C + c, e·C + c]   = nc_inv[c] · R[e, c] · (1 − R[e, c])`,
///   - `V[e·C + c, e'·C + c]  = −nc_inv[c] · R[e, c] · R[e', c]`,
///   and zeros for pairs of distinct causes.
///
/// Errors
/// ------
/// - `UnfoldError::ShapeMismatch`
///   When `nc_inv.len() != response.ncols()`.
///
/// Notes
/// -----
/// - Not wired into `CovarianceMatrix::vc_pp`; available for callers that
///   want to assemble the systematic term themselves.
pub fn multinomial_covariance(
    nc_inv: ArrayView1<'_, f64>, response: &Array2<f64>,
) -> UnfoldResult<Array2<f64>> {
    let (effect_bins, cause_bins) = response.dim();
    if nc_inv.len() != cause_bins {
        return Err(UnfoldError::ShapeMismatch {
            what: "nc_inv length (response columns)",
            expected: cause_bins,
            found: nc_inv.len(),
        });
    }

    let side = effect_bins * cause_bins;
    let mut cov = Array2::<f64>::zeros((side, side));
    for ej in 0..effect_bins {
        let ejc = ej * cause_bins;
        for c in 0..cause_bins {
            let p = response[[ej, c]];
            cov[[ejc + c, ejc + c]] = nc_inv[c] * p * (1.0 - p);
            for ek in (ej + 1)..effect_bins {
                let ekc = ek * cause_bins;
                let cross = -nc_inv[c] * p * response[[ek, c]];
                cov[[ejc + c, ekc + c]] = cross;
                cov[[ekc + c, ejc + c]] = cross;
            }
        }
    }
    Ok(cov)
}

/// Smallest eigenvalue of a symmetric matrix.
///
/// Parameters
/// ----------
/// - `matrix`: `&Array2<f64>`
///   Square, (numerically) symmetric matrix such as `Vc0` or `Vc`.
///
/// Returns
/// -------
/// `UnfoldResult<f64>`
///   The minimum eigenvalue from a symmetric eigen-decomposition, or
///   `0.0` for an empty matrix. A covariance is positive semi-definite up
///   to tolerance `tol` when the result is `≥ −tol`.
///
/// Errors
/// ------
/// - `UnfoldError::ShapeMismatch`
///   When `matrix` is not square.
///
/// Notes
/// -----
/// - Only the lower triangle is read by the decomposition; tiny asymmetries
///   from floating-point accumulation are ignored.
pub fn symmetric_min_eigenvalue(matrix: &Array2<f64>) -> UnfoldResult<f64> {
    let (nrows, ncols) = matrix.dim();
    if nrows != ncols {
        return Err(UnfoldError::ShapeMismatch {
            what: "covariance columns (must be square)",
            expected: nrows,
            found: ncols,
        });
    }
    if nrows == 0 {
        return Ok(0.0);
    }

    let nalg = DMatrix::from_fn(nrows, ncols, |i, j| matrix[[i, j]]);
    let eigen = nalg.symmetric_eigen();
    Ok(eigen.eigenvalues.iter().copied().fold(f64::INFINITY, f64::min))
}
