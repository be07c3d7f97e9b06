//! Numerical guards and broadcasting helpers for the unfolding engine.
//!
//! Provides the safe elementwise reciprocal used for every division in the
//! mixing step and the Adye recursion, plus two small scaling helpers that
//! make the `⊙_row` / `⊙_col` notation of the propagation formulas explicit.
//!
//! # Provided items
//! - [`safe_inverse`]: elementwise `1/x` with `0 ↦ 0`, for any array rank.
//! - [`scale_columns`]: multiply column `j` of a matrix by `v[j]`.
//! - [`scale_rows`]: multiply row `i` of a matrix by `v[i]`.
//!
//! # Zero handling
//! Empty effect bins (`f[e] = 0`) and empty cause bins (`n_prev[c] = 0`)
//! get a zero reciprocal, so an empty bin contributes nothing to any
//! downstream product.

use ndarray::{Array, Array2, ArrayBase, ArrayView1, Axis, Data, Dimension, Ix2};

/// Elementwise reciprocal with zeros mapped to zero.
///
/// Parameters
/// ----------
/// - `x`: `&ArrayBase<S, D>`
///   Input array of any dimension. Both `0.0` and `-0.0` count as zero.
///
/// Returns
/// -------
/// `Array<f64, D>`
///   Owned array of the same shape with `out[i] = 0` where `x[i] == 0`
///   and `out[i] = 1 / x[i]` elsewhere.
///
/// Notes
/// -----
/// - Nonzero entries are inverted exactly as `1.0 / x`; no clamping is
///   applied to very small magnitudes.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_unfold::unfolding::core::numerics::safe_inverse;
/// let inv = safe_inverse(&array![1.0, 2.0, 0.0, 4.0]);
/// assert_eq!(inv, array![1.0, 0.5, 0.0, 0.25]);
/// ```
pub fn safe_inverse<S, D>(x: &ArrayBase<S, D>) -> Array<f64, D>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    x.mapv(|v| if v == 0.0 { 0.0 } else { 1.0 / v })
}

/// Scale each column `j` of `m` by `v[j]` (the `⊙_col` operator).
///
/// Panics if `v.len() != m.ncols()`; callers pass vectors sized by the
/// validated bin counts.
#[inline]
pub fn scale_columns<S>(m: &ArrayBase<S, Ix2>, v: ArrayView1<'_, f64>) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    m * &v
}

/// Scale each row `i` of `m` by `v[i]` (the `⊙_row` operator).
///
/// Panics if `v.len() != m.nrows()`; callers pass vectors sized by the
/// validated bin counts.
#[inline]
pub fn scale_rows<S>(m: &ArrayBase<S, Ix2>, v: ArrayView1<'_, f64>) -> Array2<f64>
where
    S: Data<Elem = f64>,
{
    m * &v.insert_axis(Axis(1))
}
