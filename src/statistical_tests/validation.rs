//! statistical_tests::validation — input guards for test statistics.
//!
//! Purpose
//! -------
//! Centralize the checks shared by every comparison statistic: equal,
//! non-empty, finite distributions; a well-formed tolerance; and the
//! translation of an x-axis test range into a bin window.
//!
//! Conventions
//! -----------
//! - A test range `[xlo, xhi]` selects bins
//!   `[searchsorted(x, xlo), searchsorted(x, xhi))`, with `searchsorted`
//!   returning the leftmost insertion point. The x-axis is assumed sorted.
//! - Guards allocate nothing beyond their error payloads.

use crate::statistical_tests::errors::{TSError, TSResult};

/// Check two distributions can be compared bin by bin.
///
/// Parameters
/// ----------
/// - `n1`, `n2`: `&[f64]`
///   Binned distributions, already restricted to the test window.
///
/// Returns
/// -------
/// `TSResult<()>`
///
/// Errors
/// ------
/// - `TSError::LengthMismatch`
///   When `n1.len() != n2.len()`.
/// - `TSError::EmptyInput`
///   When both are empty.
/// - `TSError::NonFiniteData(value)`
///   On the first NaN or ±∞ entry (scanning `n1` then `n2`).
///
/// Examples
/// --------
/// ```rust
/// # use rust_unfold::statistical_tests::validation::validate_pair;
/// # use rust_unfold::statistical_tests::errors::TSError;
/// assert!(validate_pair(&[1.0, 2.0], &[2.0, 1.0]).is_ok());
/// assert_eq!(
///     validate_pair(&[1.0], &[1.0, 2.0]),
///     Err(TSError::LengthMismatch { left: 1, right: 2 })
/// );
/// ```
pub fn validate_pair(n1: &[f64], n2: &[f64]) -> TSResult<()> {
    if n1.len() != n2.len() {
        return Err(TSError::LengthMismatch { left: n1.len(), right: n2.len() });
    }
    if n1.is_empty() {
        return Err(TSError::EmptyInput);
    }
    if let Some(&value) = n1.iter().chain(n2.iter()).find(|v| !v.is_finite()) {
        return Err(TSError::NonFiniteData(value));
    }
    Ok(())
}

/// Check a convergence tolerance is finite and non-negative.
pub fn validate_tolerance(tol: f64) -> TSResult<()> {
    if !tol.is_finite() || tol < 0.0 {
        return Err(TSError::InvalidTolerance(tol));
    }
    Ok(())
}

/// Translate an x-axis test range into a half-open bin window.
///
/// Parameters
/// ----------
/// - `x_axis`: `Option<&[f64]>`
///   Sorted bin positions. Required when `test_range` is given.
/// - `test_range`: `Option<(f64, f64)>`
///   Inclusive-looking limits `(xlo, xhi)`; `None` compares all bins.
///
/// Returns
/// -------
/// `TSResult<Option<(usize, usize)>>`
///   `None` when no range is requested, otherwise `(lo, hi)` with
///   `lo < hi ≤ x_axis.len()`.
///
/// Errors
/// ------
/// - `TSError::InvalidRange`
///   When `xlo >= xhi` or either limit is NaN.
/// - `TSError::RangeOutsideAxis`
///   When no x-axis is given or the window selects no bin.
pub fn range_bins(
    x_axis: Option<&[f64]>, test_range: Option<(f64, f64)>,
) -> TSResult<Option<(usize, usize)>> {
    let Some((xlo, xhi)) = test_range else {
        return Ok(None);
    };
    // `!(xlo < xhi)` also rejects NaN limits.
    if !(xlo < xhi) {
        return Err(TSError::InvalidRange { xlo, xhi });
    }
    let x = x_axis.ok_or(TSError::RangeOutsideAxis { xlo, xhi })?;

    let lo = x.partition_point(|&v| v < xlo);
    let hi = x.partition_point(|&v| v < xhi);
    if lo >= hi {
        return Err(TSError::RangeOutsideAxis { xlo, xhi });
    }
    Ok(Some((lo, hi)))
}
