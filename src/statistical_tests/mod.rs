//! statistical_tests — convergence statistics for iterative unfolding.
//!
//! Purpose
//! -------
//! Compare two binned distributions, typically the unfolded estimates of
//! successive iterations, so a driver loop can decide when to stop. The
//! subtree bundles the statistics, their input guards, and their error type
//! with a Python bridge.
//!
//! Key behaviors
//! -------------
//! - Select a statistic by name (`chi2`, `pf`, `rmd`, `ks`) via
//!   [`TestStatKind`] or [`TestStat::from_name`].
//! - Track `(stat, delstat, prob)` across calls in [`TestStat`] and report
//!   convergence with [`TestStat::pass_tol`].
//! - Restrict comparisons to a window of the x-axis through
//!   [`TestStatOptions::test_range`].
//! - Report all failures through [`TSError`] / [`TSResult`].
//!
//! Invariants & assumptions
//! ------------------------
//! - Inputs are checked by [`validate_pair`] before any statistic is
//!   evaluated; user-facing invalid input never panics.
//! - A failed comparison leaves the stored statistic untouched.
//!
//! Conventions
//! -----------
//! - Statistics without a probability report `prob = −1`.
//! - At the Python boundary every [`TSError`] maps to `ValueError`.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use rust_unfold::statistical_tests::prelude::*;
//!
//! let mut ts = TestStat::from_name("chi2", TestStatOptions::with_tol(0.05))?;
//! let (stat, delstat, prob) = ts.get_stats(&[10.0, 20.0], &[11.0, 19.0])?.as_tuple();
//! assert!(stat >= 0.0 && (0.0..=1.0).contains(&prob));
//! assert_eq!(delstat, stat + 1.0);
//! # Ok::<(), TSError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - [`errors`]: `Display` payloads.
//! - [`validation`]: every guard branch and the range convention.
//! - [`test_stat`]: hand-computed statistics, bookkeeping, and the
//!   Kolmogorov survival function.

pub mod errors;
pub mod test_stat;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::errors::{TSError, TSResult};
pub use self::test_stat::{TSOutcome, TestStat, TestStatKind, TestStatOptions};
pub use self::validation::{range_bins, validate_pair};

// ---- Optional convenience prelude for downstream crates -------------------

pub mod prelude {
    pub use super::errors::{TSError, TSResult};
    pub use super::test_stat::{TSOutcome, TestStat, TestStatKind, TestStatOptions};
}
