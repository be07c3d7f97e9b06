//! statistical_tests::test_stat — convergence statistics for iterative unfolding.
//!
//! Purpose
//! -------
//! Compare two binned distributions, typically successive unfolded
//! estimates, and decide whether an iteration has converged. Four
//! statistics are available by name: reduced χ² (`chi2`), the Pfendner
//! Bayes factor (`pf`), the maximum relative difference (`rmd`), and the
//! Kolmogorov–Smirnov distance (`ks`).
//!
//! Key behaviors
//! -------------
//! - [`TestStat::get_stats`] evaluates the selected statistic on an
//!   optional bin window, records it, and returns a [`TSOutcome`] carrying
//!   the statistic, its change since the previous call, and a probability.
//! - [`TestStat::pass_tol`] reports `stat < tol`.
//! - The degrees of freedom are fixed on the first successful call to the
//!   (windowed) length and reused afterwards.
//!
//! Invariants & assumptions
//! ------------------------
//! - Before any call: `stat = −1`, `delstat = 0`, `prob = −1`.
//! - Each call sets `delstat = stat_new − stat_old`.
//! - `chi2` and `rmd` replace per-bin sums `N1 + N2 < 1` by 1.
//! - `chi2` and `ks` require positive distribution totals.
//! - Statistics without a probability (`pf`, `rmd`) report `prob = −1`.
//!
//! Conventions
//! -----------
//! - `chi2`: `Σ (n2·N1 − n1·N2)² / h / (n1·n2) / dof`, probability
//!   `P(dof/2, stat/2)` (regularized lower incomplete gamma, i.e. the χ²
//!   CDF).
//! - `pf`: `lnΓ(n1+n2+2) − lnΓ(n1+1) − lnΓ(n2+1)
//!   + Σ [lnΓ(N1+1) + lnΓ(N2+1) − lnΓ(N1+N2+2)]`.
//! - `rmd`: `max |N1 − N2| / h`.
//! - `ks`: `d = max |F1 − F2|` over normalized cumulative sums; probability
//!   from the Kolmogorov distribution at `(√(len/2) + 0.12 + 0.11/√(len/2))·d`.
//!
//! Downstream usage
//! ----------------
//! ```rust
//! use rust_unfold::statistical_tests::{TestStat, TestStatOptions};
//!
//! let mut ts = TestStat::from_name("ks", TestStatOptions::with_tol(0.01))?;
//! let out = ts.get_stats(&[10.0, 20.0, 30.0], &[10.0, 20.0, 30.0])?;
//! assert_eq!(out.stat(), 0.0);
//! assert!(ts.pass_tol());
//! # Ok::<(), rust_unfold::statistical_tests::TSError>(())
//! ```
//!
//! Testing notes
//! -------------
//! - Unit tests compare each statistic with hand-computed values, check
//!   identical inputs give zero, exercise the window, the delstat and dof
//!   bookkeeping, and the Kolmogorov survival function.

use std::{f64::consts::PI, fmt, str::FromStr};

use log::debug;
use statrs::function::gamma::{gamma_lr, ln_gamma};

use crate::statistical_tests::{
    errors::{TSError, TSResult},
    validation::{range_bins, validate_pair, validate_tolerance},
};

/// TestStatKind — which comparison statistic to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TestStatKind {
    Chi2,
    Pf,
    Rmd,
    #[default]
    Ks,
}

impl TestStatKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatKind::Chi2 => "chi2",
            TestStatKind::Pf => "pf",
            TestStatKind::Rmd => "rmd",
            TestStatKind::Ks => "ks",
        }
    }

    /// Whether the statistic has an associated probability.
    pub fn has_probability(&self) -> bool {
        matches!(self, TestStatKind::Chi2 | TestStatKind::Ks)
    }
}

impl FromStr for TestStatKind {
    type Err = TSError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "chi2" => Ok(TestStatKind::Chi2),
            "pf" => Ok(TestStatKind::Pf),
            "rmd" => Ok(TestStatKind::Rmd),
            "ks" => Ok(TestStatKind::Ks),
            _ => Err(TSError::UnknownStatistic(s.to_string())),
        }
    }
}

impl fmt::Display for TestStatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// TestStatOptions — configuration of a [`TestStat`].
///
/// Fields
/// ------
/// - `tol`: `f64`
///   Convergence tolerance for [`TestStat::pass_tol`]; default `0.01`.
/// - `x_axis`: `Option<Vec<f64>>`
///   Sorted bin positions; needed only with `test_range`.
/// - `test_range`: `Option<(f64, f64)>`
///   Restrict the comparison to bins whose positions fall in
///   `[xlo, xhi)` (searchsorted-left convention).
#[derive(Debug, Clone, PartialEq)]
pub struct TestStatOptions {
    pub tol: f64,
    pub x_axis: Option<Vec<f64>>,
    pub test_range: Option<(f64, f64)>,
}

impl TestStatOptions {
    pub fn with_tol(tol: f64) -> Self {
        TestStatOptions { tol, ..Default::default() }
    }
}

impl Default for TestStatOptions {
    fn default() -> Self {
        TestStatOptions { tol: 0.01, x_axis: None, test_range: None }
    }
}

/// TSOutcome — result of one comparison.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TSOutcome {
    stat: f64,
    delstat: f64,
    prob: f64,
}

impl TSOutcome {
    pub fn stat(&self) -> f64 {
        self.stat
    }

    /// Change of the statistic since the previous comparison.
    pub fn delstat(&self) -> f64 {
        self.delstat
    }

    /// Probability of the statistic, or `-1` when undefined.
    pub fn prob(&self) -> f64 {
        self.prob
    }

    pub fn as_tuple(&self) -> (f64, f64, f64) {
        (self.stat, self.delstat, self.prob)
    }
}

/// TestStat — stateful convergence statistic.
///
/// Purpose
/// -------
/// Hold the selected statistic, its configuration, and the running
/// `(stat, delstat, prob, dof)` across successive comparisons.
///
/// Fields
/// ------
/// - `kind`: [`TestStatKind`]
/// - `tol`: `f64`
/// - `bins`: `Option<(usize, usize)>`
///   Half-open bin window resolved from the options at construction.
/// - `stat`, `delstat`, `prob`: `f64`
///   Latest values; `−1`, `0`, `−1` before the first comparison.
/// - `dof`: `Option<usize>`
///   Set on the first successful comparison.
///
/// Invariants
/// ----------
/// - `tol` is finite and non-negative.
/// - `bins`, when present, satisfies `lo < hi`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestStat {
    kind: TestStatKind,
    tol: f64,
    bins: Option<(usize, usize)>,
    stat: f64,
    delstat: f64,
    prob: f64,
    dof: Option<usize>,
}

impl TestStat {
    /// Configure a statistic.
    ///
    /// Parameters
    /// ----------
    /// - `kind`: [`TestStatKind`]
    /// - `options`: [`TestStatOptions`]
    ///
    /// Returns
    /// -------
    /// `TSResult<TestStat>`
    ///   A statistic in its initial state.
    ///
    /// Errors
    /// ------
    /// - `TSError::InvalidTolerance`
    ///   When `options.tol` is negative or non-finite.
    /// - `TSError::InvalidRange`, `TSError::RangeOutsideAxis`
    ///   From [`range_bins`].
    pub fn new(kind: TestStatKind, options: TestStatOptions) -> TSResult<Self> {
        validate_tolerance(options.tol)?;
        let bins = range_bins(options.x_axis.as_deref(), options.test_range)?;
        Ok(TestStat { kind, tol: options.tol, bins, stat: -1.0, delstat: 0.0, prob: -1.0, dof: None })
    }

    /// Configure a statistic by name (`chi2`, `pf`, `rmd`, `ks`; case-insensitive).
    ///
    /// Errors
    /// ------
    /// - `TSError::UnknownStatistic`
    ///   For any other name.
    /// - Every error of [`TestStat::new`].
    pub fn from_name(name: &str, options: TestStatOptions) -> TSResult<Self> {
        TestStat::new(name.parse()?, options)
    }

    /// Compare two distributions and record the result.
    ///
    /// Parameters
    /// ----------
    /// - `n1`, `n2`: `&[f64]`
    ///   Binned distributions of equal length, typically the previous and
    ///   current unfolded estimate.
    ///
    /// Returns
    /// -------
    /// `TSResult<TSOutcome>`
    ///   `(stat, delstat, prob)` of this comparison.
    ///
    /// Errors
    /// ------
    /// - `TSError::LengthMismatch`, `TSError::EmptyInput`,
    ///   `TSError::NonFiniteData`
    ///   From [`validate_pair`] on the windowed inputs.
    /// - `TSError::NonPositiveTotal`
    ///   For `chi2` and `ks` when a windowed total is ≤ 0.
    ///
    /// Notes
    /// -----
    /// - On error the stored state is left unchanged.
    /// - The window is clamped to the input length.
    pub fn get_stats(&mut self, n1: &[f64], n2: &[f64]) -> TSResult<TSOutcome> {
        let (w1, w2) = self.window(n1, n2);
        validate_pair(w1, w2)?;
        let dof = self.dof.unwrap_or(w1.len());

        let stat = match self.kind {
            TestStatKind::Chi2 => chi2_stat(w1, w2, dof)?,
            TestStatKind::Pf => pf_stat(w1, w2),
            TestStatKind::Rmd => rmd_stat(w1, w2),
            TestStatKind::Ks => ks_stat(w1, w2)?,
        };
        let prob = match self.kind {
            TestStatKind::Chi2 => chi2_prob(stat, dof),
            TestStatKind::Ks => ks_prob(stat, w1.len()),
            TestStatKind::Pf | TestStatKind::Rmd => -1.0,
        };

        self.dof = Some(dof);
        self.delstat = stat - self.stat;
        self.stat = stat;
        self.prob = prob;

        debug!(
            "{} statistic: stat = {:.6}, delstat = {:.6}, prob = {:.4}",
            self.kind, self.stat, self.delstat, self.prob
        );
        Ok(TSOutcome { stat: self.stat, delstat: self.delstat, prob: self.prob })
    }

    /// Whether the latest statistic is below the tolerance.
    pub fn pass_tol(&self) -> bool {
        self.stat < self.tol
    }

    pub fn kind(&self) -> TestStatKind {
        self.kind
    }

    pub fn tol(&self) -> f64 {
        self.tol
    }

    pub fn stat(&self) -> f64 {
        self.stat
    }

    pub fn delstat(&self) -> f64 {
        self.delstat
    }

    pub fn prob(&self) -> f64 {
        self.prob
    }

    /// Degrees of freedom; `None` before the first comparison.
    pub fn dof(&self) -> Option<usize> {
        self.dof
    }

    /// Bin window resolved from the test range.
    pub fn bins(&self) -> Option<(usize, usize)> {
        self.bins
    }

    fn window<'a>(&self, n1: &'a [f64], n2: &'a [f64]) -> (&'a [f64], &'a [f64]) {
        match self.bins {
            Some((lo, hi)) => (clamped(n1, lo, hi), clamped(n2, lo, hi)),
            None => (n1, n2),
        }
    }
}

// ---- Statistics ----

fn clamped(x: &[f64], lo: usize, hi: usize) -> &[f64] {
    let hi = hi.min(x.len());
    &x[lo.min(hi)..hi]
}

fn positive_total(x: &[f64]) -> TSResult<f64> {
    let total: f64 = x.iter().sum();
    if total > 0.0 { Ok(total) } else { Err(TSError::NonPositiveTotal(total)) }
}

/// Per-bin `N1 + N2`, with values below 1 replaced by 1.
fn guarded_sum(a: f64, b: f64) -> f64 {
    let h = a + b;
    if h < 1.0 { 1.0 } else { h }
}

fn chi2_stat(n1: &[f64], n2: &[f64], dof: usize) -> TSResult<f64> {
    let t1 = positive_total(n1)?;
    let t2 = positive_total(n2)?;
    let sum: f64 = n1
        .iter()
        .zip(n2)
        .map(|(&a, &b)| {
            let dif = t2 * a - t1 * b;
            dif * dif / guarded_sum(a, b)
        })
        .sum();
    Ok(sum / (t1 * t2) / dof as f64)
}

fn chi2_prob(stat: f64, dof: usize) -> f64 {
    // The CDF is 0 at the origin; gamma_lr requires x > 0.
    if stat <= 0.0 {
        return 0.0;
    }
    gamma_lr(0.5 * dof as f64, 0.5 * stat)
}

fn pf_stat(n1: &[f64], n2: &[f64]) -> f64 {
    let t1: f64 = n1.iter().sum();
    let t2: f64 = n2.iter().sum();
    let norm = ln_gamma(t1 + t2 + 2.0) - ln_gamma(t1 + 1.0) - ln_gamma(t2 + 1.0);
    n1.iter().zip(n2).fold(norm, |acc, (&a, &b)| {
        acc + ln_gamma(a + 1.0) + ln_gamma(b + 1.0) - ln_gamma(a + b + 2.0)
    })
}

fn rmd_stat(n1: &[f64], n2: &[f64]) -> f64 {
    n1.iter()
        .zip(n2)
        .map(|(&a, &b)| (a - b).abs() / guarded_sum(a, b))
        .fold(f64::NEG_INFINITY, f64::max)
}

fn ks_stat(n1: &[f64], n2: &[f64]) -> TSResult<f64> {
    let t1 = positive_total(n1)?;
    let t2 = positive_total(n2)?;
    let mut cs1 = 0.0;
    let mut cs2 = 0.0;
    let mut d: f64 = 0.0;
    for (&a, &b) in n1.iter().zip(n2) {
        cs1 += a;
        cs2 += b;
        d = d.max((cs1 / t1 - cs2 / t2).abs());
    }
    Ok(d)
}

fn ks_prob(d: f64, len: usize) -> f64 {
    let en = (len as f64 / 2.0).sqrt();
    kolmogorov_sf((en + 0.12 + 0.11 / en) * d)
}

/// Survival function of the Kolmogorov distribution, `Q(λ) = P(K > λ)`.
///
/// Uses the theta-function form for small `λ` and the alternating series
/// `2 Σ (−1)^{k−1} exp(−2k²λ²)` otherwise; both converge in a handful of
/// terms on their side of the switch point.
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    let q = if lambda < 1.18 { 1.0 - kolmogorov_cdf_small(lambda) } else { kolmogorov_sf_large(lambda) };
    q.clamp(0.0, 1.0)
}

fn kolmogorov_cdf_small(lambda: f64) -> f64 {
    let pre = (2.0 * PI).sqrt() / lambda;
    let w = -PI * PI / (8.0 * lambda * lambda);
    let sum: f64 = (1..=20).map(|k| ((2 * k - 1) as f64).powi(2) * w).map(f64::exp).sum();
    pre * sum
}

fn kolmogorov_sf_large(lambda: f64) -> f64 {
    let w = -2.0 * lambda * lambda;
    let sum: f64 = (1..=100)
        .map(|k: i32| {
            let sign = if k % 2 == 1 { 1.0 } else { -1.0 };
            sign * (w * (k * k) as f64).exp()
        })
        .sum();
    2.0 * sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Name parsing and the default statistic.
    // - Hand-computed values of chi2, pf, rmd, ks, and the chi2 probability.
    // - Zero statistic for identical inputs.
    // - delstat/dof bookkeeping across calls and pass_tol.
    // - Windowed comparison via x_axis/test_range.
    // - The Kolmogorov survival function at reference points.
    // -------------------------------------------------------------------------

    #[test]
    fn kind_parses_names_case_insensitively() {
        assert_eq!("CHI2".parse::<TestStatKind>(), Ok(TestStatKind::Chi2));
        assert_eq!("pf".parse::<TestStatKind>(), Ok(TestStatKind::Pf));
        assert_eq!(" Rmd".parse::<TestStatKind>(), Ok(TestStatKind::Rmd));
        assert_eq!("ks".parse::<TestStatKind>(), Ok(TestStatKind::Ks));
        assert_eq!(TestStatKind::default(), TestStatKind::Ks);
        assert_eq!(
            "kuiper".parse::<TestStatKind>(),
            Err(TSError::UnknownStatistic("kuiper".to_string()))
        );
    }

    #[test]
    // Purpose
    // -------
    // Check chi2 and its probability on a hand-computed case.
    //
    // Given
    // -----
    // - N1 = [10, 20], N2 = [20, 10]; totals 30, dof 2.
    //
    // Expect
    // ------
    // - stat = (3000 + 3000) / 900 / 2 = 10/3.
    // - prob = P(1, 5/3) = 1 − exp(−5/3).
    fn chi2_matches_hand_computation() {
        // Arrange
        let mut ts = TestStat::from_name("chi2", TestStatOptions::default()).unwrap();

        // Act
        let out = ts.get_stats(&[10.0, 20.0], &[20.0, 10.0]).unwrap();

        // Assert
        assert_relative_eq!(out.stat(), 10.0 / 3.0, epsilon = 1e-12);
        assert_relative_eq!(out.prob(), 1.0 - (-5.0_f64 / 3.0).exp(), epsilon = 1e-10);
        assert_eq!(ts.dof(), Some(2));
    }

    #[test]
    // Purpose
    // -------
    // Check the Bayes-factor statistic against a closed form.
    //
    // Given
    // -----
    // - N1 = [1, 0], N2 = [0, 1].
    //
    // Expect
    // ------
    // - lnB = ln Γ(4) − 2 ln Γ(2) + 2 (ln Γ(2) + ln Γ(1) − ln Γ(3)) = ln 1.5.
    // - prob = −1.
    fn pf_matches_closed_form() {
        let mut ts = TestStat::from_name("pf", TestStatOptions::default()).unwrap();
        let out = ts.get_stats(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert_relative_eq!(out.stat(), 1.5_f64.ln(), epsilon = 1e-10);
        assert_eq!(out.prob(), -1.0);
    }

    #[test]
    // Purpose
    // -------
    // Check the max relative difference with a guarded empty bin.
    //
    // Given
    // -----
    // - N1 = [10, 0, 5], N2 = [5, 0, 5].
    //
    // Expect
    // ------
    // - stat = 5/15; the empty bin contributes 0 rather than NaN.
    fn rmd_matches_hand_computation() {
        let mut ts = TestStat::from_name("rmd", TestStatOptions::default()).unwrap();
        let out = ts.get_stats(&[10.0, 0.0, 5.0], &[5.0, 0.0, 5.0]).unwrap();
        assert_relative_eq!(out.stat(), 1.0 / 3.0, epsilon = 1e-12);
        assert_eq!(out.prob(), -1.0);
    }

    #[test]
    // Purpose
    // -------
    // Check the KS distance and that its probability is a probability.
    //
    // Given
    // -----
    // - N1 = [1, 1], N2 = [2, 0]: F1 = [0.5, 1], F2 = [1, 1].
    //
    // Expect
    // ------
    // - d = 0.5; prob = Q((1 + 0.12 + 0.11)·0.5) ∈ (0, 1).
    fn ks_matches_hand_computation() {
        let mut ts = TestStat::from_name("ks", TestStatOptions::default()).unwrap();
        let out = ts.get_stats(&[1.0, 1.0], &[2.0, 0.0]).unwrap();
        assert_relative_eq!(out.stat(), 0.5, epsilon = 1e-15);
        assert_relative_eq!(out.prob(), kolmogorov_sf(1.23 * 0.5), epsilon = 1e-15);
        assert!(out.prob() > 0.0 && out.prob() < 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Ensure identical distributions give a zero statistic.
    //
    // Given
    // -----
    // - N1 = N2 = [12, 30, 7, 51].
    //
    // Expect
    // ------
    // - chi2, rmd, ks all 0; chi2 prob = 0 and ks prob = 1.
    fn identical_inputs_give_zero_statistic() {
        let n = [12.0, 30.0, 7.0, 51.0];
        for name in ["chi2", "rmd", "ks"] {
            let mut ts = TestStat::from_name(name, TestStatOptions::default()).unwrap();
            let out = ts.get_stats(&n, &n).unwrap();
            assert_eq!(out.stat(), 0.0, "{name}");
            assert!(ts.pass_tol(), "{name}");
        }
        let mut chi2 = TestStat::from_name("chi2", TestStatOptions::default()).unwrap();
        assert_eq!(chi2.get_stats(&n, &n).unwrap().prob(), 0.0);
        let mut ks = TestStat::from_name("ks", TestStatOptions::default()).unwrap();
        assert_eq!(ks.get_stats(&n, &n).unwrap().prob(), 1.0);
    }

    #[test]
    // Purpose
    // -------
    // Verify delstat tracks successive calls and dof is fixed on the first.
    //
    // Given
    // -----
    // - An rmd statistic called on a 3-bin pair, then a 3-bin identical pair.
    //
    // Expect
    // ------
    // - Initial state (−1, 0, −1); first delstat = stat + 1; second
    //   delstat = 0 − first stat; dof stays 3.
    fn delstat_and_dof_bookkeeping() {
        // Arrange
        let mut ts = TestStat::from_name("rmd", TestStatOptions::with_tol(0.05)).unwrap();
        assert_eq!((ts.stat(), ts.delstat(), ts.prob(), ts.dof()), (-1.0, 0.0, -1.0, None));

        // Act
        let first = ts.get_stats(&[10.0, 0.0, 5.0], &[5.0, 0.0, 5.0]).unwrap();
        let passed_first = ts.pass_tol();
        let second = ts.get_stats(&[4.0, 4.0, 4.0], &[4.0, 4.0, 4.0]).unwrap();

        // Assert
        assert_relative_eq!(first.delstat(), first.stat() + 1.0, epsilon = 1e-15);
        assert!(!passed_first);
        assert_relative_eq!(second.delstat(), -first.stat(), epsilon = 1e-15);
        assert!(ts.pass_tol());
        assert_eq!(ts.dof(), Some(3));
    }

    #[test]
    // Purpose
    // -------
    // Verify a test range restricts the compared bins.
    //
    // Given
    // -----
    // - x = [1, 2, 3, 4], range (2, 4) → bins [1, 3).
    // - Distributions that differ only outside the window.
    //
    // Expect
    // ------
    // - rmd = 0; dof = 2; a failed call leaves state unchanged.
    fn test_range_restricts_window() {
        // Arrange
        let opts = TestStatOptions {
            tol: 0.01,
            x_axis: Some(vec![1.0, 2.0, 3.0, 4.0]),
            test_range: Some((2.0, 4.0)),
        };
        let mut ts = TestStat::new(TestStatKind::Rmd, opts).unwrap();

        // Act
        let out = ts.get_stats(&[100.0, 5.0, 6.0, 0.0], &[0.0, 5.0, 6.0, 100.0]).unwrap();
        let err = ts.get_stats(&[1.0, f64::NAN, 1.0, 1.0], &[1.0, 1.0, 1.0, 1.0]);

        // Assert
        assert_eq!(ts.bins(), Some((1, 3)));
        assert_eq!(out.stat(), 0.0);
        assert_eq!(ts.dof(), Some(2));
        assert!(matches!(err, Err(TSError::NonFiniteData(_))));
        assert_eq!(ts.stat(), 0.0);
    }

    #[test]
    fn configuration_and_total_errors() {
        assert!(matches!(
            TestStat::from_name("ks", TestStatOptions::with_tol(-1.0)),
            Err(TSError::InvalidTolerance(_))
        ));
        let reversed = TestStatOptions { test_range: Some((3.0, 1.0)), ..TestStatOptions::default() };
        assert!(matches!(TestStat::from_name("ks", reversed), Err(TSError::InvalidRange { .. })));

        let mut ks = TestStat::from_name("ks", TestStatOptions::default()).unwrap();
        assert_eq!(ks.get_stats(&[0.0, 0.0], &[1.0, 1.0]), Err(TSError::NonPositiveTotal(0.0)));
        assert_eq!(
            ks.get_stats(&[1.0], &[1.0, 1.0]),
            Err(TSError::LengthMismatch { left: 1, right: 2 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Check the Kolmogorov survival function at reference points and that
    // both branches agree at the switch point.
    //
    // Given
    // -----
    // - λ = 1.0 (Q ≈ 0.2699996717), λ = 1.358 (Q ≈ 0.05), λ = 0.
    //
    // Expect
    // ------
    // - Reference values within tolerance; Q(0) = 1; the two series agree
    //   at λ = 1.18.
    fn kolmogorov_sf_reference_values() {
        assert_relative_eq!(kolmogorov_sf(1.0), 0.2699996717, epsilon = 1e-9);
        assert_relative_eq!(kolmogorov_sf(1.358), 0.05, epsilon = 5e-4);
        assert_eq!(kolmogorov_sf(0.0), 1.0);
        assert_relative_eq!(
            1.0 - kolmogorov_cdf_small(1.18),
            kolmogorov_sf_large(1.18),
            epsilon = 1e-12
        );
        assert!(kolmogorov_sf(3.0) < 1e-6);
    }
}
