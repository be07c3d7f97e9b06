//! Response-matrix covariance model selection.
//!
//! Purpose
//! -------
//! Replace the free-form covariance tag with a closed enum resolved once,
//! at configuration time. Parsing is case-insensitive and rejects anything
//! other than `"poisson"` and `"multinomial"` with
//! [`UnfoldError::InvalidConfig`].
//!
//! Conventions
//! -----------
//! - `Multinomial` is the default, matching the keyword default of the
//!   Python-facing `Mixer` constructor.
//! - Selecting `Multinomial` always succeeds; only reading the response
//!   covariance under that mode fails (see `CovarianceMatrix::vc_pp`).

use std::{fmt, str::FromStr};

use crate::unfolding::errors::UnfoldError;

/// CovarianceType — model for the covariance of response-matrix entries.
///
/// Variants
/// --------
/// - `Poisson`
///   Entries are independent; the covariance is `diag(Rerr²)`.
/// - `Multinomial`
///   Each response row is a multinomial fraction. Reading the covariance in
///   this mode reports [`UnfoldError::NotImplemented`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CovarianceType {
    Poisson,
    #[default]
    Multinomial,
}

impl CovarianceType {
    /// Lower-case tag, as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            CovarianceType::Poisson => "poisson",
            CovarianceType::Multinomial => "multinomial",
        }
    }
}

impl FromStr for CovarianceType {
    type Err = UnfoldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "poisson" => Ok(CovarianceType::Poisson),
            "multinomial" => Ok(CovarianceType::Multinomial),
            _ => Err(UnfoldError::InvalidConfig { cov_type: s.to_string() }),
        }
    }
}

impl fmt::Display for CovarianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
