use serde::{Deserialize, Serialize};

use crate::ScoreError;

/// Default floor applied to density estimates before taking the logarithm.
pub const DEFAULT_EPS: f64 = 1e-6;

/// Options fixed for the duration of one scoring call.
///
/// # Examples
///
/// ```
/// use survloss_metric::config::{DEFAULT_EPS, ScoringConfig};
///
/// let config = ScoringConfig::default().with_erv(true);
/// assert!(config.erv);
/// assert_eq!(config.eps, DEFAULT_EPS);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Rescale the loss against a Kaplan-Meier baseline (Explained Residual Variation).
    pub erv: bool,
    /// Lower bound for densities, keeps `-ln(f)` finite.
    pub eps: f64,
    /// Evaluate subjects on the rayon thread pool.
    pub parallel: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            erv: false,
            eps: DEFAULT_EPS,
            parallel: false,
        }
    }
}

impl ScoringConfig {
    #[must_use]
    pub fn with_erv(mut self, erv: bool) -> Self {
        self.erv = erv;
        self
    }

    #[must_use]
    pub fn with_eps(mut self, eps: f64) -> Self {
        self.eps = eps;
        self
    }

    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<(), ScoreError> {
        if self.eps.is_finite() && self.eps > 0.0 {
            Ok(())
        } else {
            Err(ScoreError::InvalidEpsilon { eps: self.eps })
        }
    }

    /// Per-subject loss `-ln(max(eps, density))`.
    #[must_use]
    pub fn floored_loss(&self, density: f64) -> f64 {
        -density.max(self.eps).ln()
    }
}
