//! Log-loss scoring of probabilistic survival predictions
//!
//! This crate evaluates predicted survival curves against observed event and
//! censoring times with a mean negative log-likelihood, optionally rescaled
//! against a Kaplan-Meier population baseline (Explained Residual Variation).
//!
//! # Overview
//!
//! A scoring call runs a linear pipeline:
//!
//! 1. **Density estimation** ([`pdf::PdfEstimator`]): differentiate each
//!    sampled curve and interpolate `f(t) = -dS/dt`
//! 2. **Log-loss** ([`scorer::LogLossScorer`]): evaluate each density at the
//!    subject's observed time, floor it at `eps`, average `-ln(f)`
//! 3. **Baseline normalization** ([`baseline::BaselineNormalizer`], optional):
//!    fit Kaplan-Meier on the observations and compute
//!    `ERV = 1 - model_loss / baseline_loss`
//!
//! Predicted curves are anything implementing [`curve::SurvivalSamples`];
//! [`curve::SurvivalCurve`] is the owned, validated representation.
//!
//! # Examples
//!
//! ```
//! use survloss_metric::{
//!     compute_erv, compute_mean_nll,
//!     config::ScoringConfig,
//!     curve::SurvivalCurve,
//!     dataset::Dataset,
//! };
//! # fn main() -> Result<(), survloss_metric::ScoreError> {
//!
//! let early = SurvivalCurve::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 0.6, 0.3, 0.1])?;
//! let late = SurvivalCurve::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 0.9, 0.7, 0.5])?;
//!
//! let dataset = Dataset::from_columns(
//!     vec![early, late],
//!     vec![0.8, 2.5],    // observed times
//!     vec![true, false], // event occurred?
//! )?;
//!
//! let config = ScoringConfig::default();
//! let nll = compute_mean_nll(&dataset, &config)?;
//! assert!(nll.is_finite());
//!
//! let erv = compute_erv(&dataset, &config.with_erv(true))?;
//! println!("mean NLL = {nll:.3}, ERV = {erv:.3}");
//! # Ok(())
//! # }
//! ```

pub use self::{
    error::ScoreError,
    scorer::{compute_erv, compute_mean_nll},
};

pub mod baseline;
pub mod config;
pub mod curve;
pub mod dataset;
mod error;
pub mod pdf;
pub mod scorer;
