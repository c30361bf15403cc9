//! Statistical utilities for survival-prediction evaluation.
//!
//! This crate provides a small, dependency-free collection of statistical tools:
//!
//! - **Survival analysis**: Kaplan-Meier estimator for right-censored time-to-event data
//! - **Descriptive statistics**: Min, max, mean, median, variance and standard deviation
//!
//! # Modules
//!
//! - [`survival`]: Kaplan-Meier survival curves for analyzing time-to-event data
//! - [`descriptive`]: Descriptive statistics for summarizing datasets
//!
//! # Examples
//!
//! ## Analyzing survival data
//!
//! ```
//! use survloss_stats::survival::KaplanMeierCurve;
//!
//! // Data: (time, is_censored)
//! let data = vec![
//!     (1.0, false), // Event occurred at time 1
//!     (2.0, true),  // Censored at time 2
//!     (3.0, false), // Event occurred at time 3
//! ];
//! let curve = KaplanMeierCurve::from_data(data);
//! assert!((curve.survival_at(2.5) - 2.0 / 3.0).abs() < 1e-12);
//! ```
//!
//! ## Computing descriptive statistics
//!
//! ```
//! use survloss_stats::descriptive::DescriptiveStats;
//!
//! let values = [1.0, 2.0, 3.0, 4.0, 5.0];
//! let stats = DescriptiveStats::new(values).unwrap();
//! assert_eq!(stats.mean, 3.0);
//! ```

pub mod descriptive;
pub mod survival;
