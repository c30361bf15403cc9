//! Predicted survival curves
//!
//! A predicted survival curve is a discrete sampling of `S(t)`, the probability
//! that the event has not occurred by time `t`. Any predictor output that can
//! expose its ordered `(time, probability)` knots implements [`SurvivalSamples`]
//! and can be scored directly; [`SurvivalCurve`] is the owned, validated form.

use crate::ScoreError;

/// Capability of exposing an ordered `(time, survival probability)` sampling.
///
/// Both slices must have the same length and `times` must be strictly
/// increasing. Implementors outside this crate are validated again when a
/// density is estimated from them.
pub trait SurvivalSamples {
    /// Knot times in strictly increasing order.
    fn times(&self) -> &[f64];
    /// Survival probability at each knot.
    fn probabilities(&self) -> &[f64];
}

impl<T> SurvivalSamples for &T
where
    T: SurvivalSamples + ?Sized,
{
    fn times(&self) -> &[f64] {
        (**self).times()
    }

    fn probabilities(&self) -> &[f64] {
        (**self).probabilities()
    }
}

/// Owned survival curve with validated knots.
///
/// Probabilities are expected to be non-increasing and within `[0, 1]`, but
/// this is not enforced: a badly shaped prediction is still scoreable.
///
/// # Examples
///
/// ```
/// use survloss_metric::curve::{SurvivalCurve, SurvivalSamples};
///
/// let curve = SurvivalCurve::new(vec![0.0, 1.0, 2.0], vec![1.0, 0.7, 0.4])?;
/// assert_eq!(curve.len(), 3);
/// assert_eq!(curve.probabilities()[1], 0.7);
/// # Ok::<(), survloss_metric::ScoreError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SurvivalCurve {
    times: Vec<f64>,
    probabilities: Vec<f64>,
}

impl SurvivalCurve {
    /// Builds a curve from parallel time and probability columns.
    pub fn new(times: Vec<f64>, probabilities: Vec<f64>) -> Result<Self, ScoreError> {
        validate_knots(&times, &probabilities)?;
        Ok(Self {
            times,
            probabilities,
        })
    }

    /// Builds a curve from `(time, probability)` pairs.
    pub fn from_knots<I>(knots: I) -> Result<Self, ScoreError>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let (times, probabilities) = knots.into_iter().unzip();
        Self::new(times, probabilities)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`: a valid curve has at least two knots.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Iterates over the `(time, probability)` knots.
    pub fn knots(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.times
            .iter()
            .copied()
            .zip(self.probabilities.iter().copied())
    }

    /// Time span `(t_min, t_max)` covered by the knots.
    #[must_use]
    pub fn domain(&self) -> (f64, f64) {
        (self.times[0], self.times[self.times.len() - 1])
    }
}

impl SurvivalSamples for SurvivalCurve {
    fn times(&self) -> &[f64] {
        &self.times
    }

    fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }
}

/// Checks the knot invariants shared by every density estimate.
pub(crate) fn validate_knots(times: &[f64], probabilities: &[f64]) -> Result<(), ScoreError> {
    if times.len() != probabilities.len() {
        return Err(ScoreError::invalid_curve(format!(
            "{} times but {} probabilities",
            times.len(),
            probabilities.len()
        )));
    }
    if times.len() < 2 {
        return Err(ScoreError::InsufficientKnots { knots: times.len() });
    }
    if let Some(t) = times.iter().find(|t| !t.is_finite()) {
        return Err(ScoreError::invalid_curve(format!("non-finite time {t}")));
    }
    if let Some(p) = probabilities.iter().find(|p| !p.is_finite()) {
        return Err(ScoreError::invalid_curve(format!(
            "non-finite probability {p}"
        )));
    }
    if let Some(w) = times.windows(2).find(|w| w[0] >= w[1]) {
        return Err(ScoreError::invalid_curve(format!(
            "times must be strictly increasing, found {} followed by {}",
            w[0], w[1]
        )));
    }
    Ok(())
}
