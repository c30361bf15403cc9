//! Population baseline for Explained Residual Variation (ERV)
//!
//! The baseline is fitted on the observed `(time, event)` pairs alone, never
//! on the predicted curves. A Kaplan-Meier estimate is computed once for the
//! whole population and turned into a baseline loss by a [`BaselineLoss`]
//! strategy. The model loss is then rescaled as
//!
//! ```text
//! ERV = 1 - model_loss / baseline_loss
//! ```
//!
//! `ERV = 1` means a perfect model, `ERV = 0` means no better than the
//! population baseline, negative values mean worse than the baseline.
//!
//! # Strategies
//!
//! - [`SurvivalProxyBaseline`] (default): the Kaplan-Meier survival
//!   probabilities themselves are used as likelihood terms,
//!   `mean(-ln(max(eps, S_km(t_k))))` over the curve's sample points. This is
//!   an approximation, not the NLL of a baseline density.
//! - [`KaplanMeierDensityBaseline`]: the Kaplan-Meier sample points are
//!   treated as a predicted curve shared by every subject and scored exactly
//!   like the model, `mean(-ln(max(eps, f_km(time_i))))`.

use survloss_stats::survival::KaplanMeierCurve;

use crate::{
    ScoreError,
    config::ScoringConfig,
    curve::SurvivalCurve,
    dataset::Observation,
    pdf::{
        CentralDifference, Gradient, Interpolant as _, Interpolation, LinearInterpolation,
        PdfEstimator,
    },
};

/// Turns a population Kaplan-Meier estimate into a baseline loss.
pub trait BaselineLoss: Sync {
    fn baseline_loss(
        &self,
        km: &KaplanMeierCurve,
        observations: &[Observation],
        config: &ScoringConfig,
    ) -> Result<f64, ScoreError>;
}

/// Uses the Kaplan-Meier survival probabilities as likelihood proxies.
#[derive(Debug, Default, Clone, Copy)]
pub struct SurvivalProxyBaseline;

impl BaselineLoss for SurvivalProxyBaseline {
    #[expect(clippy::cast_precision_loss)]
    fn baseline_loss(
        &self,
        km: &KaplanMeierCurve,
        _observations: &[Observation],
        config: &ScoringConfig,
    ) -> Result<f64, ScoreError> {
        let points = km.sample_points();
        if points.is_empty() {
            return Err(ScoreError::EmptyInput);
        }
        let total = points
            .iter()
            .map(|&(_, survival)| config.floored_loss(survival))
            .sum::<f64>();
        Ok(total / points.len() as f64)
    }
}

/// Scores every observation against the density of the Kaplan-Meier curve.
#[derive(Debug, Default, Clone)]
pub struct KaplanMeierDensityBaseline<G = CentralDifference, I = LinearInterpolation> {
    estimator: PdfEstimator<G, I>,
}

impl KaplanMeierDensityBaseline {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G, I> KaplanMeierDensityBaseline<G, I> {
    #[must_use]
    pub fn with_estimator(estimator: PdfEstimator<G, I>) -> Self {
        Self { estimator }
    }
}

impl<G, I> BaselineLoss for KaplanMeierDensityBaseline<G, I>
where
    G: Gradient,
    I: Interpolation,
{
    #[expect(clippy::cast_precision_loss)]
    fn baseline_loss(
        &self,
        km: &KaplanMeierCurve,
        observations: &[Observation],
        config: &ScoringConfig,
    ) -> Result<f64, ScoreError> {
        if observations.is_empty() {
            return Err(ScoreError::EmptyInput);
        }
        let curve = SurvivalCurve::from_knots(km.sample_points())?;
        let density = self.estimator.density_function(&curve)?;
        let total = observations
            .iter()
            .map(|obs| config.floored_loss(density.eval(obs.time)))
            .sum::<f64>();
        Ok(total / observations.len() as f64)
    }
}

/// Fits the population baseline and rescales model losses into ERV.
#[derive(Debug, Default, Clone)]
pub struct BaselineNormalizer<B = SurvivalProxyBaseline> {
    strategy: B,
}

impl BaselineNormalizer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<B> BaselineNormalizer<B>
where
    B: BaselineLoss,
{
    #[must_use]
    pub fn with_strategy(strategy: B) -> Self {
        Self { strategy }
    }

    /// Baseline loss of the observed population.
    pub fn baseline_loss(
        &self,
        observations: &[Observation],
        config: &ScoringConfig,
    ) -> Result<f64, ScoreError> {
        config.validate()?;
        if observations.is_empty() {
            return Err(ScoreError::EmptyInput);
        }
        let km = fit_population(observations);
        let loss = self.strategy.baseline_loss(&km, observations, config)?;
        log::debug!(
            "baseline loss {loss:.6} from {} Kaplan-Meier time points",
            km.times.len()
        );
        Ok(loss)
    }

    /// ERV of `model_loss` relative to the baseline of `observations`.
    pub fn normalize(
        &self,
        model_loss: f64,
        observations: &[Observation],
        config: &ScoringConfig,
    ) -> Result<f64, ScoreError> {
        let baseline_loss = self.baseline_loss(observations, config)?;
        erv(model_loss, baseline_loss)
    }
}

/// Kaplan-Meier estimate of the observed population.
#[must_use]
pub fn fit_population(observations: &[Observation]) -> KaplanMeierCurve {
    KaplanMeierCurve::from_data(
        observations
            .iter()
            .map(|obs| (obs.time, obs.is_censored()))
            .collect(),
    )
}

/// Explained Residual Variation, `1 - model_loss / baseline_loss`.
///
/// # Examples
///
/// ```
/// use survloss_metric::{ScoreError, baseline::erv};
///
/// assert_eq!(erv(0.5, 1.0), Ok(0.5));
/// assert_eq!(erv(1.2, 1.2), Ok(0.0));
/// assert!(matches!(erv(0.5, 0.0), Err(ScoreError::DegenerateBaseline { .. })));
/// ```
pub fn erv(model_loss: f64, baseline_loss: f64) -> Result<f64, ScoreError> {
    if !baseline_loss.is_finite() || baseline_loss.abs() <= f64::EPSILON {
        return Err(ScoreError::DegenerateBaseline { baseline_loss });
    }
    Ok(1.0 - model_loss / baseline_loss)
}
