//! Mean negative log-likelihood of survival predictions
//!
//! Each subject contributes `-ln(max(eps, f_i(time_i)))`, where `f_i` is the
//! density estimated from the subject's predicted curve and `time_i` its
//! observed event or censoring time. Censored and observed subjects are scored
//! the same way, against the density at their recorded time.

use rayon::prelude::*;

use crate::{
    ScoreError,
    baseline::{BaselineLoss, BaselineNormalizer, SurvivalProxyBaseline, erv},
    config::ScoringConfig,
    curve::SurvivalSamples,
    dataset::{Dataset, Observation, Subject},
    pdf::{CentralDifference, Gradient, Interpolation, LinearInterpolation, PdfEstimator},
};

/// Final score of a scoring call.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::IsVariant)]
pub enum Score {
    /// Mean negative log-likelihood, lower is better.
    MeanNll(f64),
    /// Explained Residual Variation against the population baseline, higher is better.
    Erv(f64),
}

impl Score {
    #[must_use]
    pub fn value(self) -> f64 {
        match self {
            Score::MeanNll(v) | Score::Erv(v) => v,
        }
    }

    #[must_use]
    pub fn measure(self) -> &'static str {
        match self {
            Score::MeanNll(_) => "mean_nll",
            Score::Erv(_) => "erv",
        }
    }
}

/// Full breakdown of a scoring call.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    /// Floored loss of every subject, in dataset order.
    pub subject_losses: Vec<f64>,
    /// Number of subjects whose density was raised to `eps`.
    pub floored_count: usize,
    /// Mean of `subject_losses`.
    pub model_loss: f64,
    /// Population baseline loss, present when ERV was requested.
    pub baseline_loss: Option<f64>,
    pub score: Score,
}

/// Scores datasets of predicted survival curves.
///
/// # Examples
///
/// ```
/// use survloss_metric::{
///     config::ScoringConfig, curve::SurvivalCurve, dataset::Dataset, scorer::LogLossScorer,
/// };
///
/// let curve = SurvivalCurve::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 0.8, 0.5, 0.2])?;
/// let dataset = Dataset::from_columns(vec![curve], vec![1.5], vec![true])?;
///
/// let scorer = LogLossScorer::new(ScoringConfig::default());
/// let nll = scorer.mean_nll(&dataset)?;
/// assert!((nll - 1.290_984).abs() < 1e-6);
/// # Ok::<(), survloss_metric::ScoreError>(())
/// ```
#[derive(Debug, Clone)]
pub struct LogLossScorer<G = CentralDifference, I = LinearInterpolation, B = SurvivalProxyBaseline>
{
    config: ScoringConfig,
    estimator: PdfEstimator<G, I>,
    normalizer: BaselineNormalizer<B>,
}

impl LogLossScorer {
    /// Scorer with the default density estimator and baseline strategy.
    #[must_use]
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            config,
            estimator: PdfEstimator::new(),
            normalizer: BaselineNormalizer::new(),
        }
    }
}

impl<G, I, B> LogLossScorer<G, I, B>
where
    G: Gradient,
    I: Interpolation,
    B: BaselineLoss,
{
    #[must_use]
    pub fn with_parts(
        config: ScoringConfig,
        estimator: PdfEstimator<G, I>,
        normalizer: BaselineNormalizer<B>,
    ) -> Self {
        Self {
            config,
            estimator,
            normalizer,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Density of each subject's curve at its observed time, in dataset order.
    fn densities<C>(&self, subjects: &[Subject<C>]) -> Result<Vec<f64>, ScoreError>
    where
        C: SurvivalSamples + Sync,
    {
        let density = |subject: &Subject<C>| {
            self.estimator
                .density_at(&subject.curve, subject.observation.time)
        };
        if self.config.parallel {
            subjects.par_iter().map(density).collect()
        } else {
            subjects.iter().map(density).collect()
        }
    }

    fn checked_losses<C>(&self, dataset: &Dataset<C>) -> Result<(Vec<f64>, usize), ScoreError>
    where
        C: SurvivalSamples + Sync,
    {
        self.config.validate()?;
        if dataset.is_empty() {
            return Err(ScoreError::EmptyInput);
        }

        let densities = self.densities(dataset.subjects())?;
        let mut floored_count = 0;
        let losses = densities
            .iter()
            .enumerate()
            .map(|(i, &density)| {
                if density <= self.config.eps {
                    log::trace!("subject {i}: density {density:e} floored to eps");
                    floored_count += 1;
                }
                self.config.floored_loss(density)
            })
            .collect::<Vec<_>>();

        if floored_count > 0 {
            log::warn!(
                "{floored_count} of {} subjects had a density at or below eps={:e}",
                losses.len(),
                self.config.eps
            );
        }
        Ok((losses, floored_count))
    }

    /// Floored loss `-ln(max(eps, f_i))` of every subject, in dataset order.
    pub fn subject_losses<C>(&self, dataset: &Dataset<C>) -> Result<Vec<f64>, ScoreError>
    where
        C: SurvivalSamples + Sync,
    {
        Ok(self.checked_losses(dataset)?.0)
    }

    /// Mean negative log-likelihood over all subjects.
    pub fn mean_nll<C>(&self, dataset: &Dataset<C>) -> Result<f64, ScoreError>
    where
        C: SurvivalSamples + Sync,
    {
        let losses = self.subject_losses(dataset)?;
        Ok(mean(&losses))
    }

    /// Mean negative log-likelihood rescaled against the population baseline.
    pub fn erv<C>(&self, dataset: &Dataset<C>) -> Result<f64, ScoreError>
    where
        C: SurvivalSamples + Sync,
    {
        let model_loss = self.mean_nll(dataset)?;
        let observations = dataset.observations().collect::<Vec<Observation>>();
        self.normalizer
            .normalize(model_loss, &observations, &self.config)
    }

    /// Mean NLL, or ERV when the configuration asks for it.
    pub fn score<C>(&self, dataset: &Dataset<C>) -> Result<Score, ScoreError>
    where
        C: SurvivalSamples + Sync,
    {
        if self.config.erv {
            self.erv(dataset).map(Score::Erv)
        } else {
            self.mean_nll(dataset).map(Score::MeanNll)
        }
    }

    /// Scores the dataset and keeps every intermediate result.
    pub fn evaluate<C>(&self, dataset: &Dataset<C>) -> Result<Evaluation, ScoreError>
    where
        C: SurvivalSamples + Sync,
    {
        let (subject_losses, floored_count) = self.checked_losses(dataset)?;
        let model_loss = mean(&subject_losses);
        log::debug!(
            "mean NLL {model_loss:.6} over {} subjects ({} events)",
            dataset.len(),
            dataset.num_events()
        );

        let (baseline_loss, score) = if self.config.erv {
            let observations = dataset.observations().collect::<Vec<_>>();
            let baseline_loss = self.normalizer.baseline_loss(&observations, &self.config)?;
            (
                Some(baseline_loss),
                Score::Erv(erv(model_loss, baseline_loss)?),
            )
        } else {
            (None, Score::MeanNll(model_loss))
        };

        Ok(Evaluation {
            subject_losses,
            floored_count,
            model_loss,
            baseline_loss,
            score,
        })
    }
}

#[expect(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean negative log-likelihood with the default density estimator.
pub fn compute_mean_nll<C>(dataset: &Dataset<C>, config: &ScoringConfig) -> Result<f64, ScoreError>
where
    C: SurvivalSamples + Sync,
{
    LogLossScorer::new(*config).mean_nll(dataset)
}

/// ERV with the default density estimator and Kaplan-Meier proxy baseline.
pub fn compute_erv<C>(dataset: &Dataset<C>, config: &ScoringConfig) -> Result<f64, ScoreError>
where
    C: SurvivalSamples + Sync,
{
    LogLossScorer::new(*config).erv(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{baseline::KaplanMeierDensityBaseline, curve::SurvivalCurve, pdf::ForwardDifference};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() < tol,
            "expected {expected}, got {actual}"
        );
    }

    fn reference_curve() -> SurvivalCurve {
        SurvivalCurve::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 0.8, 0.5, 0.2]).unwrap()
    }

    fn exponential_curve(rate: f64) -> SurvivalCurve {
        SurvivalCurve::from_knots((0..=40).map(|i| {
            let t = f64::from(i) * 0.25;
            (t, (-rate * t).exp())
        }))
        .unwrap()
    }

    fn cohort() -> Dataset {
        Dataset::from_columns(
            vec![
                exponential_curve(0.5),
                exponential_curve(0.3),
                exponential_curve(0.8),
                exponential_curve(0.4),
                exponential_curve(0.6),
            ],
            vec![1.2, 3.5, 0.7, 2.0, 5.0],
            vec![true, false, true, true, false],
        )
        .unwrap()
    }

    #[test]
    fn test_reference_scenario() {
        let dataset = Dataset::from_columns(vec![reference_curve()], vec![1.5], vec![true]).unwrap();
        let nll = compute_mean_nll(&dataset, &ScoringConfig::default()).unwrap();
        assert_close(nll, -(0.275_f64).ln(), 1e-12);
        assert_close(nll, 1.2910, 1e-4);
    }

    #[test]
    fn test_query_outside_domain_extrapolates() {
        let dataset = Dataset::from_columns(vec![reference_curve()], vec![10.0], vec![true]).unwrap();
        let nll = compute_mean_nll(&dataset, &ScoringConfig::default()).unwrap();
        assert!(nll.is_finite());
        assert_close(nll, -(0.3_f64).ln(), 1e-9);
    }

    #[test]
    fn test_mean_over_subjects() {
        let dataset = Dataset::from_columns(
            vec![reference_curve(), reference_curve()],
            vec![1.5, 10.0],
            vec![true, false],
        )
        .unwrap();
        let scorer = LogLossScorer::new(ScoringConfig::default());
        let losses = scorer.subject_losses(&dataset).unwrap();
        assert_eq!(losses.len(), 2);
        assert_close(
            scorer.mean_nll(&dataset).unwrap(),
            (losses[0] + losses[1]) / 2.0,
            1e-15,
        );
    }

    #[test]
    fn test_empty_dataset_fails() {
        let dataset = Dataset::<SurvivalCurve>::new(vec![]);
        let config = ScoringConfig::default();
        assert_eq!(compute_mean_nll(&dataset, &config), Err(ScoreError::EmptyInput));
        assert_eq!(compute_erv(&dataset, &config), Err(ScoreError::EmptyInput));
    }

    #[test]
    fn test_invalid_eps_fails() {
        let dataset = cohort();
        let config = ScoringConfig::default().with_eps(0.0);
        assert!(matches!(
            compute_mean_nll(&dataset, &config),
            Err(ScoreError::InvalidEpsilon { .. })
        ));
    }

    #[test]
    fn test_negative_density_is_floored() {
        // Increasing survival gives a negative density everywhere
        let curve = SurvivalCurve::new(vec![0.0, 1.0, 2.0], vec![0.2, 0.6, 1.0]).unwrap();
        let dataset = Dataset::from_columns(vec![curve], vec![1.0], vec![true]).unwrap();
        let config = ScoringConfig::default();

        let evaluation = LogLossScorer::new(config).evaluate(&dataset).unwrap();
        assert_eq!(evaluation.floored_count, 1);
        assert_close(evaluation.model_loss, -config.eps.ln(), 1e-12);
    }

    #[test]
    fn test_smaller_eps_only_raises_floored_losses() {
        let curve = SurvivalCurve::new(vec![0.0, 1.0, 2.0], vec![1.0, 1.0, 0.4]).unwrap();
        // Density 0.0 at t=0 (floored) and 0.3 at t=1.0 (not floored)
        let dataset = Dataset::from_columns(
            vec![curve.clone(), curve],
            vec![0.0, 1.0],
            vec![true, true],
        )
        .unwrap();

        let loose = LogLossScorer::new(ScoringConfig::default().with_eps(1e-3))
            .subject_losses(&dataset)
            .unwrap();
        let tight = LogLossScorer::new(ScoringConfig::default().with_eps(1e-9))
            .subject_losses(&dataset)
            .unwrap();

        assert!(tight[0] > loose[0]);
        assert_close(tight[1], loose[1], 1e-15);
        assert_close(tight[1], -(0.3_f64).ln(), 1e-12);
    }

    #[test]
    fn test_insufficient_knots_in_foreign_curve() {
        struct OnePoint;
        impl SurvivalSamples for OnePoint {
            fn times(&self) -> &[f64] {
                &[1.0]
            }
            fn probabilities(&self) -> &[f64] {
                &[0.5]
            }
        }

        let dataset = Dataset::new(vec![Subject {
            curve: OnePoint,
            observation: Observation::event(1.0),
        }]);
        assert_eq!(
            compute_mean_nll(&dataset, &ScoringConfig::default()),
            Err(ScoreError::InsufficientKnots { knots: 1 })
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dataset = cohort();
        let sequential = LogLossScorer::new(ScoringConfig::default())
            .evaluate(&dataset)
            .unwrap();
        let parallel = LogLossScorer::new(ScoringConfig::default().with_parallel(true))
            .evaluate(&dataset)
            .unwrap();
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_score_dispatch() {
        let dataset = cohort();
        let nll = LogLossScorer::new(ScoringConfig::default())
            .score(&dataset)
            .unwrap();
        assert!(nll.is_mean_nll());
        assert_eq!(nll.measure(), "mean_nll");

        let config = ScoringConfig::default().with_erv(true);
        let erv = LogLossScorer::new(config).score(&dataset).unwrap();
        assert!(erv.is_erv());
        assert_eq!(erv.value(), compute_erv(&dataset, &config).unwrap());
    }

    #[test]
    fn test_erv_uses_model_and_baseline_loss() {
        let dataset = cohort();
        let config = ScoringConfig::default().with_erv(true);
        let evaluation = LogLossScorer::new(config).evaluate(&dataset).unwrap();

        let baseline_loss = evaluation.baseline_loss.unwrap();
        assert_close(
            evaluation.score.value(),
            1.0 - evaluation.model_loss / baseline_loss,
            1e-15,
        );
        assert_eq!(
            evaluation.model_loss,
            compute_mean_nll(&dataset, &config).unwrap()
        );
    }

    #[test]
    fn test_erv_is_zero_when_model_matches_baseline() {
        let config = ScoringConfig::default().with_erv(true);
        let observations = [
            Observation::event(1.0),
            Observation::event(2.0),
            Observation::censored(3.0),
            Observation::event(4.0),
        ];
        let normalizer = BaselineNormalizer::with_strategy(KaplanMeierDensityBaseline::new());
        // Every subject predicts the population Kaplan-Meier curve
        let km_curve =
            SurvivalCurve::from_knots(crate::baseline::fit_population(&observations).sample_points())
                .unwrap();
        let dataset = observations
            .iter()
            .map(|&observation| Subject {
                curve: km_curve.clone(),
                observation,
            })
            .collect::<Dataset>();

        let scorer = LogLossScorer::with_parts(config, PdfEstimator::new(), normalizer);
        assert_eq!(scorer.erv(&dataset).unwrap(), 0.0);
    }

    #[test]
    fn test_alternative_gradient_scheme() {
        let dataset = Dataset::from_columns(vec![reference_curve()], vec![1.5], vec![true]).unwrap();
        let scorer = LogLossScorer::with_parts(
            ScoringConfig::default(),
            PdfEstimator::with_schemes(ForwardDifference, LinearInterpolation),
            BaselineNormalizer::new(),
        );
        assert_close(scorer.mean_nll(&dataset).unwrap(), -(0.3_f64).ln(), 1e-9);
    }
}
