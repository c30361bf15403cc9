use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use survloss_metric::config::ScoringConfig;
use survloss_stats::descriptive::DescriptiveStats;

/// Result of a `score` run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Timestamp when the dataset was scored
    pub scored_at: DateTime<Utc>,
    pub config: ScoringConfig,
    /// Baseline strategy, present when ERV was requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_strategy: Option<String>,
    /// `mean_nll` or `erv`
    pub measure: String,
    pub score: f64,
    /// Mean negative log-likelihood of the predictions
    pub model_loss: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baseline_loss: Option<f64>,
    pub num_subjects: usize,
    pub num_events: usize,
    /// Subjects whose density was raised to eps
    pub floored_subjects: usize,
    pub loss_summary: LossSummary,
    /// Kaplan-Meier median of the observed times
    pub baseline_median_survival: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_losses: Option<Vec<f64>>,
}

/// Distribution of per-subject losses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
}

impl From<DescriptiveStats> for LossSummary {
    fn from(stats: DescriptiveStats) -> Self {
        Self {
            min: stats.min,
            max: stats.max,
            mean: stats.mean,
            median: stats.median,
            std_dev: stats.std_dev,
        }
    }
}
