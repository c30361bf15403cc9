//! Score command
//!
//! Reads predicted survival curves with their observed outcomes and reports
//! the mean negative log-likelihood, or its Explained Residual Variation
//! against a Kaplan-Meier baseline.

use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, ValueEnum};
use survloss_metric::{
    baseline::{self, BaselineLoss, BaselineNormalizer, KaplanMeierDensityBaseline},
    config::{DEFAULT_EPS, ScoringConfig},
    dataset::Dataset,
    pdf::PdfEstimator,
    scorer::{Evaluation, LogLossScorer},
};
use survloss_stats::descriptive::DescriptiveStats;

use crate::{
    schema::report::{LossSummary, ScoreReport},
    util::{self, Output},
};

#[derive(Debug, Clone, Args)]
pub(crate) struct ScoreArg {
    /// Path to the dataset JSON file
    pub dataset: PathBuf,

    /// Report Explained Residual Variation against a Kaplan-Meier baseline
    #[arg(long)]
    pub erv: bool,

    /// Lower bound applied to density estimates before taking the logarithm
    #[arg(long, default_value_t = DEFAULT_EPS)]
    pub eps: f64,

    /// Evaluate subjects in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Baseline loss strategy used with --erv
    #[arg(long, value_enum, default_value_t = BaselineStrategy::SurvivalProxy)]
    pub baseline: BaselineStrategy,

    /// Include every subject's loss in the report
    #[arg(long)]
    pub per_subject: bool,

    /// Output file path (stdout if omitted)
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum BaselineStrategy {
    /// Kaplan-Meier survival probabilities used as likelihood terms
    SurvivalProxy,
    /// Observations scored against the Kaplan-Meier density
    KmDensity,
}

impl BaselineStrategy {
    fn name(self) -> &'static str {
        match self {
            BaselineStrategy::SurvivalProxy => "survival_proxy",
            BaselineStrategy::KmDensity => "km_density",
        }
    }
}

pub(crate) fn run(arg: &ScoreArg) -> anyhow::Result<()> {
    let config = ScoringConfig::default()
        .with_erv(arg.erv)
        .with_eps(arg.eps)
        .with_parallel(arg.parallel);

    log::info!("Loading dataset from {}...", arg.dataset.display());
    let dataset = util::read_dataset_file(&arg.dataset)?
        .to_dataset()
        .with_context(|| format!("Invalid dataset: {}", arg.dataset.display()))?;
    log::info!(
        "Loaded {} subjects ({} events)",
        dataset.len(),
        dataset.num_events()
    );

    let evaluation = match arg.baseline {
        BaselineStrategy::SurvivalProxy => evaluate(config, BaselineNormalizer::new(), &dataset)?,
        BaselineStrategy::KmDensity => evaluate(
            config,
            BaselineNormalizer::with_strategy(KaplanMeierDensityBaseline::new()),
            &dataset,
        )?,
    };
    log::info!(
        "{} = {:.6}",
        evaluation.score.measure(),
        evaluation.score.value()
    );

    let report = build_report(arg, config, &dataset, evaluation)?;
    Output::save_json(&report, arg.output.as_deref())
}

fn evaluate<B>(
    config: ScoringConfig,
    normalizer: BaselineNormalizer<B>,
    dataset: &Dataset,
) -> anyhow::Result<Evaluation>
where
    B: BaselineLoss,
{
    let scorer = LogLossScorer::with_parts(config, PdfEstimator::new(), normalizer);
    scorer
        .evaluate(dataset)
        .context("Failed to score dataset")
}

fn build_report(
    arg: &ScoreArg,
    config: ScoringConfig,
    dataset: &Dataset,
    evaluation: Evaluation,
) -> anyhow::Result<ScoreReport> {
    let observations = dataset.observations().collect::<Vec<_>>();
    let baseline_median_survival = baseline::fit_population(&observations).median_survival();
    let loss_summary = DescriptiveStats::new(evaluation.subject_losses.iter().copied())
        .map(LossSummary::from)
        .context("No subject losses to summarize")?;

    Ok(ScoreReport {
        scored_at: Utc::now(),
        config,
        baseline_strategy: config.erv.then(|| arg.baseline.name().to_owned()),
        measure: evaluation.score.measure().to_owned(),
        score: evaluation.score.value(),
        model_loss: evaluation.model_loss,
        baseline_loss: evaluation.baseline_loss,
        num_subjects: dataset.len(),
        num_events: dataset.num_events(),
        floored_subjects: evaluation.floored_count,
        loss_summary,
        baseline_median_survival,
        subject_losses: arg.per_subject.then_some(evaluation.subject_losses),
    })
}
