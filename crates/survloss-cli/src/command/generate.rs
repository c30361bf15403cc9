//! Synthetic dataset generation
//!
//! Every subject gets a constant hazard `lambda`. Its predicted curve samples
//! `S(t) = exp(-lambda t)` on a regular grid over `[0, horizon]`, and its
//! outcome is drawn from the same exponential distribution, right-censored by
//! an independent exponential censoring time and by the horizon itself.

use std::path::PathBuf;

use anyhow::ensure;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};
use rand_pcg::Pcg32;

use crate::{
    schema::dataset::{CurveRecord, DatasetFile, SubjectRecord},
    util::Output,
};

const MIN_HAZARD: f64 = 0.05;
const MAX_HAZARD: f64 = 1.0;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct GenerateArg {
    /// Number of subjects to generate
    #[arg(long, default_value_t = 200)]
    num_subjects: usize,
    /// Random seed (drawn from the OS if omitted)
    #[arg(long)]
    seed: Option<u64>,
    /// Hazard of the independent censoring process (0 disables it)
    #[arg(long, default_value_t = 0.1)]
    censoring_rate: f64,
    /// Number of knots on each predicted curve
    #[arg(long, default_value_t = 50)]
    num_knots: usize,
    /// End of follow-up; later outcomes are censored here
    #[arg(long, default_value_t = 10.0)]
    horizon: f64,
    /// Output file path (stdout if omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

pub(crate) fn run(arg: &GenerateArg) -> anyhow::Result<()> {
    let seed = arg.seed.unwrap_or_else(|| rand::rng().random());
    log::info!("Generating {} subjects with seed {seed}", arg.num_subjects);

    let mut rng = Pcg32::seed_from_u64(seed);
    let dataset = generate(arg, &mut rng)?;

    let num_events = dataset.subjects.iter().filter(|s| s.event).count();
    log::info!(
        "Generated {} subjects ({num_events} events)",
        dataset.subjects.len()
    );
    Output::save_json(&dataset, arg.output.as_deref())
}

fn generate<R>(arg: &GenerateArg, rng: &mut R) -> anyhow::Result<DatasetFile>
where
    R: Rng,
{
    ensure!(arg.num_knots >= 2, "--num-knots must be at least 2");
    ensure!(
        arg.horizon.is_finite() && arg.horizon > 0.0,
        "--horizon must be positive"
    );
    ensure!(
        arg.censoring_rate.is_finite() && arg.censoring_rate >= 0.0,
        "--censoring-rate must be non-negative"
    );

    let censoring = if arg.censoring_rate > 0.0 {
        Some(exponential(arg.censoring_rate)?)
    } else {
        None
    };
    let grid = time_grid(arg.horizon, arg.num_knots);

    let subjects = (0..arg.num_subjects)
        .map(|_| -> anyhow::Result<SubjectRecord> {
            let hazard = rng.random_range(MIN_HAZARD..=MAX_HAZARD);
            let event_time = exponential(hazard)?.sample(rng);
            let censor_time = censoring
                .as_ref()
                .map_or(f64::INFINITY, |c| c.sample(rng))
                .min(arg.horizon);

            Ok(SubjectRecord {
                curve: CurveRecord {
                    times: grid.clone(),
                    survival: grid.iter().map(|t| (-hazard * t).exp()).collect(),
                },
                time: event_time.min(censor_time),
                event: event_time <= censor_time,
            })
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(DatasetFile { subjects })
}

fn exponential(rate: f64) -> anyhow::Result<Exp<f64>> {
    Exp::new(rate).map_err(|e| anyhow::anyhow!("Invalid exponential rate {rate}: {e}"))
}

#[expect(clippy::cast_precision_loss)]
fn time_grid(horizon: f64, num_knots: usize) -> Vec<f64> {
    let step = horizon / (num_knots - 1) as f64;
    (0..num_knots).map(|i| i as f64 * step).collect()
}
