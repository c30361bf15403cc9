use anyhow::Context;
use serde::{Deserialize, Serialize};
use survloss_metric::{
    curve::SurvivalCurve,
    dataset::{Dataset, Observation, Subject},
};

/// Predicted curves and observed outcomes, one record per subject
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetFile {
    pub subjects: Vec<SubjectRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubjectRecord {
    /// Predicted survival curve
    pub curve: CurveRecord,
    /// Observed event time, or censoring time when `event` is false
    pub time: f64,
    /// Whether the event was observed
    pub event: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveRecord {
    pub times: Vec<f64>,
    pub survival: Vec<f64>,
}

impl DatasetFile {
    pub(crate) fn to_dataset(&self) -> anyhow::Result<Dataset> {
        self.subjects
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let curve =
                    SurvivalCurve::new(record.curve.times.clone(), record.curve.survival.clone())
                        .with_context(|| format!("Invalid curve for subject #{i}"))?;
                Ok(Subject {
                    curve,
                    observation: Observation {
                        time: record.time,
                        event_occurred: record.event,
                    },
                })
            })
            .collect()
    }
}
