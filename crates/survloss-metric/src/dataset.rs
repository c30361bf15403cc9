//! Observed outcomes paired with predicted curves

use serde::{Deserialize, Serialize};

use crate::{ScoreError, curve::SurvivalCurve};

/// Observed outcome of one subject.
///
/// `time` is the event time when `event_occurred` is `true`, otherwise the
/// censoring time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub time: f64,
    pub event_occurred: bool,
}

impl Observation {
    #[must_use]
    pub fn event(time: f64) -> Self {
        Self {
            time,
            event_occurred: true,
        }
    }

    #[must_use]
    pub fn censored(time: f64) -> Self {
        Self {
            time,
            event_occurred: false,
        }
    }

    #[must_use]
    pub fn is_censored(&self) -> bool {
        !self.event_occurred
    }
}

/// A predicted curve together with the outcome it is scored against.
#[derive(Debug, Clone, PartialEq)]
pub struct Subject<C = SurvivalCurve> {
    pub curve: C,
    pub observation: Observation,
}

/// Subjects to score, matched by position.
///
/// # Examples
///
/// ```
/// use survloss_metric::{ScoreError, curve::SurvivalCurve, dataset::Dataset};
///
/// let curve = SurvivalCurve::new(vec![0.0, 1.0], vec![1.0, 0.5])?;
/// let err = Dataset::from_columns(vec![curve], vec![0.5, 0.7], vec![true]).unwrap_err();
/// assert_eq!(
///     err,
///     ScoreError::ShapeMismatch { curves: 1, times: 2, events: 1 }
/// );
/// # Ok::<(), ScoreError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset<C = SurvivalCurve> {
    subjects: Vec<Subject<C>>,
}

impl<C> Dataset<C> {
    #[must_use]
    pub fn new(subjects: Vec<Subject<C>>) -> Self {
        Self { subjects }
    }

    /// Pairs curves with observed times and event indicators by index.
    pub fn from_columns(
        curves: Vec<C>,
        times: Vec<f64>,
        events: Vec<bool>,
    ) -> Result<Self, ScoreError> {
        if curves.len() != times.len() || times.len() != events.len() {
            return Err(ScoreError::ShapeMismatch {
                curves: curves.len(),
                times: times.len(),
                events: events.len(),
            });
        }
        let subjects = curves
            .into_iter()
            .zip(times.into_iter().zip(events))
            .map(|(curve, (time, event_occurred))| Subject {
                curve,
                observation: Observation {
                    time,
                    event_occurred,
                },
            })
            .collect();
        Ok(Self { subjects })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject<C>] {
        &self.subjects
    }

    pub fn observations(&self) -> impl Iterator<Item = Observation> + '_ {
        self.subjects.iter().map(|s| s.observation)
    }

    /// Number of subjects whose event was observed.
    #[must_use]
    pub fn num_events(&self) -> usize {
        self.subjects
            .iter()
            .filter(|s| s.observation.event_occurred)
            .count()
    }
}

impl<C> FromIterator<Subject<C>> for Dataset<C> {
    fn from_iter<T: IntoIterator<Item = Subject<C>>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
