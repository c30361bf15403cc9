/// Kaplan-Meier survival curve for right-censored time-to-event data.
///
/// The Kaplan-Meier estimator is a non-parametric statistic used to estimate the survival
/// function from lifetime data. It accounts for censored data (observations where the event
/// of interest has not occurred by the end of the follow-up).
///
/// # Fields
///
/// The curve stores parallel vectors, one entry per distinct observed time. Both event
/// times and censoring times produce an entry, so the curve is sampled at every time a
/// subject left the risk set:
/// - Distinct observed times, ascending
/// - Product-limit survival probability at each time
/// - Number of subjects at risk just before each time
/// - Number of events and censorings at each time
#[derive(Debug, Clone, PartialEq)]
pub struct KaplanMeierCurve {
    /// Distinct observed times in ascending order.
    pub times: Vec<f64>,
    /// Survival probability at each corresponding time point.
    /// Values range from 0.0 (no survival) to 1.0 (complete survival).
    pub survival_prob: Vec<f64>,
    /// Number of subjects at risk (not yet experienced the event or censored) at each time point.
    pub at_risk: Vec<usize>,
    /// Number of events (non-censored observations) that occurred at each time point.
    pub events: Vec<usize>,
    /// Number of censored observations at each time point.
    pub censored: Vec<usize>,
}

impl KaplanMeierCurve {
    /// Computes the Kaplan-Meier survival curve from survival data.
    ///
    /// # Arguments
    ///
    /// * `data` - A vector of tuples where each tuple contains:
    ///   - `time`: The time at which the observation occurred
    ///   - `is_censored`: `true` if the observation was censored (event did not occur),
    ///     `false` if the event occurred
    ///
    /// # Returns
    ///
    /// A `KaplanMeierCurve` with survival probabilities calculated at each distinct time.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survloss_stats::survival::KaplanMeierCurve;
    /// // Data: (time, is_censored)
    /// let data = vec![
    ///     (1.0, false), // Event at time 1
    ///     (2.0, true),  // Censored at time 2
    ///     (3.0, false), // Event at time 3
    /// ];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// assert_eq!(curve.times, vec![1.0, 2.0, 3.0]);
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn from_data(mut data: Vec<(f64, bool)>) -> Self {
        data.sort_by(|(a, _), (b, _)| a.total_cmp(b));

        let mut curve = Self {
            times: vec![],
            survival_prob: vec![],
            at_risk: vec![],
            events: vec![],
            censored: vec![],
        };

        let mut current_survival = 1.0;
        let total = data.len();

        let mut i = 0;
        while i < data.len() {
            let current_time = data[i].0;
            let at_risk = total - i;

            let mut event_count = 0;
            let mut censored_count = 0;
            let mut j = i;
            while j < data.len() && data[j].0.total_cmp(&current_time).is_eq() {
                if data[j].1 {
                    censored_count += 1;
                } else {
                    event_count += 1;
                }
                j += 1;
            }

            if event_count > 0 {
                current_survival *= 1.0 - (event_count as f64 / at_risk as f64);
            }

            curve.times.push(current_time);
            curve.survival_prob.push(current_survival);
            curve.at_risk.push(at_risk);
            curve.events.push(event_count);
            curve.censored.push(censored_count);

            i = j;
        }

        curve
    }

    /// Returns `true` if the curve holds no observations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Returns the `(time, survival probability)` sample points of the estimate.
    ///
    /// The time origin `(0.0, 1.0)` is prepended when the earliest observed
    /// time is positive, so the returned points describe the whole step function
    /// from the start of follow-up.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survloss_stats::survival::KaplanMeierCurve;
    /// let curve = KaplanMeierCurve::from_data(vec![(2.0, false), (4.0, false)]);
    /// assert_eq!(curve.sample_points(), vec![(0.0, 1.0), (2.0, 0.5), (4.0, 0.0)]);
    /// ```
    #[must_use]
    pub fn sample_points(&self) -> Vec<(f64, f64)> {
        let mut points = Vec::with_capacity(self.times.len() + 1);
        if self.times.first().is_some_and(|&t| t > 0.0) {
            points.push((0.0, 1.0));
        }
        points.extend(self.times.iter().copied().zip(self.survival_prob.iter().copied()));
        points
    }

    /// Returns the median survival time.
    ///
    /// The median survival time is the time at which the survival probability
    /// drops to or below 50%. If the survival probability never reaches 50%,
    /// this method returns `None`.
    ///
    /// Linear interpolation is used between time points for more accurate estimates.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survloss_stats::survival::KaplanMeierCurve;
    /// let data = vec![(10.0, false), (20.0, false), (30.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    /// if let Some(median) = curve.median_survival() {
    ///     println!("Median survival time: {median}");
    /// }
    /// ```
    #[must_use]
    pub fn median_survival(&self) -> Option<f64> {
        let i = self.survival_prob.iter().position(|&s| s <= 0.5)?;
        if i == 0 {
            return Some(self.times[0]);
        }
        let (t0, t1) = (self.times[i - 1], self.times[i]);
        let (s0, s1) = (self.survival_prob[i - 1], self.survival_prob[i]);
        Some(t0 + (0.5 - s0) / (s1 - s0) * (t1 - t0))
    }

    /// Returns the survival probability at a specific time.
    ///
    /// This method uses a step function: the survival probability remains constant
    /// between observed times and decreases only when an event occurs.
    ///
    /// Returns `1.0` if the time is before the first observation, or the last known
    /// survival probability if the time is after the last observation.
    ///
    /// # Examples
    ///
    /// ```
    /// # use survloss_stats::survival::KaplanMeierCurve;
    /// let data = vec![(10.0, false), (20.0, false)];
    /// let curve = KaplanMeierCurve::from_data(data);
    ///
    /// assert_eq!(curve.survival_at(5.0), 1.0);  // Before first event
    /// assert!(curve.survival_at(15.0) < 1.0);   // After first event
    /// ```
    #[must_use]
    pub fn survival_at(&self, time: f64) -> f64 {
        // Number of sample points at or before `time`
        let idx = self.times.partition_point(|&t| t <= time);
        if idx == 0 {
            1.0
        } else {
            self.survival_prob[idx - 1]
        }
    }
}
