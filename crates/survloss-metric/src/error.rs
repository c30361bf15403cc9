/// Errors raised while scoring survival predictions.
///
/// Every variant describes malformed input. None of them is recoverable by
/// retrying; they are surfaced at the point of detection.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum ScoreError {
    #[display("survival curve has {knots} knot(s), at least 2 are required")]
    InsufficientKnots { knots: usize },
    #[display("survival curve is invalid: {reason}")]
    InvalidCurve { reason: String },
    #[display("mismatched input lengths: {curves} curves, {times} times, {events} event indicators")]
    ShapeMismatch {
        curves: usize,
        times: usize,
        events: usize,
    },
    #[display("no subjects to score")]
    EmptyInput,
    #[display("baseline loss {baseline_loss} is zero or non-finite, ERV is undefined")]
    DegenerateBaseline { baseline_loss: f64 },
    #[display("eps must be finite and positive, got {eps}")]
    InvalidEpsilon { eps: f64 },
}

impl ScoreError {
    pub(crate) fn invalid_curve(reason: impl Into<String>) -> Self {
        Self::InvalidCurve {
            reason: reason.into(),
        }
    }
}
