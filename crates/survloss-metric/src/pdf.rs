//! Density estimation from sampled survival curves
//!
//! The density of the event time is `f(t) = -dS/dt`. It is estimated in two
//! swappable steps:
//!
//! 1. A [`Gradient`] scheme differentiates the survival probabilities with
//!    respect to time at every knot, and the result is negated.
//! 2. An [`Interpolation`] scheme turns the density samples into a function
//!    that can be queried at any time, including outside the knot range.
//!
//! The sign of the estimate is never clamped. A non-monotone curve yields
//! negative densities, which the scorer floors at `eps`.
//!
//! # Examples
//!
//! ```
//! use survloss_metric::{curve::SurvivalCurve, pdf::PdfEstimator};
//!
//! let curve = SurvivalCurve::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 0.8, 0.5, 0.2])?;
//! let density = PdfEstimator::new().density_at(&curve, 1.5)?;
//! assert!((density - 0.275).abs() < 1e-12);
//! # Ok::<(), survloss_metric::ScoreError>(())
//! ```

use crate::{
    ScoreError,
    curve::{SurvivalSamples, validate_knots},
};

/// Numerical differentiation of sampled values.
pub trait Gradient: Sync {
    /// Returns `dy/dx` at every sample. `xs` is strictly increasing and has at
    /// least two entries, `ys` has the same length.
    fn gradient(&self, xs: &[f64], ys: &[f64]) -> Vec<f64>;
}

/// Second-order central differences on interior samples, first-order one-sided
/// differences at both ends. Handles non-uniform spacing.
#[derive(Debug, Default, Clone, Copy)]
pub struct CentralDifference;

impl Gradient for CentralDifference {
    fn gradient(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        let n = xs.len();
        let mut out = Vec::with_capacity(n);
        out.push((ys[1] - ys[0]) / (xs[1] - xs[0]));
        for i in 1..n - 1 {
            let hd = xs[i] - xs[i - 1];
            let hs = xs[i + 1] - xs[i];
            let w_prev = -hs / (hd * (hd + hs));
            let w_mid = (hs - hd) / (hd * hs);
            let w_next = hd / (hs * (hd + hs));
            out.push(w_prev * ys[i - 1] + w_mid * ys[i] + w_next * ys[i + 1]);
        }
        out.push((ys[n - 1] - ys[n - 2]) / (xs[n - 1] - xs[n - 2]));
        out
    }
}

/// Slope of the segment starting at each sample; the last sample reuses the
/// slope of the final segment.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForwardDifference;

impl Gradient for ForwardDifference {
    fn gradient(&self, xs: &[f64], ys: &[f64]) -> Vec<f64> {
        let mut out = xs
            .windows(2)
            .zip(ys.windows(2))
            .map(|(x, y)| (y[1] - y[0]) / (x[1] - x[0]))
            .collect::<Vec<_>>();
        if let Some(&last) = out.last() {
            out.push(last);
        }
        out
    }
}

/// A function of time built from samples.
pub trait Interpolant {
    fn eval(&self, t: f64) -> f64;
}

/// Builds an [`Interpolant`] from samples.
pub trait Interpolation: Sync {
    type Interpolant: Interpolant;

    /// `xs` is strictly increasing and has at least two entries.
    fn interpolate(&self, xs: Vec<f64>, ys: Vec<f64>) -> Self::Interpolant;
}

/// Piecewise linear interpolation with linear extrapolation of the boundary
/// segments.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearInterpolation;

impl Interpolation for LinearInterpolation {
    type Interpolant = PiecewiseLinear;

    fn interpolate(&self, xs: Vec<f64>, ys: Vec<f64>) -> PiecewiseLinear {
        PiecewiseLinear { xs, ys }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PiecewiseLinear {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Interpolant for PiecewiseLinear {
    fn eval(&self, t: f64) -> f64 {
        let n = self.xs.len();
        // Right end of the segment containing `t`, clamped so that queries
        // outside the knot range extend the first or last segment.
        let hi = self.xs.partition_point(|&x| x < t).clamp(1, n - 1);
        let lo = hi - 1;
        let (x0, x1) = (self.xs[lo], self.xs[hi]);
        let (y0, y1) = (self.ys[lo], self.ys[hi]);
        y0 + (t - x0) * (y1 - y0) / (x1 - x0)
    }
}

/// Turns sampled survival curves into queryable density functions.
#[derive(Debug, Default, Clone)]
pub struct PdfEstimator<G = CentralDifference, I = LinearInterpolation> {
    gradient: G,
    interpolation: I,
}

impl PdfEstimator {
    /// Central differences with piecewise linear interpolation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G, I> PdfEstimator<G, I>
where
    G: Gradient,
    I: Interpolation,
{
    #[must_use]
    pub fn with_schemes(gradient: G, interpolation: I) -> Self {
        Self {
            gradient,
            interpolation,
        }
    }

    /// Builds the density function `f(t) = -dS/dt` of a curve.
    pub fn density_function<C>(&self, curve: &C) -> Result<I::Interpolant, ScoreError>
    where
        C: SurvivalSamples + ?Sized,
    {
        let times = curve.times();
        let probabilities = curve.probabilities();
        validate_knots(times, probabilities)?;

        let densities = self
            .gradient
            .gradient(times, probabilities)
            .into_iter()
            .map(|slope| -slope)
            .collect();
        Ok(self.interpolation.interpolate(times.to_vec(), densities))
    }

    /// Estimated density of a curve at time `t`.
    pub fn density_at<C>(&self, curve: &C, t: f64) -> Result<f64, ScoreError>
    where
        C: SurvivalSamples + ?Sized,
    {
        Ok(self.density_function(curve)?.eval(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::SurvivalCurve;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    fn reference_curve() -> SurvivalCurve {
        SurvivalCurve::new(vec![0.0, 1.0, 2.0, 3.0], vec![1.0, 0.8, 0.5, 0.2]).unwrap()
    }

    struct RawSamples {
        times: Vec<f64>,
        probabilities: Vec<f64>,
    }

    impl SurvivalSamples for RawSamples {
        fn times(&self) -> &[f64] {
            &self.times
        }

        fn probabilities(&self) -> &[f64] {
            &self.probabilities
        }
    }

    #[test]
    fn test_central_difference_uniform_spacing() {
        let slopes = CentralDifference.gradient(&[0.0, 1.0, 2.0, 3.0], &[1.0, 0.8, 0.5, 0.2]);
        let expected = [-0.2, -0.25, -0.3, -0.3];
        for (s, e) in slopes.iter().zip(expected) {
            assert_close(*s, e);
        }
    }

    #[test]
    fn test_central_difference_is_exact_for_quadratics() {
        // y = x^2 on uneven spacing, interior derivative is exact
        let xs = [0.0, 0.5, 2.0, 2.5];
        let ys = xs.map(|x| x * x);
        let slopes = CentralDifference.gradient(&xs, &ys);
        assert_close(slopes[1], 1.0);
        assert_close(slopes[2], 4.0);
        // One-sided at the ends
        assert_close(slopes[0], 0.5);
        assert_close(slopes[3], 4.5);
    }

    #[test]
    fn test_forward_difference() {
        let slopes = ForwardDifference.gradient(&[0.0, 1.0, 3.0], &[1.0, 0.5, 0.1]);
        assert_close(slopes[0], -0.5);
        assert_close(slopes[1], -0.2);
        assert_close(slopes[2], -0.2);
    }

    #[test]
    fn test_linear_interpolation_and_extrapolation() {
        let f = LinearInterpolation.interpolate(vec![0.0, 1.0, 3.0], vec![0.0, 1.0, 0.0]);
        assert_close(f.eval(0.5), 0.5);
        assert_close(f.eval(1.0), 1.0);
        assert_close(f.eval(2.0), 0.5);
        // Boundary segments extend linearly
        assert_close(f.eval(-1.0), -1.0);
        assert_close(f.eval(5.0), -1.0);
    }

    #[test]
    fn test_density_inside_domain() {
        let density = PdfEstimator::new()
            .density_at(&reference_curve(), 1.5)
            .unwrap();
        assert_close(density, 0.275);
    }

    #[test]
    fn test_density_extrapolates_outside_domain() {
        let estimator = PdfEstimator::new();
        let curve = reference_curve();
        assert_close(estimator.density_at(&curve, 10.0).unwrap(), 0.3);
        // Left extension of the first segment: 0.2 - 1.0 * 0.05
        assert_close(estimator.density_at(&curve, -1.0).unwrap(), 0.15);
    }

    #[test]
    fn test_density_finite_inside_domain() {
        let estimator = PdfEstimator::new();
        let curve = SurvivalCurve::new(
            vec![0.0, 0.1, 0.7, 2.0, 2.05, 9.0],
            vec![1.0, 0.99, 0.8, 0.4, 0.39, 0.0],
        )
        .unwrap();
        for i in 0..=90 {
            let t = f64::from(i) * 0.1;
            assert!(estimator.density_at(&curve, t).unwrap().is_finite());
        }
    }

    #[test]
    fn test_non_monotone_curve_gives_negative_density() {
        let curve = SurvivalCurve::new(vec![0.0, 1.0, 2.0], vec![0.2, 0.6, 1.0]).unwrap();
        let density = PdfEstimator::new().density_at(&curve, 1.0).unwrap();
        assert_close(density, -0.4);
    }

    #[test]
    fn test_swapped_gradient_scheme() {
        let estimator = PdfEstimator::with_schemes(ForwardDifference, LinearInterpolation);
        let density = estimator.density_at(&reference_curve(), 1.5).unwrap();
        // Forward slopes [-0.2, -0.3, -0.3, -0.3]
        assert_close(density, 0.3);
    }

    #[test]
    fn test_revalidates_foreign_samples() {
        let samples = RawSamples {
            times: vec![2.0],
            probabilities: vec![0.5],
        };
        assert_eq!(
            PdfEstimator::new().density_at(&samples, 2.0),
            Err(ScoreError::InsufficientKnots { knots: 1 })
        );

        let samples = RawSamples {
            times: vec![2.0, 1.0],
            probabilities: vec![0.5, 0.4],
        };
        assert!(matches!(
            PdfEstimator::new().density_at(&samples, 2.0),
            Err(ScoreError::InvalidCurve { .. })
        ));
    }
}
