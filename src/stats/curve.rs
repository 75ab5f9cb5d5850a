//! Rate-distortion curves for one encoder configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A point on a rate-distortion curve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RDPoint {
    /// Rate (file size in bytes, or bits). Positive and finite.
    pub rate: f64,

    /// Natural log of `rate`.
    pub log_rate: f64,

    /// Metric value. Direction depends on the metric.
    pub distortion: f64,

    /// Display label, usually the quality setting (e.g. CRF).
    pub label: String,
}

impl RDPoint {
    /// Create a point, rejecting rates that cannot be log-transformed.
    pub fn new(rate: f64, distortion: f64, label: impl Into<String>) -> Result<Self> {
        if !(rate > 0.0 && rate.is_finite()) {
            return Err(Error::InvalidRate { rate });
        }
        Ok(Self {
            rate,
            log_rate: rate.ln(),
            distortion,
            label: label.into(),
        })
    }
}

/// Points of one quality sweep, kept sorted by distortion ascending.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RateDistortionCurve {
    points: Vec<RDPoint>,
}

impl RateDistortionCurve {
    /// Create an empty curve.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a curve from unlabeled `(rate, distortion)` pairs.
    ///
    /// Points may come in any order.
    pub fn from_points(points: impl IntoIterator<Item = (f64, f64)>) -> Result<Self> {
        let mut curve = Self::new();
        for (i, (rate, distortion)) in points.into_iter().enumerate() {
            curve.add_point(rate, distortion, i.to_string())?;
        }
        Ok(curve)
    }

    /// Build a curve from `(rate, distortion, label)` triples.
    pub fn from_labeled<L: Into<String>>(
        points: impl IntoIterator<Item = (f64, f64, L)>,
    ) -> Result<Self> {
        let mut curve = Self::new();
        for (rate, distortion, label) in points {
            curve.add_point(rate, distortion, label)?;
        }
        Ok(curve)
    }

    /// Insert a point, keeping distortion order.
    ///
    /// Equal distortions keep insertion order.
    pub fn add_point(
        &mut self,
        rate: f64,
        distortion: f64,
        label: impl Into<String>,
    ) -> Result<()> {
        let point = RDPoint::new(rate, distortion, label)?;
        let idx = self
            .points
            .partition_point(|p| p.distortion.total_cmp(&point.distortion).is_le());
        self.points.insert(idx, point);
        Ok(())
    }

    /// Points sorted by distortion ascending.
    #[must_use]
    pub fn points(&self) -> &[RDPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Distortion values, ascending.
    #[must_use]
    pub fn distortions(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.distortion).collect()
    }

    /// `ln(rate)` values in distortion order.
    #[must_use]
    pub fn log_rates(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.log_rate).collect()
    }

    /// `(min, max)` distortion, or `None` for an empty curve.
    #[must_use]
    pub fn distortion_range(&self) -> Option<(f64, f64)> {
        Some((self.points.first()?.distortion, self.points.last()?.distortion))
    }

    /// Whether the curve can take part in a BD-Rate comparison: at least
    /// two points with strictly increasing, finite distortion.
    #[must_use]
    pub fn is_comparable(&self) -> bool {
        self.points.len() >= 2
            && self.points.iter().all(|p| !p.distortion.is_nan())
            && self.points.windows(2).all(|w| w[0].distortion < w[1].distortion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sorted_by_distortion() {
        let curve =
            RateDistortionCurve::from_points([(3000.0, 30.0), (1000.0, 10.0), (2000.0, 20.0)])
                .unwrap();

        assert_eq!(curve.distortions(), vec![10.0, 20.0, 30.0]);
        let rates: Vec<f64> = curve.points().iter().map(|p| p.rate).collect();
        assert_eq!(rates, vec![1000.0, 2000.0, 3000.0]);
        assert_eq!(curve.distortion_range(), Some((10.0, 30.0)));
    }

    #[test]
    fn test_log_rate_cached() {
        let curve = RateDistortionCurve::from_points([(std::f64::consts::E, 1.0)]).unwrap();
        assert!((curve.log_rates()[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        let mut curve = RateDistortionCurve::new();
        assert!(matches!(
            curve.add_point(0.0, 10.0, "q20"),
            Err(Error::InvalidRate { rate }) if rate == 0.0
        ));
        assert!(curve.add_point(-5.0, 10.0, "q20").is_err());
        assert!(curve.add_point(f64::NAN, 10.0, "q20").is_err());
        assert!(curve.add_point(f64::INFINITY, 10.0, "q20").is_err());
        assert!(curve.is_empty());
    }

    #[test]
    fn test_labels_follow_points() {
        let curve = RateDistortionCurve::from_labeled([
            (5000.0, 90.0, "q20"),
            (1500.0, 70.0, "q40"),
        ])
        .unwrap();
        assert_eq!(curve.points()[0].label, "q40");
        assert_eq!(curve.points()[1].label, "q20");
    }

    #[test]
    fn test_comparable() {
        assert!(!RateDistortionCurve::new().is_comparable());
        assert!(!RateDistortionCurve::from_points([(1.0, 1.0)]).unwrap().is_comparable());
        assert!(
            !RateDistortionCurve::from_points([(1.0, 1.0), (2.0, 1.0)])
                .unwrap()
                .is_comparable()
        );
        assert!(
            RateDistortionCurve::from_points([(1.0, 1.0), (2.0, 2.0)])
                .unwrap()
                .is_comparable()
        );
    }
}
