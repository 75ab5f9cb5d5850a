//! Statistical reduction of per-frame metric samples and BD-Rate analysis.
//!
//! ## Core Statistics
//!
//! - [`AggregateStats`]: Per-series summary (average, harmonic mean, std_dev, p10)
//! - [`mean`], [`std_dev`], [`harmonic_mean`]: Basic statistical functions
//! - [`percentile`] (R-7 interpolation) and [`nearest_rank`]: Percentiles
//! - [`PercentileMethod`]: Which percentile convention an aggregate uses
//!
//! ## Rate-Distortion Analysis
//!
//! - [`RateDistortionCurve`]: Distortion-sorted (rate, distortion) points
//! - [`bd_rate`], [`try_bd_rate`]: Bjontegaard Delta Rate calculation
//! - [`integrate::simpson`]: Composite Simpson's rule on a uniform grid

pub mod bd_rate;
mod curve;
pub mod integrate;

pub use bd_rate::{BdRateConfig, bd_rate, bd_rate_with, try_bd_rate};
pub use curve::{RDPoint, RateDistortionCurve};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::MetricSeries;

/// Percentile convention used for the low-percentile summary.
///
/// The two conventions diverge most on short series, so results persisted
/// with one must not be compared against results computed with the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentileMethod {
    /// `sorted[floor(n * p)]`, no interpolation.
    #[default]
    NearestRank,
    /// Linear interpolation between order statistics (R-7).
    Interpolated,
}

impl PercentileMethod {
    /// Stable name used in configs and persisted results.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::NearestRank => "nearest_rank",
            Self::Interpolated => "interpolated",
        }
    }

    /// Evaluate the `p` quantile (0.0-1.0) of pre-sorted values.
    fn evaluate_sorted(self, sorted: &[f64], p: f64) -> f64 {
        match self {
            Self::NearestRank => nearest_rank_sorted(sorted, p),
            Self::Interpolated => percentile_sorted(sorted, p),
        }
    }
}

impl fmt::Display for PercentileMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PercentileMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "nearest_rank" | "nearest" | "rank" => Ok(Self::NearestRank),
            "interpolated" | "linear" | "r7" => Ok(Self::Interpolated),
            other => Err(Error::InvalidConfig(format!(
                "unknown percentile method '{other}' (expected nearest_rank or interpolated)"
            ))),
        }
    }
}

/// Summary statistics for one metric series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub average: f64,
    /// Signed-reciprocal harmonic mean, see [`harmonic_mean`].
    pub harmonic_mean: f64,
    /// Population standard deviation (N denominator).
    pub std_dev: f64,
    /// 10th percentile under `percentile_method`.
    pub p10: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Convention used for `p10`.
    pub percentile_method: PercentileMethod,
}

impl AggregateStats {
    /// Summarize a series. Infallible because a [`MetricSeries`] is never empty.
    #[must_use]
    pub fn compute(series: &MetricSeries, method: PercentileMethod) -> Self {
        summarize(series.samples(), method)
    }
}

/// Summarize raw samples, failing on an empty slice.
///
/// # Example
///
/// ```
/// use video_eval::stats::{aggregate, PercentileMethod};
///
/// let stats = aggregate(&[1.0, 2.0, 3.0, 4.0, 5.0], PercentileMethod::NearestRank).unwrap();
/// assert!((stats.average - 3.0).abs() < 1e-12);
/// assert_eq!(stats.p10, 1.0);
/// assert!(aggregate(&[], PercentileMethod::NearestRank).is_err());
/// ```
pub fn aggregate(values: &[f64], method: PercentileMethod) -> Result<AggregateStats> {
    if values.is_empty() {
        return Err(Error::EmptySeries);
    }
    Ok(summarize(values, method))
}

fn summarize(values: &[f64], method: PercentileMethod) -> AggregateStats {
    debug_assert!(!values.is_empty());

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    AggregateStats {
        count: values.len(),
        average: mean(values),
        harmonic_mean: harmonic_mean(values),
        std_dev: std_dev(values),
        p10: method.evaluate_sorted(&sorted, 0.1),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        percentile_method: method,
    }
}

//=============================================================================
// Core Statistical Functions
//=============================================================================

/// Compute arithmetic mean.
///
/// # Example
///
/// ```
/// use video_eval::stats::mean;
///
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 3.0).abs() < 0.001);
/// ```
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute population standard deviation (N denominator).
///
/// # Example
///
/// ```
/// use video_eval::stats::std_dev;
///
/// let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert!((std_dev(&values) - 2.0).abs() < 0.001);
/// ```
#[must_use]
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Harmonic mean over signed reciprocals.
///
/// Samples are split into positives (`x > 0`) and non-positives (`x <= 0`).
/// The result is `count(positives) / (Σ 1/positives - Σ 1/non_positives)`,
/// or `0.0` when no sample is positive. Non-positive readings therefore
/// pull the mean down instead of being dropped.
///
/// A zero sample of either sign contributes an infinite reciprocal, which
/// drives the result to `+0.0`.
///
/// # Example
///
/// ```
/// use video_eval::stats::harmonic_mean;
///
/// assert!((harmonic_mean(&[1.0, 2.0, 4.0]) - 12.0 / 7.0).abs() < 1e-12);
/// assert_eq!(harmonic_mean(&[-1.0, -2.0]), 0.0);
/// ```
#[must_use]
pub fn harmonic_mean(values: &[f64]) -> f64 {
    let (positive, non_positive): (Vec<f64>, Vec<f64>) =
        values.iter().copied().partition(|&x| x > 0.0);
    // +0.0 and -0.0 both match; their reciprocals would cancel to NaN
    if positive.is_empty() || non_positive.iter().any(|&x| x == 0.0) {
        return 0.0;
    }

    let pos_sum: f64 = positive.iter().map(|x| 1.0 / x).sum();
    let neg_sum: f64 = non_positive.iter().map(|x| 1.0 / x).sum();
    positive.len() as f64 / (pos_sum - neg_sum)
}

/// Compute percentile using linear interpolation (R-7 method).
///
/// The percentile `p` should be in the range 0.0 to 1.0.
///
/// # Example
///
/// ```
/// use video_eval::stats::percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((percentile(&values, 0.5) - 3.0).abs() < 0.001);  // median
/// assert!((percentile(&values, 0.25) - 2.0).abs() < 0.001); // Q1
/// assert!((percentile(&values, 0.1) - 1.4).abs() < 0.001);
/// ```
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

/// Nearest-rank percentile: `sorted[floor(n * p)]`, 0-indexed.
///
/// # Example
///
/// ```
/// use video_eval::stats::nearest_rank;
///
/// let values = [5.0, 4.0, 3.0, 2.0, 1.0];
/// assert_eq!(nearest_rank(&values, 0.1), 1.0);
/// assert_eq!(nearest_rank(&values, 0.5), 3.0);
/// ```
#[must_use]
pub fn nearest_rank(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    nearest_rank_sorted(&sorted, p)
}

fn nearest_rank_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = (sorted.len() as f64 * p.clamp(0.0, 1.0)).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Internal: Calculate R-7 percentile from pre-sorted values.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }

    let p = p.clamp(0.0, 1.0);

    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_constant_series() {
        for c in [0.5, 3.0, 87.25] {
            let values = vec![c; 37];
            let stats = aggregate(&values, PercentileMethod::NearestRank).unwrap();

            assert!((stats.average - c).abs() < 1e-9);
            assert!((stats.harmonic_mean - c).abs() < 1e-9);
            assert!(stats.std_dev.abs() < 1e-9);
            assert_eq!(stats.p10, c);
            assert_eq!(stats.min, c);
            assert_eq!(stats.max, c);
        }
    }

    #[test]
    fn test_aggregate_one_to_five() {
        let stats = aggregate(&[1.0, 2.0, 3.0, 4.0, 5.0], PercentileMethod::NearestRank).unwrap();

        assert_eq!(stats.count, 5);
        assert!((stats.average - 3.0).abs() < 1e-12);
        assert!((stats.std_dev - 2.0_f64.sqrt()).abs() < 1e-4);
        assert_eq!(stats.p10, 1.0);
        assert_eq!(stats.percentile_method, PercentileMethod::NearestRank);
    }

    #[test]
    fn test_aggregate_empty() {
        assert!(matches!(
            aggregate(&[], PercentileMethod::NearestRank),
            Err(Error::EmptySeries)
        ));
    }

    #[test]
    fn test_p10_conventions_differ_on_short_series() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        let nearest = aggregate(&values, PercentileMethod::NearestRank).unwrap();
        let interp = aggregate(&values, PercentileMethod::Interpolated).unwrap();

        assert_eq!(nearest.p10, 10.0);
        assert!((interp.p10 - 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_nearest_rank_index() {
        // floor(20 * 0.1) = 2
        let values: Vec<f64> = (0..20).rev().map(f64::from).collect();
        assert_eq!(nearest_rank(&values, 0.1), 2.0);
        assert_eq!(nearest_rank(&values, 1.0), 19.0);
    }

    #[test]
    fn test_harmonic_mean_signed_reciprocals() {
        // 2 / (1/2 + 1/4 - 1/-4) = 2 / 1.0
        let h = harmonic_mean(&[2.0, 4.0, -4.0]);
        assert!((h - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_harmonic_mean_without_positives() {
        assert_eq!(harmonic_mean(&[0.0, -3.0]), 0.0);
        assert_eq!(harmonic_mean(&[]), 0.0);
    }

    #[test]
    fn test_harmonic_mean_zero_sample() {
        let h = harmonic_mean(&[5.0, 0.0]);
        assert_eq!(h, 0.0);
        assert!(h.is_sign_positive());
    }

    #[test]
    fn test_harmonic_mean_signed_zeros() {
        let h = harmonic_mean(&[1.0, 0.0, -0.0]);
        assert_eq!(h, 0.0);
        assert!(h.is_sign_positive());

        let h = harmonic_mean(&[3.0, -0.0, -2.0]);
        assert_eq!(h, 0.0);
        assert!(!h.is_nan());

        let stats = aggregate(&[4.0, -0.0, 0.0, 2.0], PercentileMethod::NearestRank).unwrap();
        assert_eq!(stats.harmonic_mean, 0.0);
    }

    #[test]
    fn test_std_dev_population() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&values) - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 0.0) - 1.0).abs() < 0.001);
        assert!((percentile(&values, 0.5) - 3.0).abs() < 0.001);
        assert!((percentile(&values, 1.0) - 5.0).abs() < 0.001);
    }

    #[test]
    fn test_percentile_method_parse() {
        assert_eq!(
            "nearest-rank".parse::<PercentileMethod>().unwrap(),
            PercentileMethod::NearestRank
        );
        assert_eq!(
            "Interpolated".parse::<PercentileMethod>().unwrap(),
            PercentileMethod::Interpolated
        );
        assert!("median".parse::<PercentileMethod>().is_err());
        assert_eq!(PercentileMethod::Interpolated.to_string(), "interpolated");
    }

    #[test]
    fn test_aggregate_stats_serde() {
        let stats = aggregate(&[1.0, 2.0], PercentileMethod::Interpolated).unwrap();
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"percentile_method\":\"interpolated\""));
        let back: AggregateStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
