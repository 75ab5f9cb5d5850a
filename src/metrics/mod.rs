//! Quality metrics tracked across an encoder quality sweep.
//!
//! The metric algorithms themselves run elsewhere; this module names the
//! metrics, carries their per-frame samples, and holds the scalar transforms
//! applied before aggregation:
//!
//! - **SSIMULACRA2**: perceptual score (higher is better, 100 = identical)
//! - **Butteraugli**: perceptual distance (lower is better, 0 = identical),
//!   see [`butteraugli`] for the "video Butteraugli" remap
//! - **W-XPSNR**: luma-weighted combination of per-plane XPSNR, see [`xpsnr`]
//! - **VMAF / VMAF NEG / SSIM / PSNR**: passed through from external reports

pub mod butteraugli;
pub mod xpsnr;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::stats::{AggregateStats, PercentileMethod};

pub use butteraugli::{ButteraugliSummary, butteraugli_to_perceptual};
pub use xpsnr::{XpsnrPlanes, psnr_to_mse, weighted_xpsnr};

/// Direction of a quality metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QualityDirection {
    HigherIsBetter,
    LowerIsBetter,
}

/// A per-quality-level metric column in a sweep table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    /// Mean SSIMULACRA2 score.
    #[serde(rename = "ssimu2_mean")]
    Ssimulacra2,
    /// Mean Butteraugli distance.
    #[serde(rename = "butter_distance")]
    ButteraugliDistance,
    /// Luma-weighted XPSNR.
    #[serde(rename = "wxpsnr")]
    WeightedXpsnr,
    /// VMAF NEG harmonic mean.
    #[serde(rename = "vmaf_neg")]
    VmafNeg,
    /// VMAF.
    #[serde(rename = "vmaf")]
    Vmaf,
    /// SSIM.
    #[serde(rename = "ssim")]
    Ssim,
    /// PSNR.
    #[serde(rename = "psnr")]
    Psnr,
}

impl Metric {
    /// Every metric, in sweep-table column order.
    pub const ALL: [Metric; 7] = [
        Self::Ssimulacra2,
        Self::ButteraugliDistance,
        Self::WeightedXpsnr,
        Self::VmafNeg,
        Self::Vmaf,
        Self::Ssim,
        Self::Psnr,
    ];

    /// CSV column name.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            Self::Ssimulacra2 => "ssimu2_mean",
            Self::ButteraugliDistance => "butter_distance",
            Self::WeightedXpsnr => "wxpsnr",
            Self::VmafNeg => "vmaf_neg",
            Self::Vmaf => "vmaf",
            Self::Ssim => "ssim",
            Self::Psnr => "psnr",
        }
    }

    /// Column name for this metric's BD-Rate in comparison tables.
    #[must_use]
    pub fn bd_column(self) -> String {
        format!("{}_bd", self.column())
    }

    /// Human-readable label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Ssimulacra2 => "SSIMULACRA2 Average",
            Self::ButteraugliDistance => "Butteraugli Distance",
            Self::WeightedXpsnr => "W-XPSNR",
            Self::VmafNeg => "VMAF NEG (Harmonic Mean)",
            Self::Vmaf => "VMAF",
            Self::Ssim => "SSIM",
            Self::Psnr => "PSNR",
        }
    }

    #[must_use]
    pub fn direction(self) -> QualityDirection {
        match self {
            Self::ButteraugliDistance => QualityDirection::LowerIsBetter,
            _ => QualityDirection::HigherIsBetter,
        }
    }

    /// Alternate header spellings accepted on import.
    fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Ssimulacra2 => &["ssimulacra2", "ssim2", "ssimu2", "ssimu2_avg"],
            Self::ButteraugliDistance => &["butteraugli", "butter", "butter_dis"],
            Self::WeightedXpsnr => &["w_xpsnr", "weighted_xpsnr", "xpsnr"],
            Self::VmafNeg => &["vmafneg", "vmaf-neg", "vmaf_neg_hmn"],
            Self::Vmaf => &[],
            Self::Ssim => &[],
            Self::Psnr => &["psnr_db"],
        }
    }

    /// Look up a metric by column name or alias (case-insensitive).
    #[must_use]
    pub fn from_column(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.column() == name || m.aliases().contains(&name.as_str()))
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Metric {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_column(s).ok_or_else(|| Error::InvalidConfig(format!("unknown metric '{s}'")))
    }
}

/// Per-frame samples of one metric for one (source, distorted) pair.
///
/// Never empty. Frame order is preserved for traceability even though
/// aggregation ignores it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct MetricSeries {
    samples: Vec<f64>,
}

impl MetricSeries {
    /// Wrap samples, rejecting an empty vector.
    pub fn new(samples: Vec<f64>) -> Result<Self> {
        if samples.is_empty() {
            return Err(Error::EmptySeries);
        }
        Ok(Self { samples })
    }

    /// Samples in frame order.
    #[must_use]
    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    /// Number of samples (always at least one).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always `false`; present for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Apply a per-sample transform, keeping frame order.
    #[must_use]
    pub fn map(&self, f: impl Fn(f64) -> f64) -> Self {
        Self {
            samples: self.samples.iter().map(|&x| f(x)).collect(),
        }
    }

    /// Summary statistics.
    #[must_use]
    pub fn aggregate(&self, method: PercentileMethod) -> AggregateStats {
        AggregateStats::compute(self, method)
    }
}

impl TryFrom<Vec<f64>> for MetricSeries {
    type Error = Error;

    fn try_from(samples: Vec<f64>) -> Result<Self> {
        Self::new(samples)
    }
}

impl From<MetricSeries> for Vec<f64> {
    fn from(series: MetricSeries) -> Self {
        series.samples
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_columns_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_column(metric.column()), Some(metric));
        }
        assert_eq!(Metric::from_column("SSIMULACRA2"), Some(Metric::Ssimulacra2));
        assert_eq!(Metric::from_column("W_XPSNR"), Some(Metric::WeightedXpsnr));
        assert_eq!(Metric::from_column("bitrate"), None);
    }

    #[test]
    fn test_metric_direction() {
        assert_eq!(Metric::ButteraugliDistance.direction(), QualityDirection::LowerIsBetter);
        assert_eq!(Metric::Vmaf.direction(), QualityDirection::HigherIsBetter);
        assert_eq!(Metric::VmafNeg.bd_column(), "vmaf_neg_bd");
    }

    #[test]
    fn test_metric_serde_uses_column_names() {
        for metric in Metric::ALL {
            let json = serde_json::to_string(&metric).unwrap();
            assert_eq!(json, format!("\"{}\"", metric.column()));
        }
    }

    #[test]
    fn test_series_rejects_empty() {
        assert!(matches!(MetricSeries::new(Vec::new()), Err(Error::EmptySeries)));
        assert!(serde_json::from_str::<MetricSeries>("[]").is_err());
    }

    #[test]
    fn test_series_preserves_order() {
        let series = MetricSeries::new(vec![3.0, 1.0, 2.0]).unwrap();
        assert_eq!(series.samples(), &[3.0, 1.0, 2.0]);
        assert_eq!(series.map(|x| x * 2.0).samples(), &[6.0, 2.0, 4.0]);

        let stats = series.aggregate(PercentileMethod::NearestRank);
        assert_eq!(stats.min, 1.0);
        assert_eq!(series.samples(), &[3.0, 1.0, 2.0]);
    }
}
