//! Aggregated scores for one distorted video.

use serde::{Deserialize, Serialize};

use crate::metrics::{ButteraugliSummary, Metric, MetricSeries, XpsnrPlanes};
use crate::stats::{AggregateStats, PercentileMethod};

use super::sweep::SweepRow;

/// Everything measured for one (source, distorted) pair.
///
/// Metrics that were not run stay `None` and are left out of the sweep row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoScores {
    /// SSIMULACRA2 per-frame statistics.
    pub ssimulacra2: Option<AggregateStats>,

    /// Butteraugli distances and their perceptual remap.
    pub butteraugli: Option<ButteraugliSummary>,

    /// Per-plane XPSNR.
    pub xpsnr: Option<XpsnrPlanes>,

    /// Harmonic mean of VMAF NEG.
    pub vmaf_neg: Option<f64>,

    pub vmaf: Option<f64>,
    pub ssim: Option<f64>,
    pub psnr: Option<f64>,
}

impl VideoScores {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate per-frame SSIMULACRA2 scores.
    #[must_use]
    pub fn with_ssimulacra2(mut self, samples: &MetricSeries, method: PercentileMethod) -> Self {
        self.ssimulacra2 = Some(samples.aggregate(method));
        self
    }

    /// Summarize per-frame Butteraugli distances.
    #[must_use]
    pub fn with_butteraugli(mut self, distances: &MetricSeries, method: PercentileMethod) -> Self {
        self.butteraugli = Some(ButteraugliSummary::from_distances(distances, method));
        self
    }

    /// Record per-plane XPSNR. The all-zero sentinel counts as not measured.
    #[must_use]
    pub fn with_xpsnr(mut self, planes: XpsnrPlanes) -> Self {
        self.xpsnr = (!planes.is_missing()).then_some(planes);
        self
    }

    #[must_use]
    pub fn with_vmaf_neg(mut self, value: f64) -> Self {
        self.vmaf_neg = Some(value);
        self
    }

    #[must_use]
    pub fn with_vmaf(mut self, value: f64) -> Self {
        self.vmaf = Some(value);
        self
    }

    #[must_use]
    pub fn with_ssim(mut self, value: f64) -> Self {
        self.ssim = Some(value);
        self
    }

    #[must_use]
    pub fn with_psnr(mut self, value: f64) -> Self {
        self.psnr = Some(value);
        self
    }

    /// Luma-weighted XPSNR at `peak`.
    #[must_use]
    pub fn weighted_xpsnr(&self, peak: u32) -> Option<f64> {
        self.xpsnr.map(|p| p.weighted(peak))
    }

    /// The scalar that goes into a sweep-table column.
    ///
    /// SSIMULACRA2 reports its mean and Butteraugli its mean raw distance.
    #[must_use]
    pub fn metric_value(&self, metric: Metric, peak: u32) -> Option<f64> {
        match metric {
            Metric::Ssimulacra2 => self.ssimulacra2.map(|s| s.average),
            Metric::ButteraugliDistance => self.butteraugli.map(|b| b.distance),
            Metric::WeightedXpsnr => self.weighted_xpsnr(peak),
            Metric::VmafNeg => self.vmaf_neg,
            Metric::Vmaf => self.vmaf,
            Metric::Ssim => self.ssim,
            Metric::Psnr => self.psnr,
        }
    }

    /// Build the sweep row for this video at quality `q`.
    #[must_use]
    pub fn to_row(
        &self,
        q: impl Into<String>,
        encode_time: Option<f64>,
        output_filesize: u64,
        peak: u32,
    ) -> SweepRow {
        let mut row = SweepRow::new(q, output_filesize);
        row.encode_time = encode_time;
        for metric in Metric::ALL {
            if let Some(value) = self.metric_value(metric, peak) {
                row.metrics.insert(metric, value);
            }
        }
        row
    }

    /// Print the per-metric breakdown to stdout.
    pub fn print_summary(&self, name: &str, peak: u32) {
        println!("Scores for {}", name);
        println!("{:-<40}", "");

        if let Some(s) = &self.ssimulacra2 {
            println!("SSIMULACRA2 ({} frames):", s.count);
            print_stats(s);
        }

        if let Some(b) = &self.butteraugli {
            println!("Butteraugli:");
            println!("  {:<15} {:>12.5}", "Distance:", b.distance);
            println!("  {:<15} {:>12.5}", "Max Distance:", b.max_distance);
            println!("Video Butteraugli ({} frames):", b.perceptual.count);
            print_stats(&b.perceptual);
        }

        if let Some(p) = &self.xpsnr {
            println!("XPSNR:");
            println!("  {:<15} {:>12.5}", "Y:", p.y);
            println!("  {:<15} {:>12.5}", "U:", p.u);
            println!("  {:<15} {:>12.5}", "V:", p.v);
            println!("  {:<15} {:>12.5}", "W-XPSNR:", p.weighted(peak));
        }

        for (label, value) in [
            ("VMAF NEG:", self.vmaf_neg),
            ("VMAF:", self.vmaf),
            ("SSIM:", self.ssim),
            ("PSNR:", self.psnr),
        ] {
            if let Some(v) = value {
                println!("{:<17} {:>12.5}", label, v);
            }
        }
    }
}

fn print_stats(stats: &AggregateStats) {
    println!("  {:<15} {:>12.5}", "Average:", stats.average);
    println!("  {:<15} {:>12.5}", "Harmonic Mean:", stats.harmonic_mean);
    println!("  {:<15} {:>12.5}", "Std Deviation:", stats.std_dev);
    println!("  {:<15} {:>12.5}", "10th Pctile:", stats.p10);
}
