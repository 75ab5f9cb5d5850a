//! Butteraugli distance handling.
//!
//! Butteraugli is a perceptual distance: lower is better and it is
//! unbounded above. For per-frame video statistics the distance is remapped
//! to a bounded, higher-is-better "video Butteraugli" score so it aggregates
//! the same way as SSIMULACRA2.
//!
//! Distance interpretation:
//! - < 1.0: Imperceptible difference
//! - < 2.0: Marginal difference
//! - < 3.0: Subtle difference
//! - < 5.0: Noticeable difference
//! - >= 5.0: Degraded

use serde::{Deserialize, Serialize};

use crate::metrics::MetricSeries;
use crate::stats::{AggregateStats, PercentileMethod, mean};

/// Offset that places the zero crossing of the perceptual score.
///
/// Historical results depend on this exact value (≈ log10(20)); do not
/// replace it with a computed logarithm.
pub const VBUTTER_OFFSET: f64 = 1.30103;

/// Map a Butteraugli distance to a "video Butteraugli" score.
///
/// Distance `0.0` maps to exactly `100.0`. For positive distances the score
/// decreases strictly and logarithmically: about 95.9 at distance 0.2,
/// 69.9 at distance 2, and 0 near distance 18.
///
/// # Example
///
/// ```
/// use video_eval::metrics::butteraugli_to_perceptual;
///
/// assert_eq!(butteraugli_to_perceptual(0.0), 100.0);
/// assert!(butteraugli_to_perceptual(1.0) > butteraugli_to_perceptual(2.0));
/// ```
#[must_use]
pub fn butteraugli_to_perceptual(distance: f64) -> f64 {
    let vb = if distance == 0.0 {
        1.0
    } else {
        ((2.0 / (distance.abs() + 2.0)) * 200.0).log10() - VBUTTER_OFFSET
    };
    vb * 100.0
}

/// Aggregated Butteraugli results for one distorted video.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ButteraugliSummary {
    /// Mean raw distance over all frames.
    pub distance: f64,
    /// Worst (largest) frame distance.
    pub max_distance: f64,
    /// Statistics of the per-frame perceptual scores.
    pub perceptual: AggregateStats,
}

impl ButteraugliSummary {
    /// Summarize per-frame distances.
    #[must_use]
    pub fn from_distances(distances: &MetricSeries, method: PercentileMethod) -> Self {
        let samples = distances.samples();
        let max_distance = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let perceptual = distances.map(butteraugli_to_perceptual).aggregate(method);

        Self {
            distance: mean(samples),
            max_distance,
            perceptual,
        }
    }
}
