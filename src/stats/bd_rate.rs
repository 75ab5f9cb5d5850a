//! Bjontegaard Delta Rate.
//!
//! BD-Rate measures the average bitrate difference between two
//! rate-distortion curves at equal quality. Each curve is fitted as
//! distortion → ln(rate) with a monotone cubic ([`Pchip`]), both fits are
//! sampled on a common grid over the overlapping distortion range, and the
//! areas under them are compared with Simpson's rule. Working in log-rate
//! makes the result a ratio: -10% means a 10% smaller file at the same
//! quality, whatever the absolute bitrate.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::interpolation::{Pchip, linspace};
use crate::stats::curve::RateDistortionCurve;
use crate::stats::integrate::simpson;

/// Tuning knobs for BD-Rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BdRateConfig {
    /// Number of evenly spaced grid points over the overlap.
    pub samples: usize,
    /// Value substituted for `+inf` distortion (e.g. PSNR of identical frames).
    pub inf_clamp: f64,
}

impl Default for BdRateConfig {
    fn default() -> Self {
        Self {
            samples: 100,
            inf_clamp: 100.0,
        }
    }
}

/// BD-Rate of `test` against `reference`, in percent.
///
/// Negative means `test` reaches the same distortion at a lower rate.
/// Degenerate input (empty or single-point curves, disjoint distortion
/// ranges, duplicate distortions, non-finite intermediates) yields `0.0`;
/// use [`try_bd_rate`] to tell those cases apart from a real zero.
///
/// # Example
///
/// ```
/// use video_eval::stats::{bd_rate, RateDistortionCurve};
///
/// let curve = RateDistortionCurve::from_points([
///     (1000.0, 10.0),
///     (2000.0, 20.0),
///     (3000.0, 30.0),
///     (4000.0, 40.0),
/// ])
/// .unwrap();
/// assert!(bd_rate(&curve, &curve).abs() < 1e-6);
/// ```
#[must_use]
pub fn bd_rate(reference: &RateDistortionCurve, test: &RateDistortionCurve) -> f64 {
    bd_rate_with(reference, test, &BdRateConfig::default())
}

/// [`bd_rate`] with explicit configuration.
#[must_use]
pub fn bd_rate_with(
    reference: &RateDistortionCurve,
    test: &RateDistortionCurve,
    config: &BdRateConfig,
) -> f64 {
    match try_bd_rate(reference, test, config) {
        Ok(rate) => rate,
        Err(e) => {
            tracing::debug!("BD-Rate unavailable, reporting 0.0: {e}");
            0.0
        }
    }
}

/// BD-Rate of `test` against `reference`, reporting why a comparison is
/// impossible instead of returning `0.0`.
pub fn try_bd_rate(
    reference: &RateDistortionCurve,
    test: &RateDistortionCurve,
    config: &BdRateConfig,
) -> Result<f64> {
    if reference.is_empty() || test.is_empty() {
        return Err(Error::EmptyCurve);
    }
    if config.samples < 2 {
        return Err(Error::InvalidConfig(format!(
            "BD-Rate needs at least 2 samples, got {}",
            config.samples
        )));
    }

    let (d1, r1) = prepare(reference, config.inf_clamp)?;
    let (d2, r2) = prepare(test, config.inf_clamp)?;

    let lo = min_of(&d1).max(min_of(&d2));
    let hi = max_of(&d1).min(max_of(&d2));
    if hi <= lo {
        return Err(Error::NonOverlappingRange { lo, hi });
    }

    let (grid, dx) = linspace(lo, hi, config.samples);
    let v1 = Pchip::new(&d1, &r1)?.evaluate_many(&grid);
    let v2 = Pchip::new(&d2, &r2)?.evaluate_many(&grid);

    let int_v1 = simpson(&v1, dx);
    let int_v2 = simpson(&v2, dx);

    let avg_diff = (int_v2 - int_v1) / (hi - lo);
    let result = (avg_diff.exp() - 1.0) * 100.0;

    if !result.is_finite() {
        return Err(Error::NumericInstability(format!(
            "non-finite BD-Rate (int_ref={int_v1}, int_test={int_v2})"
        )));
    }
    Ok(result)
}

/// Distortions (with `+inf` clamped) and log-rates of a curve.
fn prepare(curve: &RateDistortionCurve, inf_clamp: f64) -> Result<(Vec<f64>, Vec<f64>)> {
    let distortions = curve.distortions();
    debug_assert!(distortions.windows(2).all(|w| w[0].total_cmp(&w[1]).is_le()));

    let distortions: Vec<f64> = distortions
        .into_iter()
        .map(|d| if d == f64::INFINITY { inf_clamp } else { d })
        .collect();

    if let Some(bad) = distortions.iter().find(|d| !d.is_finite()) {
        return Err(Error::NumericInstability(format!("non-finite distortion {bad}")));
    }
    Ok((distortions, curve.log_rates()))
}

fn min_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(points: &[(f64, f64)]) -> RateDistortionCurve {
        RateDistortionCurve::from_points(points.iter().copied()).unwrap()
    }

    fn scaled(points: &[(f64, f64)], k: f64) -> RateDistortionCurve {
        curve(&points.iter().map(|&(r, d)| (r * k, d)).collect::<Vec<_>>())
    }

    const SWEEP: [(f64, f64); 4] = [(1000.0, 10.0), (2000.0, 20.0), (3000.0, 30.0), (4000.0, 40.0)];

    #[test]
    fn test_bd_rate_same_curve() {
        let c = curve(&SWEEP);
        let bd = bd_rate(&c, &c.clone());
        assert!(bd.abs() < 1e-6, "bd={bd}");
    }

    #[test]
    fn test_bd_rate_scaled_curves() {
        let base = [(1000.0, 10.0), (2000.0, 20.0), (3000.0, 30.0)];
        let a = curve(&base);
        let b = scaled(&base, 2.0);

        // b spends twice the rate for the same distortion
        let worse = bd_rate(&a, &b);
        assert!((worse - 100.0).abs() < 0.5, "worse={worse}");

        // and a needs half of b's rate: (1/k - 1) * 100
        let better = bd_rate(&b, &a);
        assert!((better + 50.0).abs() < 0.5, "better={better}");
    }

    #[test]
    fn test_bd_rate_lower_is_better_metric() {
        // Distance-style metric: distortion falls as rate grows
        let base = [(1000.0, 3.0), (2000.0, 2.1), (4000.0, 1.4), (8000.0, 0.9)];
        let bd = bd_rate(&curve(&base), &scaled(&base, 0.8));
        assert!((bd + 20.0).abs() < 0.5, "bd={bd}");
    }

    #[test]
    fn test_bd_rate_partial_overlap() {
        // ln(rate) linear in distortion, so the fit is exact
        let a: Vec<(f64, f64)> =
            (1..=4).map(|i| (f64::from(i).exp(), f64::from(i) * 10.0)).collect();
        let b: Vec<(f64, f64)> =
            (2..=5).map(|i| (1.1 * f64::from(i).exp(), f64::from(i) * 10.0)).collect();

        let bd = try_bd_rate(&curve(&a), &curve(&b), &BdRateConfig::default()).unwrap();
        assert!((bd - 10.0).abs() < 1e-6, "bd={bd}");
    }

    #[test]
    fn test_bd_rate_disjoint_ranges() {
        let a = curve(&[(1000.0, 10.0), (2000.0, 20.0)]);
        let b = curve(&[(1000.0, 30.0), (2000.0, 40.0)]);

        assert_eq!(bd_rate(&a, &b), 0.0);
        assert!(matches!(
            try_bd_rate(&a, &b, &BdRateConfig::default()),
            Err(Error::NonOverlappingRange { .. })
        ));
    }

    #[test]
    fn test_bd_rate_single_point() {
        let single = curve(&[(1500.0, 25.0)]);
        let full = curve(&SWEEP);
        assert_eq!(bd_rate(&single, &full), 0.0);
        assert_eq!(bd_rate(&full, &single), 0.0);
        assert_eq!(bd_rate(&single, &single), 0.0);
    }

    #[test]
    fn test_bd_rate_empty_curve() {
        let empty = RateDistortionCurve::new();
        let full = curve(&SWEEP);
        assert_eq!(bd_rate(&empty, &full), 0.0);
        assert!(matches!(
            try_bd_rate(&full, &empty, &BdRateConfig::default()),
            Err(Error::EmptyCurve)
        ));
    }

    #[test]
    fn test_bd_rate_duplicate_distortion() {
        let dup = curve(&[(1000.0, 10.0), (1500.0, 20.0), (2000.0, 20.0), (3000.0, 40.0)]);
        let full = curve(&SWEEP);
        assert_eq!(bd_rate(&dup, &full), 0.0);
        assert!(matches!(
            try_bd_rate(&dup, &full, &BdRateConfig::default()),
            Err(Error::NumericInstability(_))
        ));
    }

    #[test]
    fn test_bd_rate_infinite_distortion_clamped() {
        let a = curve(&[(1000.0, 80.0), (2000.0, 90.0), (4000.0, f64::INFINITY)]);
        let b = curve(&[(900.0, 80.0), (1800.0, 90.0), (3600.0, f64::INFINITY)]);

        let bd = try_bd_rate(&a, &b, &BdRateConfig::default()).unwrap();
        assert!((bd + 10.0).abs() < 0.5, "bd={bd}");
    }

    #[test]
    fn test_bd_rate_nan_distortion() {
        let a = curve(&[(1000.0, 10.0), (2000.0, f64::NAN)]);
        assert_eq!(bd_rate(&a, &curve(&SWEEP)), 0.0);
    }

    #[test]
    fn test_bd_rate_antisymmetric_in_log_domain() {
        let a = curve(&SWEEP);
        let b = curve(&[(900.0, 12.0), (1900.0, 21.0), (2600.0, 33.0), (3500.0, 38.0)]);

        let ab = bd_rate(&a, &b) / 100.0 + 1.0;
        let ba = bd_rate(&b, &a) / 100.0 + 1.0;
        assert!((ab * ba - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_bd_rate_rejects_tiny_grid() {
        let c = curve(&SWEEP);
        let config = BdRateConfig {
            samples: 1,
            ..BdRateConfig::default()
        };
        assert!(try_bd_rate(&c, &c, &config).is_err());
    }
}
