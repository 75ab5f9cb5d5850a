//! Weighted XPSNR.
//!
//! XPSNR is reported per colour plane. Planes are combined in the MSE
//! domain with 4:2:0 weighting (luma counts four times) and converted back
//! to decibels.

use serde::{Deserialize, Serialize};

/// Peak value for 8-bit samples.
pub const DEFAULT_PEAK: u32 = 255;

/// Convert PSNR in dB to mean squared error.
///
/// A PSNR of `0.0` is well defined here, but callers parsing external
/// reports often use `0.0` for "no data"; check [`XpsnrPlanes::is_missing`]
/// before trusting the result.
///
/// # Example
///
/// ```
/// use video_eval::metrics::psnr_to_mse;
///
/// assert!((psnr_to_mse(20.0, 255) - 650.25).abs() < 1e-9);
/// ```
#[must_use]
pub fn psnr_to_mse(psnr_db: f64, peak: u32) -> f64 {
    let peak = f64::from(peak);
    peak * peak / 10f64.powf(psnr_db / 10.0)
}

/// Combine per-plane PSNR into a single luma-weighted PSNR.
#[must_use]
pub fn weighted_xpsnr(psnr_y: f64, psnr_u: f64, psnr_v: f64, peak: u32) -> f64 {
    let mse_y = psnr_to_mse(psnr_y, peak);
    let mse_u = psnr_to_mse(psnr_u, peak);
    let mse_v = psnr_to_mse(psnr_v, peak);
    let mse_w = (4.0 * mse_y + mse_u + mse_v) / 6.0;

    let peak = f64::from(peak);
    10.0 * (peak * peak / mse_w).log10()
}

/// XPSNR for the three planes of a distorted video.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct XpsnrPlanes {
    pub y: f64,
    pub u: f64,
    pub v: f64,
}

impl XpsnrPlanes {
    #[must_use]
    pub fn new(y: f64, u: f64, v: f64) -> Self {
        Self { y, u, v }
    }

    /// All planes at the zero sentinel left by a failed report parse.
    #[must_use]
    pub fn is_missing(&self) -> bool {
        self.y == 0.0 && self.u == 0.0 && self.v == 0.0
    }

    /// Weighted XPSNR at the given peak value.
    #[must_use]
    pub fn weighted(&self, peak: u32) -> f64 {
        weighted_xpsnr(self.y, self.u, self.v, peak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psnr_to_mse() {
        assert!((psnr_to_mse(20.0, 255) - 650.25).abs() < 1e-9);
        assert!((psnr_to_mse(0.0, 255) - 65025.0).abs() < 1e-9);
        assert!((psnr_to_mse(10.0, 1023) - 104652.9).abs() < 1e-6);
    }

    #[test]
    fn test_equal_planes_round_trip() {
        for p in [20.0, 37.5, 48.123] {
            let w = weighted_xpsnr(p, p, p, DEFAULT_PEAK);
            assert!((w - p).abs() < 1e-9, "p={p} w={w}");
        }
    }

    #[test]
    fn test_luma_dominates() {
        // Chroma much better than luma: result stays close to luma
        let w = weighted_xpsnr(30.0, 45.0, 45.0, DEFAULT_PEAK);
        assert!(w > 30.0 && w < 32.0, "w={w}");

        let flipped = weighted_xpsnr(45.0, 30.0, 30.0, DEFAULT_PEAK);
        assert!(flipped > w);
    }

    #[test]
    fn test_planes() {
        let planes = XpsnrPlanes::new(40.0, 40.0, 40.0);
        assert!((planes.weighted(DEFAULT_PEAK) - 40.0).abs() < 1e-9);
        assert!(!planes.is_missing());
        assert!(XpsnrPlanes::default().is_missing());
    }
}
