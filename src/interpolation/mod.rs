//! Shape-preserving piecewise-cubic interpolation.
//!
//! Quality sweeps produce only a handful of points per curve, and an
//! ordinary cubic spline overshoots between them. [`Pchip`] fits a cubic
//! Hermite polynomial per interval with derivatives chosen so the
//! interpolant is monotone wherever the data is.
//!
//! ## Methodology
//!
//! Derivatives follow Fritsch-Butland as used by SciPy's `PchipInterpolator`:
//!
//! 1. Interior knots take the weighted harmonic mean of the adjacent secant
//!    slopes, or zero where those slopes change sign (a local extremum).
//! 2. End knots use a one-sided three-point estimate, clipped so it keeps
//!    the sign of the first secant and stays within three times its size.
//! 3. Two-point inputs degenerate to a straight line.

use crate::error::{Error, Result};

/// Monotone piecewise-cubic Hermite interpolant.
#[derive(Debug, Clone)]
pub struct Pchip {
    x: Vec<f64>,
    y: Vec<f64>,
    d: Vec<f64>,
}

impl Pchip {
    /// Fit an interpolant through `(x[i], y[i])`.
    ///
    /// `x` must be strictly increasing and all values finite. At least two
    /// points are required.
    pub fn new(x: &[f64], y: &[f64]) -> Result<Self> {
        if x.len() != y.len() {
            return Err(Error::NumericInstability(format!(
                "x and y lengths differ ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        if x.len() < 2 {
            return Err(Error::NumericInstability(format!(
                "interpolation needs at least 2 points, got {}",
                x.len()
            )));
        }
        if x.iter().chain(y).any(|v| !v.is_finite()) {
            return Err(Error::NumericInstability("non-finite interpolation input".to_string()));
        }
        if let Some(w) = x.windows(2).find(|w| w[1] <= w[0]) {
            return Err(Error::NumericInstability(format!(
                "x must be strictly increasing ({} then {})",
                w[0], w[1]
            )));
        }

        let d = derivatives(x, y);
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            d,
        })
    }

    /// Evaluate at `t`. Points outside the knot range extrapolate with the
    /// first or last cubic piece.
    #[must_use]
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.x.len();
        // Interval k such that x[k] <= t < x[k+1], clamped to [0, n-2]
        let k = self.x.partition_point(|&xi| xi <= t).saturating_sub(1).min(n - 2);

        let h = self.x[k + 1] - self.x[k];
        let s = (t - self.x[k]) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * self.y[k] + h10 * h * self.d[k] + h01 * self.y[k + 1] + h11 * h * self.d[k + 1]
    }

    /// Evaluate at every point of `ts`.
    #[must_use]
    pub fn evaluate_many(&self, ts: &[f64]) -> Vec<f64> {
        ts.iter().map(|&t| self.evaluate(t)).collect()
    }

    /// Knot derivatives, mainly for diagnostics.
    #[must_use]
    pub fn derivatives(&self) -> &[f64] {
        &self.d
    }
}

/// `n` evenly spaced values from `lo` to `hi` inclusive, and their spacing.
#[must_use]
pub fn linspace(lo: f64, hi: f64, n: usize) -> (Vec<f64>, f64) {
    match n {
        0 => (Vec::new(), 0.0),
        1 => (vec![lo], 0.0),
        _ => {
            let step = (hi - lo) / (n - 1) as f64;
            let mut out: Vec<f64> = (0..n).map(|i| lo + step * i as f64).collect();
            out[n - 1] = hi;
            (out, step)
        }
    }
}

fn derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let m: Vec<f64> = y
        .windows(2)
        .zip(&h)
        .map(|(w, hk)| (w[1] - w[0]) / hk)
        .collect();

    if n == 2 {
        return vec![m[0], m[0]];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        let (m0, m1) = (m[k - 1], m[k]);
        if m0 == 0.0 || m1 == 0.0 || m0.signum() != m1.signum() {
            continue;
        }
        let w1 = 2.0 * h[k] + h[k - 1];
        let w2 = h[k] + 2.0 * h[k - 1];
        d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
    }

    d[0] = edge_derivative(h[0], h[1], m[0], m[1]);
    d[n - 1] = edge_derivative(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
    d
}

/// One-sided three-point end slope, shape-preserving.
fn edge_derivative(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_knots() {
        let x = [10.0, 20.0, 35.0, 40.0];
        let y = [6.9, 7.6, 8.0, 8.3];
        let p = Pchip::new(&x, &y).unwrap();
        for (xi, yi) in x.iter().zip(&y) {
            assert!((p.evaluate(*xi) - yi).abs() < 1e-12);
        }
    }

    #[test]
    fn test_two_points_is_linear() {
        let p = Pchip::new(&[0.0, 4.0], &[1.0, 9.0]).unwrap();
        assert!((p.evaluate(1.0) - 3.0).abs() < 1e-12);
        assert!((p.evaluate(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_linear_data_is_reproduced() {
        let x = [1.0, 2.0, 4.0, 7.0, 8.0];
        let y: Vec<f64> = x.iter().map(|v| 3.0 * v - 2.0).collect();
        let p = Pchip::new(&x, &y).unwrap();
        for t in [1.5, 3.0, 5.5, 7.9] {
            assert!((p.evaluate(t) - (3.0 * t - 2.0)).abs() < 1e-9, "t={t}");
        }
    }

    #[test]
    fn test_monotone_without_overshoot() {
        // Step-like data that makes a natural spline ring
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.0, 0.0, 1.0, 1.0, 1.0];
        let p = Pchip::new(&x, &y).unwrap();

        let (ts, _) = linspace(0.0, 4.0, 200);
        let vs = p.evaluate_many(&ts);
        for w in vs.windows(2) {
            assert!(w[1] >= w[0] - 1e-12);
        }
        assert!(vs.iter().all(|v| (-1e-12..=1.0 + 1e-12).contains(v)));
    }

    #[test]
    fn test_decreasing_data() {
        let x = [0.5, 1.0, 2.0, 4.0];
        let y = [9.0, 8.0, 7.5, 7.4];
        let p = Pchip::new(&x, &y).unwrap();
        let (ts, _) = linspace(0.5, 4.0, 50);
        let vs = p.evaluate_many(&ts);
        for w in vs.windows(2) {
            assert!(w[1] <= w[0] + 1e-12);
        }
    }

    #[test]
    fn test_local_extremum_has_flat_derivative() {
        let p = Pchip::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap();
        assert_eq!(p.derivatives()[1], 0.0);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Pchip::new(&[1.0], &[1.0]).is_err());
        assert!(Pchip::new(&[1.0, 1.0, 2.0], &[1.0, 2.0, 3.0]).is_err());
        assert!(Pchip::new(&[2.0, 1.0], &[1.0, 2.0]).is_err());
        assert!(Pchip::new(&[1.0, f64::NAN], &[1.0, 2.0]).is_err());
        assert!(Pchip::new(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_linspace() {
        let (v, step) = linspace(10.0, 20.0, 5);
        assert_eq!(v, vec![10.0, 12.5, 15.0, 17.5, 20.0]);
        assert!((step - 2.5).abs() < 1e-12);
        assert_eq!(linspace(1.0, 2.0, 1).0, vec![1.0]);
    }
}
