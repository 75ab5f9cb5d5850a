//! Numerical integration of uniformly sampled curves.

/// Composite Simpson's rule for samples spaced `dx` apart.
///
/// For an odd sample count this is the textbook composite rule. For an even
/// count, Simpson's rule covers all but the last interval, and the last
/// interval uses Cartwright's three-point correction, which keeps the
/// result exact for quadratics. Two samples fall back to the trapezoid.
///
/// Returns `0.0` for fewer than two samples.
///
/// # Example
///
/// ```
/// use video_eval::stats::integrate::simpson;
///
/// // ∫₀² x² dx = 8/3, sampled at 0, 0.5, 1, 1.5, 2
/// let y: Vec<f64> = (0..5).map(|i| (i as f64 * 0.5).powi(2)).collect();
/// assert!((simpson(&y, 0.5) - 8.0 / 3.0).abs() < 1e-12);
/// ```
#[must_use]
pub fn simpson(y: &[f64], dx: f64) -> f64 {
    let n = y.len();
    match n {
        0 | 1 => 0.0,
        2 => 0.5 * dx * (y[0] + y[1]),
        _ if n % 2 == 1 => basic_simpson(y, dx),
        _ => {
            let head = basic_simpson(&y[..n - 1], dx);
            // Cartwright weights for equal spacing: 5/12, 2/3, -1/12
            let tail = dx * (5.0 / 12.0 * y[n - 1] + 2.0 / 3.0 * y[n - 2] - 1.0 / 12.0 * y[n - 3]);
            head + tail
        }
    }
}

/// Simpson's rule over an odd number of samples.
fn basic_simpson(y: &[f64], dx: f64) -> f64 {
    debug_assert!(y.len() % 2 == 1);
    let sum: f64 = y
        .windows(3)
        .step_by(2)
        .map(|w| w[0] + 4.0 * w[1] + w[2])
        .sum();
    sum * dx / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(f: impl Fn(f64) -> f64, lo: f64, hi: f64, n: usize) -> (Vec<f64>, f64) {
        let dx = (hi - lo) / (n - 1) as f64;
        ((0..n).map(|i| f(lo + dx * i as f64)).collect(), dx)
    }

    #[test]
    fn test_constant_is_exact() {
        for n in [3, 4, 99, 100] {
            let (y, dx) = sample(|_| 2.5, 10.0, 30.0, n);
            assert!((simpson(&y, dx) - 50.0).abs() < 1e-9, "n={n}");
        }
    }

    #[test]
    fn test_quadratic_even_count() {
        // ∫₀³ (x² + 1) dx = 12
        let (y, dx) = sample(|x| x * x + 1.0, 0.0, 3.0, 100);
        assert!((simpson(&y, dx) - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_cubic_odd_count() {
        // Simpson is exact for cubics: ∫₀² x³ dx = 4
        let (y, dx) = sample(|x| x.powi(3), 0.0, 2.0, 11);
        assert!((simpson(&y, dx) - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_smooth_function() {
        let (y, dx) = sample(f64::sin, 0.0, std::f64::consts::PI, 100);
        assert!((simpson(&y, dx) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_lengths() {
        assert_eq!(simpson(&[], 1.0), 0.0);
        assert_eq!(simpson(&[3.0], 1.0), 0.0);
        assert!((simpson(&[1.0, 3.0], 2.0) - 4.0).abs() < 1e-12);
    }
}
