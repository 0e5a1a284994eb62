//! Special functions

use super::common::*;

/// Modified Bessel function of the first kind, order zero.
///
/// * `x` - The argument.
pub fn i0(x: Float) -> Float {
    let mut val: Float = 0.0;
    let mut x2i: Float = 1.0;
    let mut ifact: Float = 1.0;
    let mut i4: Float = 1.0;
    for i in 0..10 {
        if i > 1 {
            ifact *= i as Float;
        }
        val += x2i / (i4 * sqr(ifact));
        x2i *= x * x;
        i4 *= 4.0;
    }
    val
}

/// Natural log of `i0()`, using the asymptotic expansion for large arguments.
///
/// * `x` - The argument.
pub fn log_i0(x: Float) -> Float {
    if x > 12.0 {
        x + 0.5 * (-(TWO_PI.ln()) + (1.0 / x).ln() + 1.0 / (8.0 * x))
    } else {
        i0(x).ln()
    }
}

/// Logistic distribution density with scale `s`.
///
/// * `x` - The argument.
/// * `s` - Scale.
pub fn logistic(x: Float, s: Float) -> Float {
    let x = abs(x);
    (-x / s).exp() / (s * sqr(1.0 + (-x / s).exp()))
}

/// Logistic cumulative distribution function.
///
/// * `x` - The argument.
/// * `s` - Scale.
pub fn logistic_cdf(x: Float, s: Float) -> Float {
    1.0 / (1.0 + (-x / s).exp())
}

/// Logistic density normalized over the interval [a, b].
///
/// * `x` - The argument.
/// * `s` - Scale.
/// * `a` - Lower bound.
/// * `b` - Upper bound.
pub fn trimmed_logistic(x: Float, s: Float, a: Float, b: Float) -> Float {
    debug_assert!(a < b);
    logistic(x, s) / (logistic_cdf(b, s) - logistic_cdf(a, s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn i0_known_values() {
        assert!(approx_eq!(Float, i0(0.0), 1.0, epsilon = 0.00001));
        assert!(approx_eq!(Float, i0(1.0), 1.266066, epsilon = 0.0001));
    }

    #[test]
    fn log_i0_small_and_large() {
        assert!(approx_eq!(Float, log_i0(2.0), 2.2795853_f32.ln(), epsilon = 0.0001));
        assert!((log_i0(12.001) - log_i0(11.999)).abs() < 0.05);
    }

    #[test]
    fn trimmed_logistic_integrates_to_one() {
        let (s, a, b) = (0.5, -PI, PI);
        let n = 4096;
        let dx = (b - a) / n as Float;
        let sum: Float = (0..n)
            .map(|i| trimmed_logistic(a + (i as Float + 0.5) * dx, s, a, b) * dx)
            .sum();
        assert!(approx_eq!(Float, sum, 1.0, epsilon = 0.001));
    }
}
