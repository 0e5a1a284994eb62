//! Common

#![allow(dead_code)]

use super::clamp::*;
use num_traits::Num;
use std::ops::{Add, Mul, Neg};

/// Use 32-bit precision for floating point numbers.
pub type Float = f32;

/// Default signed integer to 32-bit.
pub type Int = i32;

/// Infinty (∞)
pub const INFINITY: Float = Float::INFINITY;

/// PI (π)
pub const PI: Float = std::f32::consts::PI;

/// 1/PI (1/π)
pub const INV_PI: Float = 1.0 / PI;

/// PI/2 (π/2)
pub const PI_OVER_TWO: Float = PI * 0.5;

/// PI/4 (π/4)
pub const PI_OVER_FOUR: Float = PI * 0.25;

/// 2*PI (2π)
pub const TWO_PI: Float = PI * 2.0;

/// 1/2*PI (1/2π)
pub const INV_TWO_PI: Float = 1.0 / TWO_PI;

/// 4*PI (4π)
pub const FOUR_PI: Float = PI * 4.0;

/// 1/4*PI (1/4π)
pub const INV_FOUR_PI: Float = 1.0 / FOUR_PI;

/// sqrt(2)
pub const SQRT_2: Float = std::f32::consts::SQRT_2;

/// Machine Epsilon
pub const MACHINE_EPSILON: Float = std::f32::EPSILON * 0.5;

/// Returns the absolute value of a number.
///
/// * `n` - The number.
#[inline(always)]
pub fn abs<T>(n: T) -> T
where
    T: Num + Neg<Output = T> + PartialOrd + Copy,
{
    if n < T::zero() {
        -n
    } else {
        n
    }
}

/// Returns the minimum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn min<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a < b {
        a
    } else {
        b
    }
}

/// Returns the maximum of 2 numbers.
///
/// * `a` - First number.
/// * `b` - Second number.
#[inline(always)]
pub fn max<T>(a: T, b: T) -> T
where
    T: Num + PartialOrd + Copy,
{
    if a > b {
        a
    } else {
        b
    }
}

/// Returns the square of a number.
///
/// * `v` - The number.
#[inline(always)]
pub fn sqr<T>(v: T) -> T
where
    T: Mul<T, Output = T> + Copy,
{
    v * v
}

/// Linearly interpolate between two points for parameters in [0, 1] and
/// extrapolate for parameters outside that interval.
///
/// * `t` - Parameter.
/// * `p0` - Point at t=0.
/// * `p1` - Point at t=1.
#[inline(always)]
pub fn lerp<P>(t: Float, p0: P, p1: P) -> P
where
    Float: Mul<P, Output = P>,
    P: Add<P, Output = P>,
{
    (1.0 - t) * p0 + t * p1
}

/// Square root that clamps slightly negative round-off to zero.
///
/// * `x` - The value.
#[inline(always)]
pub fn safe_sqrt(x: Float) -> Float {
    debug_assert!(x >= -1e-3);
    max(0.0, x).sqrt()
}

/// Arc sine with the argument clamped to [-1, 1].
///
/// * `x` - The value.
#[inline(always)]
pub fn safe_asin(x: Float) -> Float {
    debug_assert!((-1.0001..=1.0001).contains(&x));
    clamp(x, -1.0, 1.0).asin()
}

/// Arc cosine with the argument clamped to [-1, 1].
///
/// * `x` - The value.
#[inline(always)]
pub fn safe_acos(x: Float) -> Float {
    debug_assert!((-1.0001..=1.0001).contains(&x));
    clamp(x, -1.0, 1.0).acos()
}

/// Convert degrees to radians.
///
/// * `deg` - Angle in degrees.
#[inline(always)]
pub fn radians(deg: Float) -> Float {
    (PI / 180.0) * deg
}

/// Convert radians to degrees.
///
/// * `rad` - Angle in radians.
#[inline(always)]
pub fn degrees(rad: Float) -> Float {
    (180.0 / PI) * rad
}

/// Evaluates a polynomial with the given coefficients (lowest order first)
/// using Horner's rule.
///
/// * `t` - The variable.
/// * `c` - Coefficients.
#[inline]
pub fn evaluate_polynomial(t: Float, c: &[Float]) -> Float {
    c.iter().rev().fold(0.0, |acc, &ci| acc.mul_add(t, ci))
}

/// Bump a floating point value down to the next lower representable floating
/// point value.
///
/// * `v` - Floating point value.
pub fn next_float_down(v: Float) -> Float {
    // Handle infinity and positive zero for next_float_down
    if v.is_infinite() && v < 0.0 {
        return v;
    }

    // Advance v to next lower float
    let nv = if v == 0.0 { -0.0 } else { v };
    let ui = nv.to_bits();
    let ui = if nv > 0.0 { ui - 1 } else { ui + 1 };
    Float::from_bits(ui)
}

/// Emulates the behavior of `upper_bound` but uses a function object to get
/// values at various indices instead of requiring access to an actual array.
/// It is used to bisect arrays that are procedurally generated such as those
/// interpolated from point samples.
///
/// * `size` - Size of array.
/// * `pred` - Function that returns a value at a given index.
pub fn find_interval<Predicate>(size: usize, pred: Predicate) -> usize
where
    Predicate: Fn(usize) -> bool,
{
    let (mut first, mut len) = (1, size.saturating_sub(2));

    while len > 0 {
        let half = len >> 1;
        let middle = first + half;

        // Bisect range based on value of `pred` at `middle`.
        if pred(middle) {
            first = middle + 1;
            len -= half + 1;
        } else {
            len = half;
        }
    }

    clamp(first as isize - 1, 0, size as isize - 2) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn find_interval_brackets_value() {
        let v = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(find_interval(v.len(), |i| v[i] <= 2.5), 2);
        assert_eq!(find_interval(v.len(), |i| v[i] <= -1.0), 0);
        assert_eq!(find_interval(v.len(), |i| v[i] <= 10.0), 3);
    }

    #[test]
    fn polynomial_horner() {
        // 1 + 2t + 3t^2 at t = 2.
        assert!(approx_eq!(
            Float,
            evaluate_polynomial(2.0, &[1.0, 2.0, 3.0]),
            17.0,
            epsilon = 0.00001
        ));
    }

    #[test]
    fn next_float_down_is_smaller() {
        assert!(next_float_down(1.0) < 1.0);
        assert!(next_float_down(0.0) < 0.0);
    }

    #[test]
    fn safe_functions_clamp() {
        assert_eq!(safe_sqrt(-1e-5), 0.0);
        assert!(approx_eq!(Float, safe_asin(1.00001), PI_OVER_TWO, epsilon = 0.00001));
        assert!(approx_eq!(Float, safe_acos(1.00001), 0.0, epsilon = 0.00001));
    }
}
