//! Sampled Spectrum.

use super::N_SPECTRUM_SAMPLES;
use crate::pbrt::*;
use std::fmt;
use std::ops::{
    Add, AddAssign, Div, DivAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign,
};

/// SampledSpectrum holds the values of a spectral distribution at the
/// `N_SPECTRUM_SAMPLES` wavelengths of a `SampledWavelengths`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampledSpectrum {
    /// The sampled spectral values.
    c: [Float; N_SPECTRUM_SAMPLES],
}

impl SampledSpectrum {
    /// Spectrum with all values set to 0.
    pub const ZERO: Self = Self {
        c: [0.0; N_SPECTRUM_SAMPLES],
    };

    /// Spectrum with all values set to 1.
    pub const ONE: Self = Self {
        c: [1.0; N_SPECTRUM_SAMPLES],
    };

    /// Create a new `SampledSpectrum` with a constant value across all
    /// wavelengths.
    ///
    /// * `v` - Constant value.
    pub fn new(v: Float) -> Self {
        let ret = Self {
            c: [v; N_SPECTRUM_SAMPLES],
        };
        debug_assert!(!ret.has_nans());
        ret
    }

    /// Returns true if any sample is NaN.
    pub fn has_nans(&self) -> bool {
        self.c.iter().any(|v| v.is_nan())
    }

    /// Returns true if all samples are zero.
    pub fn is_black(&self) -> bool {
        self.c.iter().all(|v| *v == 0.0)
    }

    /// Returns true if any sample is non-zero.
    pub fn is_nonzero(&self) -> bool {
        !self.is_black()
    }

    /// Returns the largest sample value.
    pub fn max_component_value(&self) -> Float {
        self.c.iter().fold(self.c[0], |m, &v| max(m, v))
    }

    /// Returns the smallest sample value.
    pub fn min_component_value(&self) -> Float {
        self.c.iter().fold(self.c[0], |m, &v| min(m, v))
    }

    /// Returns the mean of the sample values.
    pub fn average(&self) -> Float {
        self.c.iter().sum::<Float>() / N_SPECTRUM_SAMPLES as Float
    }

    /// Apply a function to every sample.
    ///
    /// * `f` - The function.
    pub fn map<F: Fn(Float) -> Float>(&self, f: F) -> Self {
        let mut ret = *self;
        ret.c.iter_mut().for_each(|v| *v = f(*v));
        ret
    }

    /// Returns the square root of the samples.
    pub fn sqrt(&self) -> Self {
        self.map(|v| v.sqrt())
    }

    /// Returns e raised to each sample.
    pub fn exp(&self) -> Self {
        self.map(|v| v.exp())
    }

    /// Returns the squared samples.
    pub fn sqr(&self) -> Self {
        self.map(|v| v * v)
    }

    /// Clamp negative samples to zero.
    pub fn clamp_zero(&self) -> Self {
        self.map(|v| max(0.0, v))
    }

    /// Clamp the samples to [low, high].
    ///
    /// * `low`  - Low value.
    /// * `high` - High value.
    pub fn clamp(&self, low: Float, high: Float) -> Self {
        self.map(|v| clamp(v, low, high))
    }

    /// Componentwise division that yields 0 wherever the divisor is 0.
    ///
    /// * `d` - The divisor.
    pub fn safe_div(&self, d: &Self) -> Self {
        let mut ret = Self::ZERO;
        for i in 0..N_SPECTRUM_SAMPLES {
            ret.c[i] = if d.c[i] != 0.0 { self.c[i] / d.c[i] } else { 0.0 };
        }
        ret
    }
}

impl Default for SampledSpectrum {
    /// Return a black `SampledSpectrum`.
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<Float> for SampledSpectrum {
    /// Create a new `SampledSpectrum` with a constant value across all
    /// wavelengths.
    ///
    /// * `v` - Constant value.
    fn from(v: Float) -> Self {
        Self::new(v)
    }
}

impl From<[Float; N_SPECTRUM_SAMPLES]> for SampledSpectrum {
    /// Create a new `SampledSpectrum` from sample values.
    ///
    /// * `c` - Sample values.
    fn from(c: [Float; N_SPECTRUM_SAMPLES]) -> Self {
        let ret = Self { c };
        debug_assert!(!ret.has_nans());
        ret
    }
}

impl Index<usize> for SampledSpectrum {
    type Output = Float;

    fn index(&self, i: usize) -> &Self::Output {
        &self.c[i]
    }
}

impl IndexMut<usize> for SampledSpectrum {
    fn index_mut(&mut self, i: usize) -> &mut Self::Output {
        &mut self.c[i]
    }
}

macro_rules! componentwise {
    ($tr: ident, $f: ident, $tra: ident, $fa: ident, $op: tt) => {
        impl $tr for SampledSpectrum {
            type Output = SampledSpectrum;

            fn $f(self, other: Self) -> Self::Output {
                let mut ret = self;
                for i in 0..N_SPECTRUM_SAMPLES {
                    ret.c[i] = self.c[i] $op other.c[i];
                }
                ret
            }
        }

        impl $tr<Float> for SampledSpectrum {
            type Output = SampledSpectrum;

            fn $f(self, f: Float) -> Self::Output {
                self.map(|v| v $op f)
            }
        }

        impl $tra for SampledSpectrum {
            fn $fa(&mut self, other: Self) {
                *self = *self $op other;
            }
        }

        impl $tra<Float> for SampledSpectrum {
            fn $fa(&mut self, f: Float) {
                *self = *self $op f;
            }
        }
    };
}

componentwise!(Add, add, AddAssign, add_assign, +);
componentwise!(Sub, sub, SubAssign, sub_assign, -);
componentwise!(Mul, mul, MulAssign, mul_assign, *);
componentwise!(Div, div, DivAssign, div_assign, /);

impl Add<SampledSpectrum> for Float {
    type Output = SampledSpectrum;

    fn add(self, s: SampledSpectrum) -> Self::Output {
        s + self
    }
}

impl Sub<SampledSpectrum> for Float {
    type Output = SampledSpectrum;

    fn sub(self, s: SampledSpectrum) -> Self::Output {
        s.map(|v| self - v)
    }
}

impl Mul<SampledSpectrum> for Float {
    type Output = SampledSpectrum;

    fn mul(self, s: SampledSpectrum) -> Self::Output {
        s * self
    }
}

impl Div<SampledSpectrum> for Float {
    type Output = SampledSpectrum;

    fn div(self, s: SampledSpectrum) -> Self::Output {
        s.map(|v| self / v)
    }
}

impl Neg for SampledSpectrum {
    type Output = SampledSpectrum;

    fn neg(self) -> Self::Output {
        self.map(|v| -v)
    }
}

impl fmt::Display for SampledSpectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ {}, {}, {}, {} ]",
            self.c[0], self.c[1], self.c[2], self.c[3]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn arithmetic_is_componentwise() {
        let a = SampledSpectrum::from([1.0, 2.0, 3.0, 4.0]);
        let b = SampledSpectrum::new(2.0);
        assert_eq!((a * b)[3], 8.0);
        assert_eq!((a / b)[0], 0.5);
        assert_eq!((1.0 - a)[1], -1.0);
        assert_eq!(a.max_component_value(), 4.0);
        assert_eq!(a.min_component_value(), 1.0);
        assert!(approx_eq!(Float, a.average(), 2.5, epsilon = 0.00001));
    }

    #[test]
    fn truthiness() {
        assert!(SampledSpectrum::ZERO.is_black());
        assert!(!SampledSpectrum::ZERO.is_nonzero());
        assert!(SampledSpectrum::from([0.0, 0.0, 1e-8, 0.0]).is_nonzero());
        assert!(SampledSpectrum::new(-1.0).clamp_zero().is_black());
    }

    #[test]
    fn lerp_and_safe_div() {
        let a = SampledSpectrum::ZERO;
        let b = SampledSpectrum::new(4.0);
        assert_eq!(lerp(0.25, a, b), SampledSpectrum::new(1.0));
        let d = SampledSpectrum::from([2.0, 0.0, 1.0, 0.0]);
        assert_eq!(b.safe_div(&d), SampledSpectrum::from([2.0, 0.0, 4.0, 0.0]));
    }
}
