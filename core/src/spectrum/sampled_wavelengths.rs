//! Sampled Wavelengths.

use super::{SampledSpectrum, LAMBDA_MAX, LAMBDA_MIN, N_SPECTRUM_SAMPLES};
use crate::pbrt::*;

/// The wavelengths at which a `SampledSpectrum` is evaluated along with the
/// probability density of having chosen each one.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SampledWavelengths {
    /// Wavelengths in nm.
    lambda: [Float; N_SPECTRUM_SAMPLES],

    /// Sampling density of each wavelength.
    pdf: [Float; N_SPECTRUM_SAMPLES],
}

impl SampledWavelengths {
    /// Stratified uniform sampling of wavelengths in [lambda_min, lambda_max].
    ///
    /// * `u`          - Uniform sample in [0, 1).
    /// * `lambda_min` - Minimum wavelength.
    /// * `lambda_max` - Maximum wavelength.
    pub fn sample_uniform(u: Float, lambda_min: Float, lambda_max: Float) -> Self {
        let mut lambda = [0.0; N_SPECTRUM_SAMPLES];
        lambda[0] = lerp(u, lambda_min, lambda_max);

        // Remaining wavelengths are equally spaced and wrapped around the range.
        let delta = (lambda_max - lambda_min) / N_SPECTRUM_SAMPLES as Float;
        for i in 1..N_SPECTRUM_SAMPLES {
            lambda[i] = lambda[i - 1] + delta;
            if lambda[i] > lambda_max {
                lambda[i] = lambda_min + (lambda[i] - lambda_max);
            }
        }

        let pdf = [1.0 / (lambda_max - lambda_min); N_SPECTRUM_SAMPLES];
        Self { lambda, pdf }
    }

    /// Samples wavelengths proportionally to the visual response curve.
    ///
    /// * `u` - Uniform sample in [0, 1).
    pub fn sample_visible(u: Float) -> Self {
        let mut lambda = [0.0; N_SPECTRUM_SAMPLES];
        let mut pdf = [0.0; N_SPECTRUM_SAMPLES];
        for i in 0..N_SPECTRUM_SAMPLES {
            // Stratify the remaining samples.
            let mut up = u + i as Float / N_SPECTRUM_SAMPLES as Float;
            if up > 1.0 {
                up -= 1.0;
            }
            lambda[i] = sample_visible_wavelength(up);
            pdf[i] = visible_wavelengths_pdf(lambda[i]);
        }
        Self { lambda, pdf }
    }

    /// Returns the wavelength at index `i`.
    ///
    /// * `i` - The index.
    pub fn lambda(&self, i: usize) -> Float {
        self.lambda[i]
    }

    /// Returns the sampling densities as a spectrum.
    pub fn pdf(&self) -> SampledSpectrum {
        SampledSpectrum::from(self.pdf)
    }
}

impl Default for SampledWavelengths {
    /// Wavelengths stratified over the visible range starting at its midpoint.
    fn default() -> Self {
        Self::sample_uniform(0.5, LAMBDA_MIN, LAMBDA_MAX)
    }
}

/// Maps a uniform sample to a wavelength in [360, 830] nm.
///
/// * `u` - Uniform sample.
pub fn sample_visible_wavelength(u: Float) -> Float {
    538.0 - 138.888889 * (0.85691062 - 1.82750197 * u).atanh()
}

/// Density of `sample_visible_wavelength()`.
///
/// * `lambda` - The wavelength.
pub fn visible_wavelengths_pdf(lambda: Float) -> Float {
    if !(LAMBDA_MIN..=LAMBDA_MAX).contains(&lambda) {
        return 0.0;
    }
    0.0039398042 / sqr((0.0072 * (lambda - 538.0)).cosh())
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    #[test]
    fn uniform_wavelengths_wrap_into_range() {
        let w = SampledWavelengths::sample_uniform(0.9, LAMBDA_MIN, LAMBDA_MAX);
        for i in 0..N_SPECTRUM_SAMPLES {
            assert!(w.lambda(i) >= LAMBDA_MIN && w.lambda(i) <= LAMBDA_MAX);
        }
        assert!(approx_eq!(
            Float,
            w.pdf()[0],
            1.0 / (LAMBDA_MAX - LAMBDA_MIN),
            epsilon = 0.000001
        ));
    }

    #[test]
    fn visible_wavelengths_are_in_range() {
        let w = SampledWavelengths::sample_visible(0.3);
        for i in 0..N_SPECTRUM_SAMPLES {
            assert!(w.lambda(i) >= LAMBDA_MIN - 1.0 && w.lambda(i) <= LAMBDA_MAX + 1.0);
            assert!(w.pdf()[i] > 0.0);
        }
    }
}
