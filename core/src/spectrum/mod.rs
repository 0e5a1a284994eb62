//! Spectrum

use crate::pbrt::Float;

mod sampled_spectrum;
mod sampled_wavelengths;

// Re-export
pub use sampled_spectrum::*;
pub use sampled_wavelengths::*;

/// Number of wavelengths carried by every spectral value.
pub const N_SPECTRUM_SAMPLES: usize = 4;

/// Minimum wavelength of visible light in nm.
pub const LAMBDA_MIN: Float = 360.0;

/// Maximum wavelength of visible light in nm.
pub const LAMBDA_MAX: Float = 830.0;

/// Spectral values are point-sampled at `N_SPECTRUM_SAMPLES` wavelengths.
pub type Spectrum = SampledSpectrum;
