//! BSDF Sample

use super::BxDFFlags;
use crate::geometry::*;
use crate::pbrt::*;
use crate::spectrum::*;

/// Stores the outcome of sampling a BxDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BSDFSample {
    /// The value of the BxDF for the sampled pair of directions.
    pub f: Spectrum,

    /// The sampled incident direction in the local shading frame.
    pub wi: Vector3f,

    /// The value of the PDF with respect to solid angle.
    pub pdf: Float,

    /// The lobe that produced the sample.
    pub flags: BxDFFlags,

    /// Relative index of refraction along a specular transmission.
    pub eta: Float,

    /// The PDF is only proportional to the true density; layered estimators
    /// set this.
    pub pdf_is_proportional: bool,
}

impl BSDFSample {
    /// Create a new `BSDFSample`.
    ///
    /// * `f`     - The sample value.
    /// * `wi`    - The sampled incident direction.
    /// * `pdf`   - The value of the PDF.
    /// * `flags` - The sampled lobe.
    pub fn new(f: Spectrum, wi: Vector3f, pdf: Float, flags: BxDFFlags) -> Self {
        Self {
            f,
            wi,
            pdf,
            flags,
            eta: 1.0,
            pdf_is_proportional: false,
        }
    }

    /// Set the relative index of refraction.
    ///
    /// * `eta` - Relative IOR.
    pub fn with_eta(mut self, eta: Float) -> Self {
        self.eta = eta;
        self
    }

    /// Mark the PDF as proportional only.
    ///
    /// * `pdf_is_proportional` - Whether the PDF is approximate.
    pub fn with_proportional_pdf(mut self, pdf_is_proportional: bool) -> Self {
        self.pdf_is_proportional = pdf_is_proportional;
        self
    }

    /// Returns true if the sample is a reflection.
    pub fn is_reflection(&self) -> bool {
        self.flags.is_reflective()
    }

    /// Returns true if the sample is a transmission.
    pub fn is_transmission(&self) -> bool {
        self.flags.is_transmissive()
    }

    /// Returns true if the sample came from a diffuse lobe.
    pub fn is_diffuse(&self) -> bool {
        self.flags.is_diffuse()
    }

    /// Returns true if the sample came from a glossy lobe.
    pub fn is_glossy(&self) -> bool {
        self.flags.is_glossy()
    }

    /// Returns true if the sample came from a specular lobe.
    pub fn is_specular(&self) -> bool {
        self.flags.is_specular()
    }
}
