//! Henyey-Greenstein

use crate::geometry::*;
use crate::pbrt::*;
use std::fmt;

/// Result of sampling a phase function.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PhaseFunctionSample {
    /// Value of the phase function.
    pub p: Float,

    /// Sampled incident direction.
    pub wi: Vector3f,

    /// Density of `wi` with respect to solid angle.
    pub pdf: Float,
}

/// Henyey-Greenstein phase function.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HGPhaseFunction {
    /// The asymmetry parameter. It is the average value of the product of the
    /// phase function being approximated and the cosine of the angle between two
    /// directions. Isotropic phase functions use g = 0.
    g: Float,
}

impl HGPhaseFunction {
    /// Returns a new `HGPhaseFunction`.
    ///
    /// * `g` - The asymmetry parameter in (-1, 1).
    pub fn new(g: Float) -> Self {
        debug_assert!(g > -1.0 && g < 1.0);
        Self { g }
    }

    /// Returns the asymmetry parameter.
    pub fn g(&self) -> Float {
        self.g
    }

    /// Returns the value of the phase function for the given pair of directions.
    /// Both directions point away from the scattering point.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn p(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        phase_hg(wo.dot(wi), self.g)
    }

    /// Samples an incident direction given the outgoing direction and a sample
    /// value in [0, 1)^2. The phase function is its own sampling density.
    ///
    /// * `wo` - Outgoing direction.
    /// * `u`  - Sample value in [0, 1)^2.
    pub fn sample_p(&self, wo: &Vector3f, u: &Point2f) -> Option<PhaseFunctionSample> {
        let g = self.g;

        // Compute $\cos \theta$ for Henyey--Greenstein sample
        let cos_theta = if abs(g) < 1e-3 {
            1.0 - 2.0 * u[0]
        } else {
            -1.0 / (2.0 * g) * (1.0 + g * g - sqr((1.0 - g * g) / (1.0 + g - 2.0 * g * u[0])))
        };
        let cos_theta = clamp(cos_theta, -1.0, 1.0);

        // Compute direction _wi_ for Henyey--Greenstein sample
        let sin_theta = max(0.0, 1.0 - cos_theta * cos_theta).sqrt();
        let phi = TWO_PI * u[1];
        let wi = Frame::from_z(*wo).from_local(&spherical_direction(sin_theta, cos_theta, phi));

        let pdf = phase_hg(cos_theta, g);
        if pdf <= 0.0 {
            return None;
        }
        Some(PhaseFunctionSample { p: pdf, wi, pdf })
    }

    /// Returns the density of sampling `wi` given `wo`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn pdf(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        self.p(wo, wi)
    }
}

impl fmt::Display for HGPhaseFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HGPhaseFunction {{ g: {} }}", self.g)
    }
}

/// Computes the Henyey-Greenstein phase function for the cosine of the angle
/// between two directions that both point away from the scattering point.
///
/// * `cos_theta` - Cosine of the angle between the two directions.
/// * `g`         - Asymmetry parameter.
#[inline]
pub fn phase_hg(cos_theta: Float, g: Float) -> Float {
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    INV_FOUR_PI * (1.0 - g * g) / (denom * max(0.0, denom).sqrt())
}
