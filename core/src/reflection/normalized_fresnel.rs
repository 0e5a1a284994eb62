//! Normalized Fresnel

use super::*;

/// Diffuse lobe weighted by one minus the Fresnel reflectance, normalized so it
/// integrates to one. It is the directional profile of light leaving a
/// subsurface scattering medium.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct NormalizedFresnelBxDF {
    /// Relative index of refraction.
    eta: Float,
}

impl NormalizedFresnelBxDF {
    /// Create a new instance of `NormalizedFresnelBxDF`.
    ///
    /// * `eta` - Relative index of refraction.
    pub fn new(eta: Float) -> Self {
        Self { eta }
    }
}

impl BxDFI for NormalizedFresnelBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        if !same_hemisphere(wo, wi) {
            return Spectrum::ZERO;
        }

        let c = 1.0 - 2.0 * fresnel_moment_1(1.0 / self.eta);
        let mut f = Spectrum::new((1.0 - fr_dielectric(cos_theta(wi), self.eta)) / (c * PI));

        // Account for solid angle compression under adjoint transport.
        if mode == TransportMode::Importance {
            f *= sqr(self.eta);
        }
        f
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.allows_reflection() {
            return None;
        }

        let mut wi = cosine_sample_hemisphere(u);
        if wo.z < 0.0 {
            wi.z *= -1.0;
        }
        if wi.z == 0.0 {
            return None;
        }
        Some(BSDFSample::new(
            self.f(wo, &wi, mode),
            wi,
            self.pdf(wo, &wi, mode, sample_flags),
            BxDFFlags::DIFFUSE_REFLECTION,
        ))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.allows_reflection() || !same_hemisphere(wo, wi) {
            return 0.0;
        }
        abs_cos_theta(wi) * INV_PI
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::DIFFUSE_REFLECTION
    }

    fn regularize(&mut self) {}
}

impl fmt::Display for NormalizedFresnelBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ NormalizedFresnelBxDF eta: {} ]", self.eta)
    }
}
