//! Diffuse Transmission

use super::*;

/// Lambertian reflection and transmission.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiffuseTransmissionBxDF {
    /// Reflectance.
    r: Spectrum,

    /// Transmittance.
    t: Spectrum,
}

impl DiffuseTransmissionBxDF {
    /// Create a new instance of `DiffuseTransmissionBxDF`.
    ///
    /// * `r` - Reflectance.
    /// * `t` - Transmittance.
    pub fn new(r: Spectrum, t: Spectrum) -> Self {
        Self { r, t }
    }

    /// Returns the probabilities of choosing reflection and transmission under
    /// the request flags.
    fn sample_weights(&self, sample_flags: BxDFReflTransFlags) -> (Float, Float) {
        let pr = if sample_flags.allows_reflection() {
            self.r.max_component_value()
        } else {
            0.0
        };
        let pt = if sample_flags.allows_transmission() {
            self.t.max_component_value()
        } else {
            0.0
        };
        (pr, pt)
    }
}

impl BxDFI for DiffuseTransmissionBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if wo.z == 0.0 || wi.z == 0.0 {
            Spectrum::ZERO
        } else if same_hemisphere(wo, wi) {
            self.r * INV_PI
        } else {
            self.t * INV_PI
        }
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if wo.z == 0.0 {
            return None;
        }
        let (pr, pt) = self.sample_weights(sample_flags);
        if pr == 0.0 && pt == 0.0 {
            return None;
        }

        let mut wi = cosine_sample_hemisphere(u);
        if wi.z == 0.0 {
            return None;
        }
        if uc < pr / (pr + pt) {
            // Reflection stays on the side of `wo`.
            if wo.z < 0.0 {
                wi.z *= -1.0;
            }
            let pdf = cosine_hemisphere_pdf(abs_cos_theta(&wi)) * pr / (pr + pt);
            Some(BSDFSample::new(
                self.f(wo, &wi, mode),
                wi,
                pdf,
                BxDFFlags::DIFFUSE_REFLECTION,
            ))
        } else {
            if wo.z > 0.0 {
                wi.z *= -1.0;
            }
            let pdf = cosine_hemisphere_pdf(abs_cos_theta(&wi)) * pt / (pr + pt);
            Some(BSDFSample::new(
                self.f(wo, &wi, mode),
                wi,
                pdf,
                BxDFFlags::DIFFUSE_TRANSMISSION,
            ))
        }
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        let (pr, pt) = self.sample_weights(sample_flags);
        if (pr == 0.0 && pt == 0.0) || wo.z == 0.0 || wi.z == 0.0 {
            return 0.0;
        }

        if same_hemisphere(wo, wi) {
            pr / (pr + pt) * cosine_hemisphere_pdf(abs_cos_theta(wi))
        } else {
            pt / (pr + pt) * cosine_hemisphere_pdf(abs_cos_theta(wi))
        }
    }

    fn flags(&self) -> BxDFFlags {
        let mut flags = BxDFFlags::UNSET;
        if self.r.is_nonzero() {
            flags |= BxDFFlags::DIFFUSE_REFLECTION;
        }
        if self.t.is_nonzero() {
            flags |= BxDFFlags::DIFFUSE_TRANSMISSION;
        }
        flags
    }

    fn regularize(&mut self) {}
}

impl fmt::Display for DiffuseTransmissionBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ DiffuseTransmissionBxDF R: {} T: {} ]", self.r, self.t)
    }
}
