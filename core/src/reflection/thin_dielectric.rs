//! Thin Dielectric

use super::*;

/// A thin dielectric slab such as a window pane. Light that enters is assumed to
/// bounce between the two parallel interfaces and leave along the mirror or the
/// straight-through direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ThinDielectricBxDF {
    /// Relative index of refraction.
    eta: Float,
}

impl ThinDielectricBxDF {
    /// Create a new instance of `ThinDielectricBxDF`.
    ///
    /// * `eta` - Relative index of refraction.
    pub fn new(eta: Float) -> Self {
        Self { eta }
    }

    /// Returns the reflectance and transmittance of the slab including all
    /// internal bounces.
    ///
    /// * `cos_theta` - Absolute cosine of the incident angle.
    pub fn reflectance_transmittance(&self, cos_theta: Float) -> (Float, Float) {
        let mut r = fr_dielectric(cos_theta, self.eta);
        let mut t = 1.0 - r;
        if r < 1.0 {
            r += sqr(t) * r / (1.0 - sqr(r));
            t = 1.0 - r;
        }
        (r, t)
    }
}

impl BxDFI for ThinDielectricBxDF {
    fn f(&self, _wo: &Vector3f, _wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        Spectrum::ZERO
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        _u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if wo.z == 0.0 {
            return None;
        }

        let (r, t) = self.reflectance_transmittance(abs_cos_theta(wo));
        let pr = if sample_flags.allows_reflection() { r } else { 0.0 };
        let pt = if sample_flags.allows_transmission() { t } else { 0.0 };
        if pr == 0.0 && pt == 0.0 {
            return None;
        }

        if uc < pr / (pr + pt) {
            let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
            let fr = Spectrum::new(r / abs_cos_theta(&wi));
            Some(BSDFSample::new(
                fr,
                wi,
                pr / (pr + pt),
                BxDFFlags::SPECULAR_REFLECTION,
            ))
        } else {
            let wi = -(*wo);
            let ft = Spectrum::new(t / abs_cos_theta(&wi));
            Some(BSDFSample::new(
                ft,
                wi,
                pt / (pr + pt),
                BxDFFlags::SPECULAR_TRANSMISSION,
            ))
        }
    }

    fn pdf(
        &self,
        _wo: &Vector3f,
        _wi: &Vector3f,
        _mode: TransportMode,
        _sample_flags: BxDFReflTransFlags,
    ) -> Float {
        0.0
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::REFLECTION | BxDFFlags::TRANSMISSION | BxDFFlags::SPECULAR
    }

    fn regularize(&mut self) {}
}

impl fmt::Display for ThinDielectricBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ThinDielectricBxDF eta: {} ]", self.eta)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use float_cmp::*;

    #[test]
    fn slab_reflectance_includes_internal_bounces() {
        let bxdf = ThinDielectricBxDF::new(1.5);
        let r0 = fr_dielectric(1.0, 1.5);
        let t0 = 1.0 - r0;
        let (r, t) = bxdf.reflectance_transmittance(1.0);
        assert!(approx_eq!(Float, r, r0 + t0 * t0 * r0 / (1.0 - r0 * r0), epsilon = 0.00001));
        assert!(approx_eq!(Float, r + t, 1.0, epsilon = 0.00001));
    }

    #[test]
    fn normal_incidence_samples() {
        let bxdf = ThinDielectricBxDF::new(1.5);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let (r, t) = bxdf.reflectance_transmittance(1.0);
        let u = Point2f::new(0.5, 0.5);
        let all = BxDFReflTransFlags::ALL;

        let refl = bxdf.sample_f(&wo, 0.0, &u, TransportMode::Radiance, all).unwrap();
        assert!(refl.is_reflection() && refl.is_specular());
        assert!(approx_eq!(Float, refl.pdf, r, epsilon = 0.00001));
        assert!(approx_eq!(Float, refl.f[0], r, epsilon = 0.00001));

        let trans = bxdf.sample_f(&wo, 0.999, &u, TransportMode::Radiance, all).unwrap();
        assert!(trans.is_transmission());
        assert_eq!(trans.wi, -wo);
        assert!(approx_eq!(Float, trans.pdf, t, epsilon = 0.00001));
        assert!(approx_eq!(Float, trans.f[0], t, epsilon = 0.00001));
    }

    #[test]
    fn conserves_energy() {
        let bxdf = ThinDielectricBxDF::new(1.33);
        for wo in incidence_directions() {
            let rho = white_furnace(&bxdf, &wo, 256);
            assert!(approx_eq!(Float, rho[0], 1.0, epsilon = 0.0001));
        }
    }

    #[test]
    fn request_flags_restrict_lobes() {
        let bxdf = ThinDielectricBxDF::new(1.5);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let u = Point2f::new(0.5, 0.5);
        let mode = TransportMode::Radiance;
        for uc in [0.0, 0.5, 0.99] {
            let r = bxdf.sample_f(&wo, uc, &u, mode, BxDFReflTransFlags::REFLECTION).unwrap();
            assert!(r.is_reflection());
            assert_eq!(r.pdf, 1.0);
            let t = bxdf.sample_f(&wo, uc, &u, mode, BxDFReflTransFlags::TRANSMISSION).unwrap();
            assert!(t.is_transmission());
        }
        assert!(bxdf.sample_f(&wo, 0.5, &u, mode, BxDFReflTransFlags::UNSET).is_none());
        assert!(bxdf.f(&wo, &-wo, mode).is_black());
    }
}
