//! Diffuse

use super::*;

/// BRDF for the Lambertian model for perfect diffuse surfaces that scatters
/// incident illumination equally in all directions.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DiffuseBxDF {
    /// Reflectance spectrum which gives the fraction of incident light that
    /// is scattered.
    r: Spectrum,
}

impl DiffuseBxDF {
    /// Create a new instance of `DiffuseBxDF`.
    ///
    /// * `r` - Reflectance spectrum which gives the fraction of incident light
    ///         that is scattered.
    pub fn new(r: Spectrum) -> Self {
        Self { r }
    }
}

impl BxDFI for DiffuseBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if !same_hemisphere(wo, wi) {
            return Spectrum::ZERO;
        }
        self.r * INV_PI
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.allows_reflection() {
            return None;
        }

        // Cosine-sample the hemisphere, flipping the direction if necessary.
        let mut wi = cosine_sample_hemisphere(u);
        if wo.z < 0.0 {
            wi.z *= -1.0;
        }
        if wi.z == 0.0 {
            return None;
        }

        let pdf = cosine_hemisphere_pdf(abs_cos_theta(&wi));
        Some(BSDFSample::new(
            self.r * INV_PI,
            wi,
            pdf,
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
        cosine_hemisphere_pdf(abs_cos_theta(wi))
    }

    fn flags(&self) -> BxDFFlags {
        if self.r.is_nonzero() {
            BxDFFlags::DIFFUSE_REFLECTION
        } else {
            BxDFFlags::UNSET
        }
    }

    fn regularize(&mut self) {}
}

impl fmt::Display for DiffuseBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ DiffuseBxDF R: {} ]", self.r)
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    crate::prop_hemisphere_direction!(upper_direction);

    #[test]
    fn white_furnace_is_albedo() {
        let bxdf = DiffuseBxDF::new(Spectrum::ONE);
        for wo in incidence_directions() {
            let rho = white_furnace(&bxdf, &wo, 1024);
            assert!(approx_eq!(Float, rho[0], 1.0, epsilon = 0.001));
        }
    }

    #[test]
    fn sample_matches_pdf() {
        let bxdf = DiffuseBxDF::new(Spectrum::new(0.4));
        let wo = Vector3f::new(0.0, 0.6, -0.8);
        let mode = TransportMode::Radiance;
        assert_sample_matches_pdf(&bxdf, &wo, mode, BxDFReflTransFlags::ALL, 256);
    }

    #[test]
    fn transmission_only_request_is_rejected() {
        let bxdf = DiffuseBxDF::new(Spectrum::new(0.4));
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let u = Point2f::new(0.3, 0.7);
        let tr = BxDFReflTransFlags::TRANSMISSION;
        assert!(bxdf.sample_f(&wo, 0.5, &u, TransportMode::Radiance, tr).is_none());
        assert_eq!(bxdf.pdf(&wo, &wo, TransportMode::Radiance, tr), 0.0);
    }

    #[test]
    fn black_reflectance_has_no_lobes() {
        assert_eq!(DiffuseBxDF::new(Spectrum::ZERO).flags(), BxDFFlags::UNSET);
    }

    proptest! {
        #[test]
        fn reciprocal(wo in upper_direction(), wi in upper_direction()) {
            let bxdf = DiffuseBxDF::new(Spectrum::new(0.3));
            let a = bxdf.f(&wo, &wi, TransportMode::Radiance);
            let b = bxdf.f(&wi, &wo, TransportMode::Radiance);
            prop_assert_eq!(a, b);
            prop_assert!(bxdf.f(&wo, &-wi, TransportMode::Radiance).is_black());
        }
    }
}
