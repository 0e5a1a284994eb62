//! Conductor

use super::*;
use crate::microfacet::*;

/// Metal reflection with a complex index of refraction over a Trowbridge-Reitz
/// microfacet distribution. Effectively smooth distributions produce a perfect
/// mirror.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConductorBxDF {
    /// Microfacet distribution.
    mf_distrib: TrowbridgeReitzDistribution,

    /// Real part of the index of refraction.
    eta: Spectrum,

    /// Absorption coefficient.
    k: Spectrum,
}

impl ConductorBxDF {
    /// Create a new instance of `ConductorBxDF`.
    ///
    /// * `mf_distrib` - Microfacet distribution.
    /// * `eta`        - Real part of the index of refraction.
    /// * `k`          - Absorption coefficient.
    pub fn new(mf_distrib: TrowbridgeReitzDistribution, eta: Spectrum, k: Spectrum) -> Self {
        Self { mf_distrib, eta, k }
    }
}

impl BxDFI for ConductorBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if !same_hemisphere(wo, wi) || self.mf_distrib.effectively_smooth() {
            return Spectrum::ZERO;
        }

        // Compute cosines and half vector.
        let cos_theta_o = abs_cos_theta(wo);
        let cos_theta_i = abs_cos_theta(wi);
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 {
            return Spectrum::ZERO;
        }
        let wm = *wi + *wo;
        if wm.length_squared() == 0.0 {
            return Spectrum::ZERO;
        }
        let wm = wm.normalize();

        let f = fr_complex_spectrum(wo.abs_dot(&wm), &self.eta, &self.k);
        self.mf_distrib.d(&wm) * f * self.mf_distrib.g(wo, wi) / (4.0 * cos_theta_i * cos_theta_o)
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        _uc: Float,
        u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.allows_reflection() || wo.z == 0.0 {
            return None;
        }

        if self.mf_distrib.effectively_smooth() {
            // Sample perfect specular reflection.
            let wi = Vector3f::new(-wo.x, -wo.y, wo.z);
            let cos_theta_i = abs_cos_theta(&wi);
            let f = fr_complex_spectrum(cos_theta_i, &self.eta, &self.k) / cos_theta_i;
            return Some(BSDFSample::new(f, wi, 1.0, BxDFFlags::SPECULAR_REFLECTION));
        }

        // Sample a visible microfacet normal and reflect about it.
        let wm = self.mf_distrib.sample_wm(wo, u);
        let wi = reflect(wo, &wm);
        if !same_hemisphere(wo, &wi) {
            return None;
        }

        let pdf = self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm));
        let cos_theta_o = abs_cos_theta(wo);
        let cos_theta_i = abs_cos_theta(&wi);
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 {
            return None;
        }

        let fr = fr_complex_spectrum(wo.abs_dot(&wm), &self.eta, &self.k);
        let f = self.mf_distrib.d(&wm) * fr * self.mf_distrib.g(wo, &wi)
            / (4.0 * cos_theta_i * cos_theta_o);
        Some(BSDFSample::new(f, wi, pdf, BxDFFlags::GLOSSY_REFLECTION))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.allows_reflection()
            || !same_hemisphere(wo, wi)
            || self.mf_distrib.effectively_smooth()
        {
            return 0.0;
        }

        let wm = *wo + *wi;
        if wm.length_squared() == 0.0 {
            return 0.0;
        }
        let wm = wm.normalize().face_forward(&Vector3f::new(0.0, 0.0, 1.0));
        self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm))
    }

    fn flags(&self) -> BxDFFlags {
        if self.mf_distrib.effectively_smooth() {
            BxDFFlags::SPECULAR_REFLECTION
        } else {
            BxDFFlags::GLOSSY_REFLECTION
        }
    }

    fn regularize(&mut self) {
        self.mf_distrib.regularize();
    }
}

impl fmt::Display for ConductorBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ ConductorBxDF mfDistrib: {} eta: {} k: {} ]",
            self.mf_distrib, self.eta, self.k
        )
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    crate::prop_hemisphere_direction!(upper_direction);

    fn gold(alpha: Float) -> ConductorBxDF {
        ConductorBxDF::new(
            TrowbridgeReitzDistribution::new(alpha, alpha),
            Spectrum::from([0.18, 0.42, 1.37, 1.5]),
            Spectrum::from([3.42, 2.35, 1.77, 1.6]),
        )
    }

    #[test]
    fn smooth_conductor_is_a_mirror() {
        let bxdf = gold(0.0);
        assert_eq!(bxdf.flags(), BxDFFlags::SPECULAR_REFLECTION);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let u = Point2f::new(0.5, 0.5);
        let bs = bxdf
            .sample_f(&wo, 0.5, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert_eq!(bs.wi, Vector3f::new(-0.6, 0.0, 0.8));
        assert_eq!(bs.pdf, 1.0);
        assert!(bs.is_specular());
        assert!(bxdf.f(&wo, &bs.wi, TransportMode::Radiance).is_black());
        assert_eq!(bxdf.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL), 0.0);
    }

    #[test]
    fn white_furnace_does_not_gain_energy() {
        let bxdf = ConductorBxDF::new(
            TrowbridgeReitzDistribution::new(0.3, 0.3),
            Spectrum::new(0.0),
            Spectrum::new(1.0e4),
        );
        for wo in incidence_directions() {
            let rho = white_furnace(&bxdf, &wo, 4096);
            assert!(rho.max_component_value() <= 1.02, "rho {} for wo {}", rho, wo);
        }
    }

    #[test]
    fn sample_matches_pdf() {
        let bxdf = gold(0.4);
        for wo in incidence_directions() {
            let mode = TransportMode::Radiance;
            assert_sample_matches_pdf(&bxdf, &wo, mode, BxDFReflTransFlags::ALL, 256);
        }
    }

    #[test]
    fn transmission_request_is_rejected() {
        let bxdf = gold(0.4);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let tr = BxDFReflTransFlags::TRANSMISSION;
        assert!(bxdf
            .sample_f(&wo, 0.5, &Point2f::new(0.2, 0.2), TransportMode::Radiance, tr)
            .is_none());
        assert_eq!(bxdf.pdf(&wo, &wo, TransportMode::Radiance, tr), 0.0);
    }

    #[test]
    fn regularize_turns_mirror_glossy() {
        let mut bxdf = gold(0.0);
        bxdf.regularize();
        assert_eq!(bxdf.flags(), BxDFFlags::GLOSSY_REFLECTION);
    }

    proptest! {
        #[test]
        fn reciprocal(wo in upper_direction(), wi in upper_direction()) {
            let bxdf = gold(0.5);
            let a = bxdf.f(&wo, &wi, TransportMode::Radiance);
            let b = bxdf.f(&wi, &wo, TransportMode::Radiance);
            for i in 0..N_SPECTRUM_SAMPLES {
                prop_assert!(approx_eq!(Float, a[i], b[i], epsilon = 0.0001 * max(1.0, a[i])));
            }
        }
    }
}
