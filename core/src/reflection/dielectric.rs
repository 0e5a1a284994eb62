//! Dielectric

use super::*;
use crate::microfacet::*;

/// Reflection and transmission at a dielectric interface. Rough interfaces use
/// a Trowbridge-Reitz microfacet distribution with the generalized half vector;
/// effectively smooth ones reflect and refract in a single direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DielectricBxDF {
    /// Relative index of refraction, inside over outside.
    eta: Float,

    /// Microfacet distribution.
    mf_distrib: TrowbridgeReitzDistribution,
}

impl DielectricBxDF {
    /// Create a new instance of `DielectricBxDF`.
    ///
    /// * `eta`        - Relative index of refraction.
    /// * `mf_distrib` - Microfacet distribution.
    pub fn new(eta: Float, mf_distrib: TrowbridgeReitzDistribution) -> Self {
        Self { eta, mf_distrib }
    }

    /// Returns the relative index of refraction.
    pub fn eta(&self) -> Float {
        self.eta
    }

    /// Returns true if scattering is a pair of delta lobes.
    fn is_specular(&self) -> bool {
        self.eta == 1.0 || self.mf_distrib.effectively_smooth()
    }

    /// Returns the reflection and transmission probabilities under the request
    /// flags.
    ///
    /// * `r`            - Fresnel reflectance.
    /// * `sample_flags` - Request flags.
    fn sample_weights(r: Float, sample_flags: BxDFReflTransFlags) -> (Float, Float) {
        let pr = if sample_flags.allows_reflection() { r } else { 0.0 };
        let pt = if sample_flags.allows_transmission() {
            1.0 - r
        } else {
            0.0
        };
        (pr, pt)
    }

    /// Computes the generalized half vector for the pair of directions along
    /// with the relative IOR and whether the pair is a reflection. Returns
    /// `None` for degenerate configurations and back-facing microfacets.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    fn half_vector(&self, wo: &Vector3f, wi: &Vector3f) -> Option<(Vector3f, Float, bool)> {
        let cos_theta_o = cos_theta(wo);
        let cos_theta_i = cos_theta(wi);
        let reflect = cos_theta_i * cos_theta_o > 0.0;
        let etap = if reflect {
            1.0
        } else if cos_theta_o > 0.0 {
            self.eta
        } else {
            1.0 / self.eta
        };

        let wm = *wi * etap + *wo;
        if cos_theta_i == 0.0 || cos_theta_o == 0.0 || wm.length_squared() == 0.0 {
            return None;
        }
        let wm = wm.normalize().face_forward(&Vector3f::new(0.0, 0.0, 1.0));

        // Discard back-facing microfacets.
        if wm.dot(wi) * cos_theta_i < 0.0 || wm.dot(wo) * cos_theta_o < 0.0 {
            return None;
        }
        Some((wm, etap, reflect))
    }
}

impl BxDFI for DielectricBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, mode: TransportMode) -> Spectrum {
        if self.is_specular() {
            return Spectrum::ZERO;
        }

        let (wm, etap, reflect) = match self.half_vector(wo, wi) {
            Some(h) => h,
            None => return Spectrum::ZERO,
        };
        let cos_theta_o = cos_theta(wo);
        let cos_theta_i = cos_theta(wi);

        let f = fr_dielectric(wo.dot(&wm), self.eta);
        if reflect {
            Spectrum::new(
                self.mf_distrib.d(&wm) * self.mf_distrib.g(wo, wi) * f
                    / abs(4.0 * cos_theta_i * cos_theta_o),
            )
        } else {
            let denom = sqr(wi.dot(&wm) + wo.dot(&wm) / etap) * cos_theta_i * cos_theta_o;
            let mut ft = self.mf_distrib.d(&wm)
                * (1.0 - f)
                * self.mf_distrib.g(wo, wi)
                * abs(wi.dot(&wm) * wo.dot(&wm) / denom);

            // Account for non-symmetric scattering due to refraction.
            if mode == TransportMode::Radiance {
                ft /= sqr(etap);
            }
            Spectrum::new(ft)
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

        if self.is_specular() {
            // Sample perfect specular dielectric BSDF.
            let r = fr_dielectric(cos_theta(wo), self.eta);
            let t = 1.0 - r;
            let (pr, pt) = Self::sample_weights(r, sample_flags);
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
                let (wi, etap) = refract(wo, &Vector3f::new(0.0, 0.0, 1.0), self.eta)?;
                if wi.z == 0.0 {
                    return None;
                }
                let mut ft = Spectrum::new(t / abs_cos_theta(&wi));
                if mode == TransportMode::Radiance {
                    ft /= sqr(etap);
                }
                Some(
                    BSDFSample::new(ft, wi, pt / (pr + pt), BxDFFlags::SPECULAR_TRANSMISSION)
                        .with_eta(etap),
                )
            }
        } else {
            // Sample a visible microfacet normal, then reflect or refract.
            let wm = self.mf_distrib.sample_wm(wo, u);
            let r = fr_dielectric(wo.dot(&wm), self.eta);
            let t = 1.0 - r;
            let (pr, pt) = Self::sample_weights(r, sample_flags);
            if pr == 0.0 && pt == 0.0 {
                return None;
            }

            if uc < pr / (pr + pt) {
                let wi = reflect(wo, &wm);
                if !same_hemisphere(wo, &wi) {
                    return None;
                }
                let pdf = self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm)) * pr / (pr + pt);
                let f = Spectrum::new(
                    self.mf_distrib.d(&wm) * self.mf_distrib.g(wo, &wi) * r
                        / (4.0 * cos_theta(&wi) * cos_theta(wo)),
                );
                Some(BSDFSample::new(f, wi, pdf, BxDFFlags::GLOSSY_REFLECTION))
            } else {
                let (wi, etap) = refract(wo, &wm, self.eta)?;
                if same_hemisphere(wo, &wi) || wi.z == 0.0 {
                    return None;
                }

                // Jacobian of the generalized half vector mapping.
                let denom = sqr(wi.dot(&wm) + wo.dot(&wm) / etap);
                let dwm_dwi = wi.abs_dot(&wm) / denom;
                let pdf = self.mf_distrib.pdf(wo, &wm) * dwm_dwi * pt / (pr + pt);

                let mut ft = Spectrum::new(
                    t * self.mf_distrib.d(&wm)
                        * self.mf_distrib.g(wo, &wi)
                        * abs(wi.dot(&wm) * wo.dot(&wm) / (cos_theta(&wi) * cos_theta(wo) * denom)),
                );
                if mode == TransportMode::Radiance {
                    ft /= sqr(etap);
                }
                Some(BSDFSample::new(ft, wi, pdf, BxDFFlags::GLOSSY_TRANSMISSION).with_eta(etap))
            }
        }
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if self.is_specular() {
            return 0.0;
        }

        let (wm, etap, reflect) = match self.half_vector(wo, wi) {
            Some(h) => h,
            None => return 0.0,
        };

        let r = fr_dielectric(wo.dot(&wm), self.eta);
        let (pr, pt) = Self::sample_weights(r, sample_flags);
        if pr == 0.0 && pt == 0.0 {
            return 0.0;
        }

        if reflect {
            self.mf_distrib.pdf(wo, &wm) / (4.0 * wo.abs_dot(&wm)) * pr / (pr + pt)
        } else {
            let denom = sqr(wi.dot(&wm) + wo.dot(&wm) / etap);
            let dwm_dwi = wi.abs_dot(&wm) / denom;
            self.mf_distrib.pdf(wo, &wm) * dwm_dwi * pt / (pr + pt)
        }
    }

    fn flags(&self) -> BxDFFlags {
        let flags = if self.eta == 1.0 {
            BxDFFlags::TRANSMISSION
        } else {
            BxDFFlags::REFLECTION | BxDFFlags::TRANSMISSION
        };
        if self.is_specular() {
            flags | BxDFFlags::SPECULAR
        } else {
            flags | BxDFFlags::GLOSSY
        }
    }

    fn regularize(&mut self) {
        self.mf_distrib.regularize();
    }
}

impl fmt::Display for DielectricBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ DielectricBxDF eta: {} mfDistrib: {} ]",
            self.eta, self.mf_distrib
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

    fn smooth(eta: Float) -> DielectricBxDF {
        DielectricBxDF::new(eta, TrowbridgeReitzDistribution::new(0.0, 0.0))
    }

    fn rough(eta: Float) -> DielectricBxDF {
        DielectricBxDF::new(eta, TrowbridgeReitzDistribution::new(0.3, 0.3))
    }

    #[test]
    fn smooth_reflection_only_at_normal_incidence() {
        let bxdf = smooth(1.5);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let u = Point2f::new(0.5, 0.5);
        let bs = bxdf
            .sample_f(&wo, 0.99, &u, TransportMode::Radiance, BxDFReflTransFlags::REFLECTION)
            .unwrap();
        assert_eq!(bs.wi, wo);
        assert_eq!(bs.pdf, 1.0);
        assert!(bs.is_specular() && bs.is_reflection());
        let r = fr_dielectric(1.0, 1.5);
        assert!(approx_eq!(Float, bs.f[0], r, epsilon = 0.00001));
    }

    #[test]
    fn smooth_transmission_is_scaled_for_radiance() {
        let bxdf = smooth(1.5);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let u = Point2f::new(0.5, 0.5);
        let tr = BxDFReflTransFlags::TRANSMISSION;
        let radiance = bxdf.sample_f(&wo, 0.5, &u, TransportMode::Radiance, tr).unwrap();
        let importance = bxdf.sample_f(&wo, 0.5, &u, TransportMode::Importance, tr).unwrap();
        assert!(approx_eq!(Float, radiance.wi.z, -1.0, epsilon = 0.00001));
        assert_eq!(radiance.eta, 1.5);
        assert_eq!(radiance.pdf, 1.0);
        assert!(approx_eq!(Float, importance.f[0], 0.96, epsilon = 0.0001));
        assert!(approx_eq!(Float, radiance.f[0], 0.96 / 2.25, epsilon = 0.0001));
    }

    #[test]
    fn smooth_choice_follows_fresnel() {
        let bxdf = smooth(1.5);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let r = fr_dielectric(0.8, 1.5);
        let u = Point2f::new(0.5, 0.5);
        let all = BxDFReflTransFlags::ALL;
        let below = bxdf.sample_f(&wo, r * 0.5, &u, TransportMode::Radiance, all).unwrap();
        let above = bxdf.sample_f(&wo, r + 0.01, &u, TransportMode::Radiance, all).unwrap();
        assert!(below.is_reflection());
        assert!(approx_eq!(Float, below.pdf, r, epsilon = 0.00001));
        assert!(above.is_transmission());
        assert!(approx_eq!(Float, above.pdf, 1.0 - r, epsilon = 0.00001));
        assert!(bxdf.f(&wo, &below.wi, TransportMode::Radiance).is_black());
        assert_eq!(bxdf.pdf(&wo, &below.wi, TransportMode::Radiance, all), 0.0);
    }

    #[test]
    fn index_matched_interface_passes_straight_through() {
        let bxdf = rough(1.0);
        assert_eq!(bxdf.flags(), BxDFFlags::SPECULAR_TRANSMISSION);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let u = Point2f::new(0.1, 0.9);
        let bs = bxdf
            .sample_f(&wo, 0.3, &u, TransportMode::Radiance, BxDFReflTransFlags::ALL)
            .unwrap();
        assert!(approx_eq!(Float, bs.wi.x, -0.6, epsilon = 0.00001));
        assert!(approx_eq!(Float, bs.wi.z, -0.8, epsilon = 0.00001));
        assert!(approx_eq!(Float, bs.f[0] * abs_cos_theta(&bs.wi), 1.0, epsilon = 0.0001));
    }

    #[test]
    fn rough_sample_matches_pdf() {
        let bxdf = rough(1.5);
        for wo in incidence_directions() {
            for flags in [
                BxDFReflTransFlags::ALL,
                BxDFReflTransFlags::REFLECTION,
                BxDFReflTransFlags::TRANSMISSION,
            ] {
                assert_sample_matches_pdf(&bxdf, &wo, TransportMode::Radiance, flags, 128);
                assert_sample_matches_pdf(&bxdf, &-wo, TransportMode::Importance, flags, 128);
            }
        }
    }

    #[test]
    fn rough_white_furnace_does_not_gain_energy() {
        let bxdf = rough(1.5);
        for wo in incidence_directions() {
            let rho = white_furnace(&bxdf, &wo, 2048);
            assert!(rho[0] <= 1.0 + 0.001, "rho {} for wo {}", rho, wo);
            assert!(rho[0] > 0.0);
        }
    }

    #[test]
    fn flags_track_roughness() {
        assert_eq!(
            smooth(1.5).flags(),
            BxDFFlags::REFLECTION | BxDFFlags::TRANSMISSION | BxDFFlags::SPECULAR
        );
        assert_eq!(
            rough(1.5).flags(),
            BxDFFlags::REFLECTION | BxDFFlags::TRANSMISSION | BxDFFlags::GLOSSY
        );
    }

    proptest! {
        #[test]
        fn rough_reflection_is_reciprocal(wo in upper_direction(), wi in upper_direction()) {
            let bxdf = rough(1.5);
            let a = bxdf.f(&wo, &wi, TransportMode::Radiance)[0];
            let b = bxdf.f(&wi, &wo, TransportMode::Radiance)[0];
            prop_assert!(approx_eq!(Float, a, b, epsilon = 0.0001 * max(1.0, a)));
        }

        #[test]
        fn index_matched_reflection_is_zero(wo in upper_direction(), wi in upper_direction()) {
            let bxdf = smooth(1.0);
            prop_assert!(bxdf.f(&wo, &wi, TransportMode::Radiance).is_black());
            prop_assert!(bxdf.f(&wi, &wo, TransportMode::Radiance).is_black());
        }

        #[test]
        fn masked_hemisphere_has_zero_density(wo in upper_direction(), wi in upper_direction()) {
            let bxdf = rough(1.5);
            let mode = TransportMode::Radiance;
            prop_assert_eq!(bxdf.pdf(&wo, &wi, mode, BxDFReflTransFlags::TRANSMISSION), 0.0);
            prop_assert_eq!(bxdf.pdf(&wo, &-wi, mode, BxDFReflTransFlags::REFLECTION), 0.0);
        }
    }
}
