//! Disney

use super::*;
use crate::hash;
use crate::microfacet::*;
use crate::options::*;
use crate::rng::*;

/// Parameters of the principled BRDF.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisneyParams {
    /// Base color.
    pub color: Spectrum,

    /// Blends between dielectric and metallic response.
    pub metallic: Float,

    /// Surface roughness used directly as the GGX alpha.
    pub roughness: Float,

    /// Specular reflectance at normal incidence scaled by 0.08 when
    /// `is_specular` is set.
    pub specular: Float,

    /// Weight of the clear coat lobe.
    pub clearcoat: Float,

    /// Glossiness of the clear coat lobe.
    pub clearcoat_gloss: Float,

    /// Probability of diffuse transmission.
    pub subsurface: Float,

    /// Weight of the grazing retro-reflection sheen.
    pub sheen: Float,

    /// Tints the sheen towards the base color.
    pub sheen_tint: Float,

    /// Relative index of refraction of the specular layer.
    pub eta: Float,

    /// Luminance of the base color used to compute the tint.
    pub lum: Float,

    /// Use the Schlick approximation with `specular` instead of the dielectric
    /// Fresnel term.
    pub is_specular: bool,
}

impl Default for DisneyParams {
    fn default() -> Self {
        Self {
            color: Spectrum::new(0.5),
            metallic: 0.0,
            roughness: 0.5,
            specular: 0.5,
            clearcoat: 0.0,
            clearcoat_gloss: 1.0,
            subsurface: 0.0,
            sheen: 0.0,
            sheen_tint: 0.5,
            eta: 1.5,
            lum: 0.5,
            is_specular: false,
        }
    }
}

/// Principled BRDF with diffuse, sheen, specular and clear coat lobes plus an
/// optional diffuse transmission lobe. It is two-sided.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DisneyBxDF {
    params: DisneyParams,
}

impl DisneyBxDF {
    /// Create a new instance of `DisneyBxDF`.
    ///
    /// * `params` - Material parameters.
    pub fn new(params: DisneyParams) -> Self {
        Self { params }
    }

    /// Returns the material parameters.
    pub fn params(&self) -> &DisneyParams {
        &self.params
    }

    /// Returns the unnormalized selection weights of the specular, diffuse and
    /// clear coat strategies.
    pub fn raw_weights(&self) -> (Float, Float, Float) {
        let m = self.params.metallic;
        let d = 1.0 - m;
        (m + d, d, self.params.clearcoat)
    }

    /// Returns the probabilities of selecting the specular, diffuse and clear
    /// coat strategies.
    pub fn sample_weights(&self) -> (Float, Float, Float) {
        let (sw, dw, cw) = self.raw_weights();
        let norm = 1.0 / (sw + dw + cw);
        (sw * norm, dw * norm, cw * norm)
    }

    /// Returns the GGX alpha for the specular lobe.
    fn alpha(&self) -> Float {
        max(1e-3, self.params.roughness)
    }

    /// Returns the GTR1 roughness of the clear coat lobe.
    fn coat_alpha(&self) -> Float {
        lerp(self.params.clearcoat_gloss, 0.1, 0.001)
    }

    fn diffuse_f(&self, wo: &Vector3f, wi: &Vector3f, wh: &Vector3f) -> Spectrum {
        let p = &self.params;
        let rc = max(0.001, p.roughness);
        let fo = schlick_fresnel(cos_theta(wo));
        let fi = schlick_fresnel(cos_theta(wi));
        let fd90 = 0.5 + 2.0 * rc * sqr(wi.dot(wh));
        let fd = lerp(fi, 1.0, fd90) * lerp(fo, 1.0, fd90);
        p.color * (INV_PI * fd * (1.0 - p.metallic))
    }

    fn subsurface_f(&self, wo: &Vector3f, wi: &Vector3f, wh: &Vector3f) -> Spectrum {
        let p = &self.params;
        let rc = max(0.001, p.roughness);
        let cos_wo = abs_cos_theta(wo);
        let cos_wi = abs_cos_theta(wi);
        let fl = schlick_fresnel(cos_wi);
        let fv = schlick_fresnel(cos_wo);
        let fss90 = sqr(wi.dot(wh)) * rc;
        let fss = lerp(fl, 1.0, fss90) * lerp(fv, 1.0, fss90);
        let ss = 1.25 * (fss * (1.0 / (cos_wi + cos_wo) - 0.5) + 0.5);
        p.color * (INV_PI * ss * (1.0 - p.metallic))
    }

    /// Evaluates the BRDF with `wo` in the upper hemisphere.
    fn brdf_f(&self, wo: &Vector3f, wi: &Vector3f) -> Spectrum {
        let p = &self.params;
        let cos_theta_o = abs_cos_theta(wo);
        let cos_theta_i = abs_cos_theta(wi);
        let wh = *wi + *wo;
        if cos_theta_o == 0.0 || cos_theta_i == 0.0 || wh.length_squared() == 0.0 {
            return Spectrum::ZERO;
        }
        let wh = wh.normalize().face_forward(&Vector3f::new(0.0, 0.0, 1.0));
        let cos_wh = cos_theta(&wh);

        if !same_hemisphere(wo, wi) {
            return if p.subsurface > 0.0 {
                self.subsurface_f(wo, wi, &wh)
            } else {
                Spectrum::ZERO
            };
        }

        let c_tint = if p.lum > 0.0 {
            p.color / p.lum
        } else {
            Spectrum::ONE
        };
        let fh = schlick_fresnel(wi.dot(&wh));

        // Main specular reflection.
        let alpha = self.alpha();
        let d = gtr2(cos_wh, alpha);
        let fs = if p.is_specular {
            lerp(fh, 0.08 * p.specular, 1.0)
        } else {
            fr_dielectric(wo.dot(&wh), p.eta)
        };
        let f = lerp(p.metallic, Spectrum::new(fs), p.color);
        let g = smith_ggx(wo, alpha) * smith_ggx(wi, alpha);

        // Clear coat.
        let dc = gtr1(cos_wh, self.coat_alpha());
        let fc = lerp(fh, 0.04, 1.0);
        let gc = smith_ggx(wo, 0.25) * smith_ggx(wi, 0.25);

        let j = 1.0 / (4.0 * cos_theta_o * cos_theta_i);
        let spec = f * (d * g * j);
        let diffuse = self.diffuse_f(wo, wi, &wh);
        let coat = dc * fc * gc * j;

        // Sheen.
        let tint = lerp(p.sheen_tint, Spectrum::ONE, c_tint);
        let sheen = tint * (fh * p.sheen);

        diffuse + sheen + spec + Spectrum::new(p.clearcoat * coat)
    }

    /// Evaluates the sampling density with `wo` in the upper hemisphere.
    fn brdf_pdf(&self, wo: &Vector3f, wi: &Vector3f, sample_flags: BxDFReflTransFlags) -> Float {
        let (sr, dr, cr) = self.sample_weights();
        let pdf_diff = cosine_hemisphere_pdf(abs_cos_theta(wi));

        if !same_hemisphere(wo, wi) {
            // Only the diffuse strategy transmits.
            if !sample_flags.allows_transmission() || self.params.subsurface <= 0.0 {
                return 0.0;
            }
            return pdf_diff * dr;
        }
        if !sample_flags.allows_reflection() {
            return 0.0;
        }

        let wh = *wo + *wi;
        if wh.length_squared() == 0.0 || wo.z == 0.0 {
            return 0.0;
        }
        let wh = wh.normalize().face_forward(&Vector3f::new(0.0, 0.0, 1.0));
        let abs_cos_wh = abs_cos_theta(&wh);
        let j = 1.0 / (4.0 * wo.abs_dot(&wh));

        let alpha = self.alpha();
        let pdf_spec = smith_ggx(wo, alpha) * wo.abs_dot(&wh) * gtr2(abs_cos_wh, alpha) * j
            / abs_cos_theta(wo);
        let pdf_coat = gtr1(abs_cos_wh, self.coat_alpha()) * abs_cos_wh * j;

        pdf_spec * sr + pdf_diff * dr + pdf_coat * cr
    }

    /// Samples a clear coat half vector from GTR1 and reflects `wo` about it.
    fn sample_coating(&self, wo: &Vector3f, u: &Point2f) -> Vector3f {
        let alpha2 = sqr(self.coat_alpha());
        let cos_h = max(0.0001, (1.0 - alpha2.powf(1.0 - u[0])) / (1.0 - alpha2)).sqrt();
        let sin_h = max(0.0001, 1.0 - sqr(cos_h)).sqrt();
        let phi = TWO_PI * u[1];

        let mut wh = Vector3f::new(sin_h * phi.cos(), sin_h * phi.sin(), cos_h);
        if wo.z * wh.z <= 0.0 {
            wh = -wh;
        }
        (2.0 * wh.dot(wo) * wh - *wo).normalize()
    }
}

impl BxDFI for DisneyBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        if wo.z < 0.0 {
            self.brdf_f(&-(*wo), &-(*wi))
        } else {
            self.brdf_f(wo, wi)
        }
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        let flip = wo.z < 0.0;
        let wo = if flip { -(*wo) } else { *wo };
        if wo.z == 0.0 {
            return None;
        }

        let seed = options().seed;
        let mut rng = RNG::new(hash!(seed, wo), hash!(uc, u));

        let (sr, dr, cr) = self.sample_weights();
        let (wi, flags) = if uc <= sr {
            // Specular reflection.
            let distrib = TrowbridgeReitzDistribution::new(self.alpha(), self.alpha());
            let mut wm = distrib.sample_wm(&wo, u);
            if cos_theta(&wo) * cos_theta(&wm) <= 0.0 {
                wm = -wm;
            }
            (reflect(&wo, &wm), BxDFFlags::GLOSSY_REFLECTION)
        } else if uc <= sr + cr {
            // Clear coat reflection.
            (self.sample_coating(&wo, u), BxDFFlags::GLOSSY_REFLECTION)
        } else if dr > 0.0 {
            let mut wi = cosine_sample_hemisphere(u);
            if min(rng.uniform_float(), ONE_MINUS_EPSILON) < self.params.subsurface {
                wi.z *= -1.0;
                (wi, BxDFFlags::DIFFUSE_TRANSMISSION)
            } else {
                (wi, BxDFFlags::DIFFUSE_REFLECTION)
            }
        } else {
            return None;
        };

        if wi.z == 0.0 {
            return None;
        }
        if flags.is_reflective() {
            if !same_hemisphere(&wo, &wi) || !sample_flags.allows_reflection() {
                return None;
            }
        } else if !sample_flags.allows_transmission() {
            return None;
        }

        let pdf = self.brdf_pdf(&wo, &wi, sample_flags);
        if pdf == 0.0 {
            return None;
        }
        let f = self.brdf_f(&wo, &wi);
        let wi = if flip { -wi } else { wi };
        Some(BSDFSample::new(f, wi, pdf, flags))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if wo.z < 0.0 {
            self.brdf_pdf(&-(*wo), &-(*wi), sample_flags)
        } else {
            self.brdf_pdf(wo, wi, sample_flags)
        }
    }

    fn flags(&self) -> BxDFFlags {
        let flags = BxDFFlags::GLOSSY_REFLECTION | BxDFFlags::DIFFUSE_REFLECTION;
        if self.params.subsurface > 0.0 {
            flags | BxDFFlags::DIFFUSE_TRANSMISSION
        } else {
            flags
        }
    }

    fn regularize(&mut self) {}
}

impl fmt::Display for DisneyBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.params;
        write!(
            f,
            "[ DisneyBxDF color: {} metallic: {} roughness: {} specular: {} clearcoat: {} \
             clearcoatGloss: {} subsurface: {} sheen: {} sheenTint: {} eta: {} lum: {} \
             isSpecular: {} ]",
            p.color,
            p.metallic,
            p.roughness,
            p.specular,
            p.clearcoat,
            p.clearcoat_gloss,
            p.subsurface,
            p.sheen,
            p.sheen_tint,
            p.eta,
            p.lum,
            p.is_specular
        )
    }
}

/// Schlick's weight `(1 - u)^5`.
///
/// * `u` - Cosine term.
#[inline]
fn schlick_fresnel(u: Float) -> Float {
    let m = clamp(1.0 - u, 0.0, 1.0);
    let m2 = m * m;
    m2 * m2 * m
}

/// Generalized Trowbridge-Reitz distribution with exponent 1, used by the clear
/// coat.
///
/// * `cos_theta` - Cosine of the half vector.
/// * `a`         - Roughness.
fn gtr1(cos_theta: Float, a: Float) -> Float {
    if a >= 1.0 {
        return INV_PI;
    }
    let a2 = a * a;
    let t = 1.0 + (a2 - 1.0) * cos_theta * cos_theta;
    (a2 - 1.0) / (PI * a2.ln() * t)
}

/// Generalized Trowbridge-Reitz distribution with exponent 2 (GGX).
///
/// * `cos_theta` - Cosine of the half vector.
/// * `a`         - Roughness.
fn gtr2(cos_theta: Float, a: Float) -> Float {
    let a2 = a * a;
    let t = 1.0 + (a2 - 1.0) * cos_theta * cos_theta;
    a2 / (PI * t * t)
}

/// Smith masking term for GGX.
///
/// * `w` - Direction.
/// * `a` - Roughness.
fn smith_ggx(w: &Vector3f, a: Float) -> Float {
    let tan2 = tan_2_theta(w);
    if tan2.is_infinite() {
        return 0.0;
    }
    2.0 / (1.0 + (1.0 + a * a * tan2).sqrt())
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    crate::prop_hemisphere_direction!(upper_direction);

    fn with(f: impl Fn(&mut DisneyParams)) -> DisneyBxDF {
        let mut p = DisneyParams {
            color: Spectrum::from([0.8, 0.5, 0.3, 0.2]),
            lum: 0.5,
            ..DisneyParams::default()
        };
        f(&mut p);
        DisneyBxDF::new(p)
    }

    #[test]
    fn plain_dielectric_weights() {
        let bxdf = with(|_| {});
        assert_eq!(bxdf.raw_weights(), (1.0, 1.0, 0.0));
        let (sr, dr, cr) = bxdf.sample_weights();
        assert_eq!((sr, dr, cr), (0.5, 0.5, 0.0));

        // The coat interval (sr, sr + cr] is empty.
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let u = Point2f::new(0.1, 0.5);
        let all = BxDFReflTransFlags::ALL;
        let spec = bxdf.sample_f(&wo, 0.5, &u, TransportMode::Radiance, all).unwrap();
        assert_eq!(spec.flags, BxDFFlags::GLOSSY_REFLECTION);
        let diff = bxdf.sample_f(&wo, 0.5001, &u, TransportMode::Radiance, all).unwrap();
        assert_eq!(diff.flags, BxDFFlags::DIFFUSE_REFLECTION);
    }

    #[test]
    fn sample_matches_pdf() {
        let configs = [
            with(|_| {}),
            with(|p| {
                p.metallic = 0.3;
                p.clearcoat = 0.7;
                p.sheen = 0.5;
            }),
            with(|p| {
                p.subsurface = 0.5;
                p.roughness = 0.2;
                p.is_specular = true;
            }),
        ];
        for bxdf in configs.iter() {
            for wo in incidence_directions() {
                for flags in [
                    BxDFReflTransFlags::ALL,
                    BxDFReflTransFlags::REFLECTION,
                    BxDFReflTransFlags::TRANSMISSION,
                ] {
                    assert_sample_matches_pdf(bxdf, &wo, TransportMode::Radiance, flags, 128);
                    assert_sample_matches_pdf(bxdf, &-wo, TransportMode::Radiance, flags, 128);
                }
            }
        }
    }

    #[test]
    fn transmission_requires_subsurface() {
        let opaque = with(|_| {});
        assert!(!opaque.flags().is_transmissive());
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.6, 0.0, -0.8);
        let mode = TransportMode::Radiance;
        assert!(opaque.f(&wo, &wi, mode).is_black());
        assert_eq!(opaque.pdf(&wo, &wi, mode, BxDFReflTransFlags::ALL), 0.0);

        let translucent = with(|p| p.subsurface = 0.4);
        assert!(translucent.flags().contains(BxDFFlags::DIFFUSE_TRANSMISSION));
        assert!(translucent.f(&wo, &wi, mode).is_nonzero());
        assert!(translucent.pdf(&wo, &wi, mode, BxDFReflTransFlags::ALL) > 0.0);
        assert_eq!(translucent.pdf(&wo, &wi, mode, BxDFReflTransFlags::REFLECTION), 0.0);
    }

    #[test]
    fn sampling_is_reproducible() {
        let bxdf = with(|p| p.subsurface = 0.5);
        let wo = Vector3f::new(0.0, 0.6, 0.8);
        let u = Point2f::new(0.25, 0.75);
        let all = BxDFReflTransFlags::ALL;
        let a = bxdf.sample_f(&wo, 0.9, &u, TransportMode::Radiance, all);
        let b = bxdf.sample_f(&wo, 0.9, &u, TransportMode::Radiance, all);
        assert_eq!(a, b);
    }

    #[test]
    fn metallic_specular_takes_base_color() {
        let bxdf = with(|p| {
            p.metallic = 1.0;
            p.roughness = 0.3;
        });
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let f = bxdf.f(&wo, &wo, TransportMode::Radiance);
        // Specular dominates at the mirror direction and is tinted by color.
        assert!(f[0] > f[3]);
        assert!(approx_eq!(Float, f[0] / f[3], 0.8 / 0.2, epsilon = 0.05));
    }

    proptest! {
        #[test]
        fn two_sided(wo in upper_direction(), wi in upper_direction()) {
            let bxdf = with(|p| p.clearcoat = 0.5);
            let a = bxdf.f(&wo, &wi, TransportMode::Radiance);
            let b = bxdf.f(&-wo, &-wi, TransportMode::Radiance);
            prop_assert_eq!(a, b);
        }
    }
}
