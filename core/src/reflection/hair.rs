//! Hair

use super::*;

/// Number of explicitly modeled scattering orders. Higher orders are lumped
/// into a single isotropic term.
const P_MAX: usize = 3;

/// sqrt(π / 8)
const SQRT_PI_OVER_8: Float = 0.626_657_07;

/// Far-field scattering from a rough dielectric cylinder with an absorbing
/// interior and tilted cuticle scales. The local frame has the fiber along the
/// x-axis and the surface normal along z.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HairBxDF {
    /// Offset of the ray across the fiber width in [-1, 1].
    h: Float,

    /// Index of refraction of the fiber interior.
    eta: Float,

    /// Absorption coefficient of the fiber interior.
    sigma_a: Spectrum,

    /// Longitudinal roughness in [0, 1].
    beta_m: Float,

    /// Azimuthal roughness in [0, 1].
    beta_n: Float,

    /// Longitudinal variance for each scattering order.
    v: [Float; P_MAX + 1],

    /// Logistic scale of the azimuthal distribution.
    s: Float,

    /// sin(2^k α) for the scale tilt α.
    sin_2k_alpha: [Float; P_MAX],

    /// cos(2^k α) for the scale tilt α.
    cos_2k_alpha: [Float; P_MAX],
}

impl HairBxDF {
    /// Create a new instance of `HairBxDF`.
    ///
    /// * `h`             - Offset across the fiber width in [-1, 1].
    /// * `eta`           - Index of refraction of the interior.
    /// * `sigma_a`       - Absorption coefficient of the interior.
    /// * `beta_m`        - Longitudinal roughness in [0, 1].
    /// * `beta_n`        - Azimuthal roughness in [0, 1].
    /// * `alpha_degrees` - Scale tilt angle in degrees.
    pub fn new(
        h: Float,
        eta: Float,
        sigma_a: Spectrum,
        beta_m: Float,
        beta_n: Float,
        alpha_degrees: Float,
    ) -> Self {
        let h = clamp_param("h", h, -1.0, 1.0);
        let beta_m = clamp_param("beta_m", beta_m, 0.0, 1.0);
        let beta_n = clamp_param("beta_n", beta_n, 0.0, 1.0);

        // Longitudinal variance per scattering order.
        let mut v = [0.0; P_MAX + 1];
        v[0] = sqr(0.726 * beta_m + 0.812 * sqr(beta_m) + 3.7 * beta_m.powi(20));
        v[1] = 0.25 * v[0];
        v[2] = 4.0 * v[0];
        for p in 3..=P_MAX {
            v[p] = v[2];
        }

        // Azimuthal logistic scale.
        let s = SQRT_PI_OVER_8 * (0.265 * beta_n + 1.194 * sqr(beta_n) + 5.372 * beta_n.powi(22));

        // Scale tilt terms by repeated angle doubling.
        let mut sin_2k_alpha = [0.0; P_MAX];
        let mut cos_2k_alpha = [0.0; P_MAX];
        sin_2k_alpha[0] = radians(alpha_degrees).sin();
        cos_2k_alpha[0] = safe_sqrt(1.0 - sqr(sin_2k_alpha[0]));
        for i in 1..P_MAX {
            sin_2k_alpha[i] = 2.0 * cos_2k_alpha[i - 1] * sin_2k_alpha[i - 1];
            cos_2k_alpha[i] = sqr(cos_2k_alpha[i - 1]) - sqr(sin_2k_alpha[i - 1]);
        }

        Self {
            h,
            eta,
            sigma_a,
            beta_m,
            beta_n,
            v,
            s,
            sin_2k_alpha,
            cos_2k_alpha,
        }
    }

    /// Returns the absorption coefficient that produces approximately the
    /// given diffuse reflectance for a fiber with azimuthal roughness `beta_n`.
    ///
    /// * `c`      - Target reflectance.
    /// * `beta_n` - Azimuthal roughness.
    pub fn sigma_a_from_reflectance(c: &Spectrum, beta_n: Float) -> Spectrum {
        let d = 5.969 - 0.215 * beta_n + 2.532 * sqr(beta_n) - 10.73 * beta_n.powi(3)
            + 5.574 * beta_n.powi(4)
            + 0.245 * beta_n.powi(5);
        c.map(|ci| sqr(ci.ln() / d))
    }

    /// Returns sin θo and cos θo rotated by the scale tilt for order `p`.
    ///
    /// * `p`           - Scattering order.
    /// * `sin_theta_o` - Sine of the outgoing longitudinal angle.
    /// * `cos_theta_o` - Cosine of the outgoing longitudinal angle.
    fn tilt(&self, p: usize, sin_theta_o: Float, cos_theta_o: Float) -> (Float, Float) {
        let (sin_p, cos_p) = match p {
            0 => (
                sin_theta_o * self.cos_2k_alpha[1] - cos_theta_o * self.sin_2k_alpha[1],
                cos_theta_o * self.cos_2k_alpha[1] + sin_theta_o * self.sin_2k_alpha[1],
            ),
            1 => (
                sin_theta_o * self.cos_2k_alpha[0] + cos_theta_o * self.sin_2k_alpha[0],
                cos_theta_o * self.cos_2k_alpha[0] - sin_theta_o * self.sin_2k_alpha[0],
            ),
            2 => (
                sin_theta_o * self.cos_2k_alpha[2] + cos_theta_o * self.sin_2k_alpha[2],
                cos_theta_o * self.cos_2k_alpha[2] - sin_theta_o * self.sin_2k_alpha[2],
            ),
            _ => (sin_theta_o, cos_theta_o),
        };
        // Scale adjustment can push cos θo out of range.
        (sin_p, abs(cos_p))
    }

    /// Returns the azimuthal angle γt of the refracted ray.
    ///
    /// * `sin_theta_o` - Sine of the outgoing longitudinal angle.
    /// * `cos_theta_o` - Cosine of the outgoing longitudinal angle.
    fn gamma_t(&self, sin_theta_o: Float, cos_theta_o: Float) -> (Float, Float) {
        let etap = safe_sqrt(sqr(self.eta) - sqr(sin_theta_o)) / cos_theta_o;
        let sin_gamma_t = self.h / etap;
        (safe_asin(sin_gamma_t), safe_sqrt(1.0 - sqr(sin_gamma_t)))
    }

    /// Returns the transmittance of a single pass through the fiber interior.
    ///
    /// * `sin_theta_o` - Sine of the outgoing longitudinal angle.
    /// * `cos_gamma_t` - Cosine of the refracted azimuthal angle.
    fn transmittance(&self, sin_theta_o: Float, cos_gamma_t: Float) -> Spectrum {
        let sin_theta_t = sin_theta_o / self.eta;
        let cos_theta_t = safe_sqrt(1.0 - sqr(sin_theta_t));
        (-self.sigma_a * (2.0 * cos_gamma_t / cos_theta_t)).exp()
    }

    /// Returns the discrete probabilities of sampling each scattering order.
    ///
    /// * `cos_theta_o` - Cosine of the outgoing longitudinal angle.
    fn ap_pdf(&self, cos_theta_o: Float) -> [Float; P_MAX + 1] {
        let sin_theta_o = safe_sqrt(1.0 - sqr(cos_theta_o));
        let (_, cos_gamma_t) = self.gamma_t(sin_theta_o, cos_theta_o);
        let t = self.transmittance(sin_theta_o, cos_gamma_t);
        let ap = ap(cos_theta_o, self.eta, self.h, &t);

        let mut pdf = [0.0; P_MAX + 1];
        let sum_y: Float = ap.iter().map(|a| a.average()).sum();
        if sum_y > 0.0 {
            for (pdf, a) in pdf.iter_mut().zip(ap.iter()) {
                *pdf = a.average() / sum_y;
            }
        }
        pdf
    }

    /// Evaluates the sampling density for the longitudinal angles and the
    /// azimuthal difference `dphi`.
    ///
    /// * `ap_pdf`  - Probabilities of each scattering order.
    /// * `theta_o` - Sine and cosine of the outgoing longitudinal angle.
    /// * `theta_i` - Sine and cosine of the incident longitudinal angle.
    /// * `dphi`    - Azimuthal difference.
    /// * `gamma`   - Azimuthal offsets γo and γt.
    fn mixture_pdf(
        &self,
        ap_pdf: &[Float; P_MAX + 1],
        theta_o: (Float, Float),
        theta_i: (Float, Float),
        dphi: Float,
        gamma: (Float, Float),
    ) -> Float {
        let (sin_theta_o, cos_theta_o) = theta_o;
        let (sin_theta_i, cos_theta_i) = theta_i;
        let (gamma_o, gamma_t) = gamma;
        let mut pdf = 0.0;
        for p in 0..P_MAX {
            let (sin_p, cos_p) = self.tilt(p, sin_theta_o, cos_theta_o);
            pdf += mp(cos_theta_i, cos_p, sin_theta_i, sin_p, self.v[p])
                * ap_pdf[p]
                * np(dphi, p, self.s, gamma_o, gamma_t);
        }
        pdf += mp(cos_theta_i, cos_theta_o, sin_theta_i, sin_theta_o, self.v[P_MAX])
            * ap_pdf[P_MAX]
            * INV_TWO_PI;
        pdf
    }
}

impl BxDFI for HairBxDF {
    fn f(&self, wo: &Vector3f, wi: &Vector3f, _mode: TransportMode) -> Spectrum {
        // Terms related to `wo`.
        let sin_theta_o = wo.x;
        let cos_theta_o = safe_sqrt(1.0 - sqr(sin_theta_o));
        let phi_o = wo.z.atan2(wo.y);
        let gamma_o = safe_asin(self.h);

        // Terms related to `wi`.
        let sin_theta_i = wi.x;
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));
        let phi_i = wi.z.atan2(wi.y);

        let (gamma_t, cos_gamma_t) = self.gamma_t(sin_theta_o, cos_theta_o);
        let t = self.transmittance(sin_theta_o, cos_gamma_t);

        let phi = phi_i - phi_o;
        let ap = ap(cos_theta_o, self.eta, self.h, &t);
        let mut fsum = Spectrum::ZERO;
        for p in 0..P_MAX {
            let (sin_p, cos_p) = self.tilt(p, sin_theta_o, cos_theta_o);
            fsum += ap[p]
                * (mp(cos_theta_i, cos_p, sin_theta_i, sin_p, self.v[p])
                    * np(phi, p, self.s, gamma_o, gamma_t));
        }

        // Remaining orders.
        fsum += ap[P_MAX]
            * (mp(cos_theta_i, cos_theta_o, sin_theta_i, sin_theta_o, self.v[P_MAX]) * INV_TWO_PI);

        if abs_cos_theta(wi) > 0.0 {
            fsum /= abs_cos_theta(wi);
        }
        fsum
    }

    fn sample_f(
        &self,
        wo: &Vector3f,
        uc: Float,
        u: &Point2f,
        mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Option<BSDFSample> {
        if !sample_flags.allows_reflection() {
            return None;
        }

        let sin_theta_o = wo.x;
        let cos_theta_o = safe_sqrt(1.0 - sqr(sin_theta_o));
        let phi_o = wo.z.atan2(wo.y);
        let gamma_o = safe_asin(self.h);

        // Choose the scattering order.
        let ap_pdf = self.ap_pdf(cos_theta_o);
        let (p, _, uc) = sample_discrete(&ap_pdf, uc)?;
        let (sin_p, cos_p) = self.tilt(p, sin_theta_o, cos_theta_o);

        // Sample Mp for θi.
        let v = self.v[p];
        let cos_theta = 1.0 + v * (max(u[0], 1e-5) + (1.0 - u[0]) * (-2.0 / v).exp()).ln();
        let sin_theta = safe_sqrt(1.0 - sqr(cos_theta));
        let cos_phi = (TWO_PI * u[1]).cos();
        let sin_theta_i = -cos_theta * sin_p + sin_theta * cos_phi * cos_p;
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));

        // Sample Np for Δφ.
        let (gamma_t, _) = self.gamma_t(sin_theta_o, cos_theta_o);
        let dphi = if p < P_MAX {
            phi(p, gamma_o, gamma_t) + sample_trimmed_logistic(uc, self.s, -PI, PI)
        } else {
            TWO_PI * uc
        };

        let phi_i = phi_o + dphi;
        let wi = Vector3f::new(
            sin_theta_i,
            cos_theta_i * phi_i.cos(),
            cos_theta_i * phi_i.sin(),
        );

        let pdf = self.mixture_pdf(
            &ap_pdf,
            (sin_theta_o, cos_theta_o),
            (sin_theta_i, cos_theta_i),
            dphi,
            (gamma_o, gamma_t),
        );
        if pdf <= 0.0 {
            return None;
        }
        Some(BSDFSample::new(self.f(wo, &wi, mode), wi, pdf, self.flags()))
    }

    fn pdf(
        &self,
        wo: &Vector3f,
        wi: &Vector3f,
        _mode: TransportMode,
        sample_flags: BxDFReflTransFlags,
    ) -> Float {
        if !sample_flags.allows_reflection() {
            return 0.0;
        }

        let sin_theta_o = wo.x;
        let cos_theta_o = safe_sqrt(1.0 - sqr(sin_theta_o));
        let phi_o = wo.z.atan2(wo.y);
        let gamma_o = safe_asin(self.h);

        let sin_theta_i = wi.x;
        let cos_theta_i = safe_sqrt(1.0 - sqr(sin_theta_i));
        let phi_i = wi.z.atan2(wi.y);

        let (gamma_t, _) = self.gamma_t(sin_theta_o, cos_theta_o);
        let ap_pdf = self.ap_pdf(cos_theta_o);
        self.mixture_pdf(
            &ap_pdf,
            (sin_theta_o, cos_theta_o),
            (sin_theta_i, cos_theta_i),
            phi_i - phi_o,
            (gamma_o, gamma_t),
        )
    }

    fn flags(&self) -> BxDFFlags {
        BxDFFlags::GLOSSY_REFLECTION
    }

    fn regularize(&mut self) {}
}

impl fmt::Display for HairBxDF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[ HairBxDF h: {} eta: {} beta_m: {} beta_n: {} v[0]: {} s: {} sigma_a: {} ]",
            self.h, self.eta, self.beta_m, self.beta_n, self.v[0], self.s, self.sigma_a
        )
    }
}

/// Clamp a hair parameter to its valid range, logging a warning when it was
/// out of range.
fn clamp_param(name: &str, value: Float, low: Float, high: Float) -> Float {
    if value < low || value > high {
        warn!(
            "Hair parameter {} = {} is outside [{}, {}]; clamping.",
            name, value, low, high
        );
        clamp(value, low, high)
    } else {
        value
    }
}

/// Longitudinal scattering function.
fn mp(
    cos_theta_i: Float,
    cos_theta_o: Float,
    sin_theta_i: Float,
    sin_theta_o: Float,
    v: Float,
) -> Float {
    let a = cos_theta_i * cos_theta_o / v;
    let b = sin_theta_i * sin_theta_o / v;
    let mp = if v <= 0.1 {
        (log_i0(a) - b - 1.0 / v + 0.6931 + (1.0 / (2.0 * v)).ln()).exp()
    } else {
        ((-b).exp() * i0(a)) / ((1.0 / v).sinh() * 2.0 * v)
    };
    debug_assert!(mp.is_finite());
    mp
}

/// Attenuation for each scattering order.
///
/// * `cos_theta_o` - Cosine of the outgoing longitudinal angle.
/// * `eta`         - Index of refraction.
/// * `h`           - Offset across the fiber.
/// * `t`           - Single pass transmittance.
fn ap(cos_theta_o: Float, eta: Float, h: Float, t: &Spectrum) -> [Spectrum; P_MAX + 1] {
    let mut ap = [Spectrum::ZERO; P_MAX + 1];

    // Reflection at the first interface.
    let cos_gamma_o = safe_sqrt(1.0 - sqr(h));
    let cos_theta = cos_theta_o * cos_gamma_o;
    let f = fr_dielectric(cos_theta, eta);
    ap[0] = Spectrum::new(f);

    // Transmission through the fiber.
    ap[1] = *t * sqr(1.0 - f);
    for p in 2..P_MAX {
        ap[p] = ap[p - 1] * *t * f;
    }

    // Sum of the remaining orders as a geometric series.
    let tf = *t * f;
    let denom = Spectrum::ONE - tf;
    if denom.is_nonzero() {
        ap[P_MAX] = (ap[P_MAX - 1] * tf).safe_div(&denom);
    }
    ap
}

/// Net azimuthal deflection of order `p`.
#[inline]
fn phi(p: usize, gamma_o: Float, gamma_t: Float) -> Float {
    let p = p as Float;
    2.0 * p * gamma_t - 2.0 * gamma_o + p * PI
}

/// Azimuthal scattering function.
fn np(phi_diff: Float, p: usize, s: Float, gamma_o: Float, gamma_t: Float) -> Float {
    let mut dphi = phi_diff - phi(p, gamma_o, gamma_t);
    while dphi > PI {
        dphi -= TWO_PI;
    }
    while dphi < -PI {
        dphi += TWO_PI;
    }
    trimmed_logistic(dphi, s, -PI, PI)
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;
    use crate::rng::RNG;
    use float_cmp::*;

    #[test]
    fn lossless_fiber_samples_with_unit_weight() {
        let mut rng = RNG::new(11, 0);
        for beta_m in [0.2, 0.5, 0.9] {
            for beta_n in [0.3, 0.6, 1.0] {
                let h = -1.0 + 2.0 * rng.uniform_float();
                let hair = HairBxDF::new(h, 1.55, Spectrum::ZERO, beta_m, beta_n, 0.0);

                let (uc, u2) = random_samples(41, 256);
                for (uc, u) in uc.iter().zip(u2.iter()) {
                    let wo = uniform_sample_sphere(&Point2f::new(
                        rng.uniform_float(),
                        rng.uniform_float(),
                    ));
                    let bs = match hair.sample_f(
                        &wo,
                        *uc,
                        u,
                        TransportMode::Radiance,
                        BxDFReflTransFlags::ALL,
                    ) {
                        Some(bs) => bs,
                        None => continue,
                    };
                    if bs.wi.z == 0.0 {
                        continue;
                    }
                    let weight = bs.f[0] * abs_cos_theta(&bs.wi) / bs.pdf;
                    assert!(
                        approx_eq!(Float, weight, 1.0, epsilon = 0.001),
                        "weight {} for {}",
                        weight,
                        hair
                    );
                }
            }
        }
    }

    #[test]
    fn sample_matches_pdf() {
        let c = Spectrum::from([0.3, 0.4, 0.5, 0.6]);
        let sigma_a = HairBxDF::sigma_a_from_reflectance(&c, 0.4);
        let hair = HairBxDF::new(0.3, 1.55, sigma_a, 0.3, 0.4, 2.0);
        let wo = Vector3f::new(0.3, 0.6, (1.0 - 0.09 - 0.36 as Float).sqrt());

        let (uc, u2) = random_samples(43, 256);
        for (uc, u) in uc.iter().zip(u2.iter()) {
            if let Some(bs) =
                hair.sample_f(&wo, *uc, u, TransportMode::Radiance, BxDFReflTransFlags::ALL)
            {
                let pdf = hair.pdf(&wo, &bs.wi, TransportMode::Radiance, BxDFReflTransFlags::ALL);
                assert!(abs(pdf - bs.pdf) <= 0.01 * max(1.0, bs.pdf), "{} vs {}", pdf, bs.pdf);
            }
        }
    }

    #[test]
    fn pdf_integrates_to_one() {
        let hair = HairBxDF::new(0.1, 1.55, Spectrum::new(0.5), 0.5, 0.5, 2.0);
        let wo = Vector3f::new(0.2, 0.0, (1.0 - 0.04 as Float).sqrt());

        let mut rng = RNG::new(13, 0);
        let n = 100_000;
        let mut sum = 0.0;
        for _ in 0..n {
            let u = Point2f::new(rng.uniform_float(), rng.uniform_float());
            let wi = uniform_sample_sphere(&u);
            sum += hair.pdf(&wo, &wi, TransportMode::Radiance, BxDFReflTransFlags::ALL)
                / uniform_sphere_pdf();
        }
        assert!(approx_eq!(Float, sum / n as Float, 1.0, epsilon = 0.03));
    }

    #[test]
    fn reflectance_to_absorption() {
        let c = Spectrum::from([1.0, 0.5, 0.25, 0.1]);
        let sigma_a = HairBxDF::sigma_a_from_reflectance(&c, 0.3);
        assert_eq!(sigma_a[0], 0.0);
        assert!(sigma_a[1] < sigma_a[2]);
        assert!(sigma_a[2] < sigma_a[3]);
    }

    #[test]
    fn out_of_range_parameters_are_clamped() {
        let hair = HairBxDF::new(1.5, 1.55, Spectrum::ZERO, -0.2, 2.0, 0.0);
        assert_eq!(hair.h, 1.0);
        assert_eq!(hair.beta_m, 0.0);
        assert_eq!(hair.beta_n, 1.0);
    }

    #[test]
    fn transmission_requests_are_rejected() {
        let hair = HairBxDF::new(0.0, 1.55, Spectrum::new(0.2), 0.3, 0.3, 2.0);
        let wo = Vector3f::new(0.0, 0.0, 1.0);
        let u = Point2f::new(0.5, 0.5);
        let flags = BxDFReflTransFlags::TRANSMISSION;
        assert!(hair.sample_f(&wo, 0.5, &u, TransportMode::Radiance, flags).is_none());
        assert_eq!(hair.pdf(&wo, &wo, TransportMode::Radiance, flags), 0.0);
        assert_eq!(hair.flags(), BxDFFlags::GLOSSY_REFLECTION);
    }
}
