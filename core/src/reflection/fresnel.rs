//! Fresnel Dielectrics and Conductors

use crate::pbrt::*;
use crate::spectrum::*;
use num_complex::Complex;

/// Complex number type for conductor indices of refraction.
pub type ComplexFloat = Complex<Float>;

/// Returns the Fresnel reflectance at a dielectric interface for unpolarized
/// light. A negative cosine means the incident direction is on the inside and
/// the relative IOR is inverted.
///
/// * `cos_theta_i` - Cosine of the angle between incident direction and the
///                   surface normal.
/// * `eta`         - Relative IOR, transmitted over incident.
pub fn fr_dielectric(cos_theta_i: Float, eta: Float) -> Float {
    let mut cos_theta_i = clamp(cos_theta_i, -1.0, 1.0);
    let mut eta = eta;

    // Potentially flip interface orientation.
    if cos_theta_i < 0.0 {
        eta = 1.0 / eta;
        cos_theta_i = -cos_theta_i;
    }

    // Compute cos(theta_t) using Snell's law.
    let sin_2_theta_i = 1.0 - sqr(cos_theta_i);
    let sin_2_theta_t = sin_2_theta_i / sqr(eta);
    if sin_2_theta_t >= 1.0 {
        // Total internal reflection.
        return 1.0;
    }
    let cos_theta_t = safe_sqrt(1.0 - sin_2_theta_t);

    let r_parl = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);
    let r_perp = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);
    (sqr(r_parl) + sqr(r_perp)) / 2.0
}

/// Returns the Fresnel reflectance at a conductor for unpolarized light using a
/// complex index of refraction `eta + i k`.
///
/// * `cos_theta_i` - Cosine of the angle between incident direction and the
///                   surface normal.
/// * `eta`         - Complex relative IOR.
pub fn fr_complex(cos_theta_i: Float, eta: ComplexFloat) -> Float {
    let cos_theta_i = clamp(cos_theta_i, 0.0, 1.0);
    let sin_2_theta_i = 1.0 - sqr(cos_theta_i);
    let sin_2_theta_t: ComplexFloat = sin_2_theta_i / (eta * eta);
    let cos_theta_t = (ComplexFloat::new(1.0, 0.0) - sin_2_theta_t).sqrt();

    let r_parl = (eta * cos_theta_i - cos_theta_t) / (eta * cos_theta_i + cos_theta_t);
    let r_perp = (cos_theta_i - eta * cos_theta_t) / (cos_theta_i + eta * cos_theta_t);
    (r_parl.norm_sqr() + r_perp.norm_sqr()) / 2.0
}

/// Evaluates `fr_complex()` independently at each wavelength.
///
/// * `cos_theta_i` - Cosine of the angle between incident direction and the
///                   surface normal.
/// * `eta`         - Real part of the IOR.
/// * `k`           - Absorption coefficient.
pub fn fr_complex_spectrum(cos_theta_i: Float, eta: &Spectrum, k: &Spectrum) -> Spectrum {
    let mut r = Spectrum::ZERO;
    for i in 0..N_SPECTRUM_SAMPLES {
        r[i] = fr_complex(cos_theta_i, ComplexFloat::new(eta[i], k[i]));
    }
    r
}

/// Returns the first moment of the dielectric Fresnel reflectance, fitted by a
/// polynomial in the relative IOR.
///
/// * `eta` - Relative IOR.
pub fn fresnel_moment_1(eta: Float) -> Float {
    if eta < 1.0 {
        evaluate_polynomial(
            eta,
            &[0.45966, -1.73965, 3.37668, -3.904945, 2.49277, -0.68441],
        )
    } else {
        evaluate_polynomial(
            eta,
            &[-4.61686, 11.1136, -10.4646, 5.11455, -1.27198, 0.12746],
        )
    }
}

/// Returns the second moment of the dielectric Fresnel reflectance.
///
/// * `eta` - Relative IOR.
pub fn fresnel_moment_2(eta: Float) -> Float {
    if eta < 1.0 {
        evaluate_polynomial(
            eta,
            &[0.27614, -0.87350, 1.12077, -0.65095, 0.07883, 0.04860],
        )
    } else {
        let r_eta = 1.0 / eta;
        let r_eta_2 = r_eta * r_eta;
        let r_eta_3 = r_eta_2 * r_eta;
        -547.033 + 45.3087 * r_eta_3 - 218.725 * r_eta_2
            + 458.843 * r_eta
            + evaluate_polynomial(eta, &[0.0, 404.557, -189.519, 54.9327, -9.00603, 0.63942])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    #[test]
    fn dielectric_normal_incidence() {
        assert!(approx_eq!(Float, fr_dielectric(1.0, 1.5), 0.04, epsilon = 0.00001));
        assert!(approx_eq!(Float, fr_dielectric(-1.0, 1.5), 0.04, epsilon = 0.00001));
        assert!(approx_eq!(Float, fr_dielectric(0.7, 1.0), 0.0, epsilon = 0.00001));
    }

    #[test]
    fn dielectric_total_internal_reflection() {
        assert_eq!(fr_dielectric(-0.2, 1.5), 1.0);
    }

    #[test]
    fn moments_vanish_for_index_matched_interface() {
        assert!(abs(fresnel_moment_1(1.0)) < 0.01);
        assert!(abs(fresnel_moment_1(0.9999)) < 0.01);
        assert!(abs(fresnel_moment_2(1.0)) < 0.01);
    }

    #[test]
    fn conductor_spectrum_matches_scalar() {
        let eta = Spectrum::from([0.2, 0.9, 1.1, 1.4]);
        let k = Spectrum::from([3.9, 2.4, 2.2, 1.9]);
        let r = fr_complex_spectrum(0.5, &eta, &k);
        for i in 0..N_SPECTRUM_SAMPLES {
            assert_eq!(r[i], fr_complex(0.5, ComplexFloat::new(eta[i], k[i])));
            assert!(r[i] > 0.0 && r[i] < 1.0);
        }
    }

    proptest! {
        #[test]
        fn complex_without_absorption_is_dielectric(
            cos in 0.01f32..1.0f32,
            eta in 1.01f32..3.0f32,
        ) {
            let a = fr_complex(cos, ComplexFloat::new(eta, 0.0));
            let b = fr_dielectric(cos, eta);
            prop_assert!(approx_eq!(Float, a, b, epsilon = 0.0001));
        }

        #[test]
        fn dielectric_in_unit_interval(cos in -1.0f32..1.0f32, eta in 1.0f32..3.0f32) {
            let r = fr_dielectric(cos, eta);
            prop_assert!((0.0..=1.0).contains(&r));
        }
    }
}
