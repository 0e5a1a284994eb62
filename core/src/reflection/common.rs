//! Common

#![allow(dead_code)]
use crate::geometry::*;
use crate::pbrt::*;

/// Returns the cosine of the angle θ measured from the given direction to the
/// z-axis.
///
/// * `w` - The direction vector.
#[inline]
pub fn cos_theta(w: &Vector3f) -> Float {
    w.z
}

/// Returns the square of the cosine of the angle θ measured from the given
/// direction to the z-axis.
///
/// * `w` - The direction vector.
#[inline]
pub fn cos_2_theta(w: &Vector3f) -> Float {
    w.z * w.z
}

/// Returns the absolute value of the cosine of the angle θ measured from the
/// given direction to the z-axis.
///
/// * `w` - The direction vector.
#[inline]
pub fn abs_cos_theta(w: &Vector3f) -> Float {
    abs(w.z)
}

/// Returns the square of the sine of the angle θ measured from the given
/// direction to the z-axis.
///
/// * `w` - The direction vector.
#[inline]
pub fn sin_2_theta(w: &Vector3f) -> Float {
    max(0.0, 1.0 - cos_2_theta(w))
}

/// Returns the sine of the angle θ measured from the given direction to the
/// z-axis.
///
/// * `w` - The direction vector.
#[inline]
pub fn sin_theta(w: &Vector3f) -> Float {
    sin_2_theta(w).sqrt()
}

/// Returns the tangent of the angle θ.
///
/// * `w` - The direction vector.
#[inline]
pub fn tan_theta(w: &Vector3f) -> Float {
    sin_theta(w) / cos_theta(w)
}

/// Returns the square of the tangent of the angle θ.
///
/// * `w` - The direction vector.
#[inline]
pub fn tan_2_theta(w: &Vector3f) -> Float {
    sin_2_theta(w) / cos_2_theta(w)
}

/// Returns the cosine of the angle Φ measured from the given direction to the
/// x-axis after projection to the xy plane.
///
/// * `w` - The direction vector.
#[inline]
pub fn cos_phi(w: &Vector3f) -> Float {
    let s = sin_theta(w);
    if s == 0.0 {
        1.0
    } else {
        clamp(w.x / s, -1.0, 1.0)
    }
}

/// Returns the sine of the angle Φ measured from the given direction to the
/// x-axis after projection to the xy plane.
///
/// * `w` - The direction vector.
#[inline]
pub fn sin_phi(w: &Vector3f) -> Float {
    let s = sin_theta(w);
    if s == 0.0 {
        0.0
    } else {
        clamp(w.y / s, -1.0, 1.0)
    }
}

/// Returns `true` if two vectors are in the same hemisphere.
///
/// * `w`  - First vector.
/// * `wp` - Second vector.
#[inline]
pub fn same_hemisphere(w: &Vector3f, wp: &Vector3f) -> bool {
    w.z * wp.z > 0.0
}

/// Computes the reflection of a vector around a normal.
///
/// * `wo` - Vector to reflect.
/// * `n`  - Normal.
#[inline]
pub fn reflect(wo: &Vector3f, n: &Vector3f) -> Vector3f {
    -(*wo) + 2.0 * wo.dot(n) * n
}

/// Computes the refracted direction given the incident direction `wi`, a
/// surface normal `n` and the relative index of refraction `eta`. When `wi`
/// lies below the normal, the interface is flipped and the reciprocal `eta` is
/// used. Returns the refracted direction and the relative IOR that applied, or
/// `None` on total internal reflection.
///
/// * `wi`  - Incident direction.
/// * `n`   - Surface normal.
/// * `eta` - Ratio of indices of refraction, transmitted over incident.
pub fn refract(wi: &Vector3f, n: &Vector3f, eta: Float) -> Option<(Vector3f, Float)> {
    let mut n = *n;
    let mut eta = eta;
    let mut cos_theta_i = n.dot(wi);

    // Potentially flip interface orientation.
    if cos_theta_i < 0.0 {
        eta = 1.0 / eta;
        cos_theta_i = -cos_theta_i;
        n = -n;
    }

    // Compute cos(theta_t) using Snell's law.
    let sin_2_theta_i = max(0.0, 1.0 - sqr(cos_theta_i));
    let sin_2_theta_t = sin_2_theta_i / sqr(eta);

    // Handle total internal reflection for transmission.
    if sin_2_theta_t >= 1.0 {
        return None;
    }

    let cos_theta_t = safe_sqrt(1.0 - sin_2_theta_t);
    let wt = -(*wi) / eta + (cos_theta_i / eta - cos_theta_t) * n;
    Some((wt, eta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;
    use proptest::prelude::*;

    crate::prop_hemisphere_direction!(upper_direction);

    #[test]
    fn reflect_about_normal() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wo = Vector3f::new(0.6, 0.0, 0.8);
        let r = reflect(&wo, &n);
        assert!(approx_eq!(Float, r.x, -0.6, epsilon = 0.00001));
        assert!(approx_eq!(Float, r.z, 0.8, epsilon = 0.00001));
    }

    #[test]
    fn refract_total_internal_reflection() {
        // Leaving glass at a grazing angle.
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.9, 0.0, -(1.0 - 0.81 as Float).sqrt());
        assert!(refract(&wi, &n, 1.5).is_none());
    }

    #[test]
    fn refract_normal_incidence_passes_straight() {
        let n = Vector3f::new(0.0, 0.0, 1.0);
        let wi = Vector3f::new(0.0, 0.0, 1.0);
        let (wt, etap) = refract(&wi, &n, 1.5).unwrap();
        assert!(approx_eq!(Float, wt.z, -1.0, epsilon = 0.00001));
        assert_eq!(etap, 1.5);
    }

    proptest! {
        #[test]
        fn refraction_obeys_snell(wi in upper_direction(), eta in 1.0f32..2.5f32) {
            let n = Vector3f::new(0.0, 0.0, 1.0);
            let (wt, etap) = refract(&wi, &n, eta).unwrap();
            prop_assert!(wt.z < 0.0);
            prop_assert!(approx_eq!(Float, wt.length(), 1.0, epsilon = 0.001));
            prop_assert!(approx_eq!(Float, sin_theta(&wi), etap * sin_theta(&wt), epsilon = 0.001));
        }

        #[test]
        fn trig_identities_hold(w in upper_direction()) {
            let phi = sqr(cos_phi(&w)) + sqr(sin_phi(&w));
            let theta = sin_2_theta(&w) + cos_2_theta(&w);
            prop_assert!(approx_eq!(Float, phi, 1.0, epsilon = 0.001));
            prop_assert!(approx_eq!(Float, theta, 1.0, epsilon = 0.0001));
        }
    }
}
