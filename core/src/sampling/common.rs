//! Common sampling functions.

use crate::geometry::*;
use crate::pbrt::*;
use crate::rng::*;

/// Uniformly sample a direction on a hemisphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_hemisphere(u: &Point2f) -> Vector3f {
    let z = u[0];
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a hemisphere.
#[inline]
pub fn uniform_hemisphere_pdf() -> Float {
    INV_TWO_PI
}

/// Uniformly sample a direction from a sphere.
///
/// * `u` - The random sample point.
pub fn uniform_sample_sphere(u: &Point2f) -> Vector3f {
    let z = 1.0 - 2.0 * u[0];
    let r = max(0.0, 1.0 - z * z).sqrt();
    let phi = TWO_PI * u[1];
    Vector3f::new(r * phi.cos(), r * phi.sin(), z)
}

/// Returns the PDF for uniformly sampling a direction from a sphere.
#[inline]
pub fn uniform_sphere_pdf() -> Float {
    INV_FOUR_PI
}

/// Uniformly sample a point on the disk using polar coordinates.
///
/// * `u` - The random sample point.
pub fn uniform_sample_disk(u: &Point2f) -> Point2f {
    let r = u[0].sqrt();
    let theta = TWO_PI * u[1];
    Point2f::new(r * theta.cos(), r * theta.sin())
}

/// Sample a point on a unit disk by mapping from a unit square to the unit
/// circle. The concentric mapping takes points in [-1, 1]^2 to unit disk by
/// uniformly mapping concentric squares to concentric circles.
///
/// * `u` - The random sample point.
pub fn concentric_sample_disk(u: &Point2f) -> Point2f {
    // Map uniform random numbers to [-1,1]^2.
    let u_offset = 2.0 * *u - Point2f::new(1.0, 1.0);

    // Handle degeneracy at the origin.
    if u_offset.x == 0.0 && u_offset.y == 0.0 {
        return Point2f::zero();
    }

    // Apply concentric mapping to point
    let (r, theta) = if abs(u_offset.x) > abs(u_offset.y) {
        (u_offset.x, PI_OVER_FOUR * (u_offset.y / u_offset.x))
    } else {
        (
            u_offset.y,
            PI_OVER_TWO - PI_OVER_FOUR * (u_offset.x / u_offset.y),
        )
    };

    r * Point2f::new(theta.cos(), theta.sin())
}

/// Sample a direction on a hemisphere using cosine-weighted sampling.
///
/// * `u` - The random sample point.
#[inline]
pub fn cosine_sample_hemisphere(u: &Point2f) -> Vector3f {
    let d = concentric_sample_disk(u);
    let z = max(0.0, 1.0 - d.x * d.x - d.y * d.y).sqrt();
    Vector3f::new(d.x, d.y, z)
}

/// Returns the PDF for cosine-weighted sampling a direction from a hemisphere.
///
/// * `cos_theta` - Cosine term of incident radiance.
#[inline]
pub fn cosine_hemisphere_pdf(cos_theta: Float) -> Float {
    cos_theta * INV_PI
}

/// Sample the exponential distribution `a * exp(-a * x)`.
///
/// * `u` - Uniform sample.
/// * `a` - Rate.
#[inline]
pub fn sample_exponential(u: Float, a: Float) -> Float {
    -(1.0 - u).ln() / a
}

/// Choose an index with probability proportional to its weight. Returns the
/// index, its probability and the sample remapped to [0, 1) so it can be
/// reused, or `None` if all weights are zero.
///
/// * `weights` - Non-negative weights.
/// * `u`       - Uniform sample.
pub fn sample_discrete(weights: &[Float], u: Float) -> Option<(usize, Float, Float)> {
    let sum_weights: Float = weights.iter().sum();
    if sum_weights == 0.0 {
        return None;
    }

    // Compute rescaled sample and find the bucket it falls in.
    let mut up = u * sum_weights;
    if up == sum_weights {
        up = next_float_down(up);
    }

    let mut offset = 0;
    let mut sum = 0.0;
    while offset + 1 < weights.len() && sum + weights[offset] <= up {
        sum += weights[offset];
        offset += 1;
    }

    let pmf = weights[offset] / sum_weights;
    let u_remapped = min((up - sum) / weights[offset], ONE_MINUS_EPSILON);
    Some((offset, pmf, u_remapped))
}

/// Sample the logistic distribution restricted to [a, b].
///
/// * `u` - Uniform sample.
/// * `s` - Scale.
/// * `a` - Lower bound.
/// * `b` - Upper bound.
pub fn sample_trimmed_logistic(u: Float, s: Float, a: Float, b: Float) -> Float {
    debug_assert!(a < b);
    let u = lerp(u, logistic_cdf(a, s), logistic_cdf(b, s));
    let x = -s * (1.0 / u - 1.0).ln();
    clamp(x, a, b)
}

/// Weight samples using the balance heuristic.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn balance_heuristic(nf: Int, f_pdf: Float, ng: Int, g_pdf: Float) -> Float {
    (nf as Float * f_pdf) / (nf as Float * f_pdf + ng as Float * g_pdf)
}

/// Weight samples using the power heuristic.
///
/// * `nf`    - Number of samples taken from `f_pdf`.
/// * `f_pdf` - First sampling distribution.
/// * `ng`    - Number of samples taken from `g_pdf`.
/// * `g_pdf` - Second sampling distribution.
#[inline]
pub fn power_heuristic(nf: Int, f_pdf: Float, ng: Int, g_pdf: Float) -> Float {
    let f = nf as Float * f_pdf;
    let g = ng as Float * g_pdf;
    if f.is_infinite() && f > 0.0 {
        return 1.0;
    }
    (f * f) / (f * f + g * g)
}
