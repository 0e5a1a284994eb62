//! Trowbridge-Reitz Distribution

use crate::geometry::*;
use crate::pbrt::*;
use crate::reflection::*;
use crate::sampling::*;
use std::fmt;

/// Implements the anisotropic variant of the Trowbridge-Reitz (GGX)
/// distribution with visible normal sampling.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct TrowbridgeReitzDistribution {
    /// For microfacets oriented perpendicular to the x-axis and where
    /// α = sqrt(2) * σ and σ is the RMS slope of microfacets.
    alpha_x: Float,

    /// For microfacets oriented perpendicular to the y-axis and where
    /// α = sqrt(2) * σ and σ is the RMS slope of microfacets.
    alpha_y: Float,
}

impl TrowbridgeReitzDistribution {
    /// Create a new `TrowbridgeReitzDistribution`.
    ///
    /// * `alpha_x` - Roughness along the x-axis.
    /// * `alpha_y` - Roughness along the y-axis.
    pub fn new(alpha_x: Float, alpha_y: Float) -> Self {
        let ret = Self { alpha_x, alpha_y };
        if !ret.effectively_smooth() {
            // Very small alphas that still count as rough are numerically
            // unstable; bump them to a safe minimum.
            Self {
                alpha_x: max(alpha_x, 1e-4),
                alpha_y: max(alpha_y, 1e-4),
            }
        } else {
            ret
        }
    }

    /// Maps scalar roughness parameter in [0, 1] to alpha values where
    /// values close to 0 are near-perfect specular reflection.
    ///
    /// * `roughness` - Roughness parameter value.
    #[inline]
    pub fn roughness_to_alpha(roughness: Float) -> Float {
        roughness.sqrt()
    }

    /// Returns the roughness along the x-axis.
    pub fn alpha_x(&self) -> Float {
        self.alpha_x
    }

    /// Returns the roughness along the y-axis.
    pub fn alpha_y(&self) -> Float {
        self.alpha_y
    }

    /// Returns true if the surface is smooth enough to be treated as a perfect
    /// specular interface.
    #[inline]
    pub fn effectively_smooth(&self) -> bool {
        max(self.alpha_x, self.alpha_y) < 1e-3
    }

    /// Return the differential area of microfacets oriented with the surface
    /// normal `wm`.
    ///
    /// * `wm` - Microfacet normal.
    pub fn d(&self, wm: &Vector3f) -> Float {
        let tan2_theta = tan_2_theta(wm);
        if tan2_theta.is_infinite() {
            return 0.0;
        }

        let cos4_theta = sqr(cos_2_theta(wm));
        if cos4_theta < 1e-16 {
            return 0.0;
        }

        let e = tan2_theta * (sqr(cos_phi(wm) / self.alpha_x) + sqr(sin_phi(wm) / self.alpha_y));
        1.0 / (PI * self.alpha_x * self.alpha_y * cos4_theta * sqr(1.0 + e))
    }

    /// Returns the invisible masked microfacet area per visible microfacet area.
    ///
    /// * `w` - The direction from camera/viewer.
    pub fn lambda(&self, w: &Vector3f) -> Float {
        let tan2_theta = tan_2_theta(w);
        if tan2_theta.is_infinite() {
            return 0.0;
        }

        let alpha2 = sqr(cos_phi(w) * self.alpha_x) + sqr(sin_phi(w) * self.alpha_y);
        ((1.0 + alpha2 * tan2_theta).sqrt() - 1.0) / 2.0
    }

    /// Evaluates Smith's masking function which gives the fraction of
    /// microfacets that are visible from a given direction.
    ///
    /// * `w` - The direction from camera/viewer.
    pub fn g1(&self, w: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(w))
    }

    /// Returns the fraction of microfacets in a differential area that are
    /// visible from both directions `wo` and `wi`.
    ///
    /// * `wo` - Outgoing direction.
    /// * `wi` - Incident direction.
    pub fn g(&self, wo: &Vector3f, wi: &Vector3f) -> Float {
        1.0 / (1.0 + self.lambda(wo) + self.lambda(wi))
    }

    /// Distribution of normals visible from direction `w`.
    ///
    /// * `w`  - The viewing direction.
    /// * `wm` - Microfacet normal.
    pub fn d_visible(&self, w: &Vector3f, wm: &Vector3f) -> Float {
        self.g1(w) / abs_cos_theta(w) * self.d(wm) * w.abs_dot(wm)
    }

    /// Density of `sample_wm()`.
    ///
    /// * `w`  - The viewing direction.
    /// * `wm` - Microfacet normal.
    pub fn pdf(&self, w: &Vector3f, wm: &Vector3f) -> Float {
        self.d_visible(w, wm)
    }

    /// Samples a microfacet normal from the distribution of normals visible
    /// from `w`.
    ///
    /// * `w` - The viewing direction.
    /// * `u` - The 2D uniform random values.
    pub fn sample_wm(&self, w: &Vector3f, u: &Point2f) -> Vector3f {
        // Transform `w` to the hemispherical configuration.
        let mut wh = Vector3f::new(self.alpha_x * w.x, self.alpha_y * w.y, w.z).normalize();
        if wh.z < 0.0 {
            wh = -wh;
        }

        // Orthonormal basis for visible normal sampling.
        let t1 = if wh.z < 0.99999 {
            Vector3f::new(0.0, 0.0, 1.0).cross(&wh).normalize()
        } else {
            Vector3f::new(1.0, 0.0, 0.0)
        };
        let t2 = wh.cross(&t1);

        // Uniformly distributed position on the disk, warped to the projected
        // hemisphere.
        let mut p = uniform_sample_disk(u);
        let h = (1.0 - sqr(p.x)).sqrt();
        p.y = lerp((1.0 + wh.z) / 2.0, h, p.y);

        // Reproject onto the hemisphere and back to the ellipsoid configuration.
        let pz = max(0.0, 1.0 - sqr(p.x) - sqr(p.y)).sqrt();
        let nh = p.x * t1 + p.y * t2 + pz * wh;
        Vector3f::new(
            self.alpha_x * nh.x,
            self.alpha_y * nh.y,
            max(1e-6, nh.z),
        )
        .normalize()
    }

    /// Widen near-specular roughness to bound the variance of estimators that
    /// cannot handle sharp lobes.
    pub fn regularize(&mut self) {
        if self.alpha_x < 0.3 {
            self.alpha_x = clamp(2.0 * self.alpha_x, 0.1, 0.3);
        }
        if self.alpha_y < 0.3 {
            self.alpha_y = clamp(2.0 * self.alpha_y, 0.1, 0.3);
        }
    }
}

impl fmt::Display for TrowbridgeReitzDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TrowbridgeReitzDistribution {{ alpha_x: {}, alpha_y: {} }}",
            self.alpha_x, self.alpha_y
        )
    }
}
