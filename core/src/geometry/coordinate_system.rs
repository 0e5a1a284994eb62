//! 3-D Coordinate System

use super::vector3::Vector3f;
use super::{clamp, safe_acos, Dot, Float};

/// An orthonormal frame given by 3 unit vectors.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame {
    /// The first unit vector.
    pub x: Vector3f,

    /// The second unit vector.
    pub y: Vector3f,

    /// The third unit vector.
    pub z: Vector3f,
}

impl Frame {
    /// Create a frame whose z-axis is the given unit vector.
    ///
    /// * `z` - The unit z-axis.
    pub fn from_z(z: Vector3f) -> Self {
        let (x, y) = coordinate_system(&z);
        Self { x, y, z }
    }

    /// Transform a vector from world space into this frame.
    ///
    /// * `v` - The vector.
    pub fn to_local(&self, v: &Vector3f) -> Vector3f {
        Vector3f::new(v.dot(&self.x), v.dot(&self.y), v.dot(&self.z))
    }

    /// Transform a vector from this frame into world space.
    ///
    /// * `v` - The vector.
    pub fn from_local(&self, v: &Vector3f) -> Vector3f {
        v.x * self.x + v.y * self.y + v.z * self.z
    }
}

/// Returns two unit vectors that together with `v1` form an orthonormal basis.
/// Uses the branchless construction of Duff et al.
///
/// * `v1` - The first unit vector.
pub fn coordinate_system(v1: &Vector3f) -> (Vector3f, Vector3f) {
    let sign = (1.0 as Float).copysign(v1.z);
    let a = -1.0 / (sign + v1.z);
    let b = v1.x * v1.y * a;
    let v2 = Vector3f::new(1.0 + sign * v1.x * v1.x * a, sign * b, -sign * v1.x);
    let v3 = Vector3f::new(b, sign + v1.y * v1.y * a, -v1.y);
    (v2, v3)
}

/// Returns the unit direction for the given spherical coordinates about +z.
///
/// * `sin_theta` - Sine of the polar angle.
/// * `cos_theta` - Cosine of the polar angle.
/// * `phi`       - Azimuth angle.
pub fn spherical_direction(sin_theta: Float, cos_theta: Float, phi: Float) -> Vector3f {
    let sin_theta = clamp(sin_theta, -1.0, 1.0);
    Vector3f::new(
        sin_theta * phi.cos(),
        sin_theta * phi.sin(),
        clamp(cos_theta, -1.0, 1.0),
    )
}

/// Returns the polar angle of a unit vector measured from +z.
///
/// * `v` - The unit vector.
#[inline]
pub fn spherical_theta(v: &Vector3f) -> Float {
    safe_acos(v.z)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
