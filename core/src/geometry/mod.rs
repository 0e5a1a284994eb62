//! Geometry

use super::pbrt::*;

// Define macros for property based testing.
#[cfg(test)]
#[macro_export]
macro_rules! prop_range {
    ($name: ident, $t: ty, $r: expr) => {
        prop_compose! {
            fn $name()(f in $r) -> $t {
                f
            }
        }
    };
}

/// Unit direction in the upper hemisphere built from spherical angles so that
/// `z` stays away from the grazing horizon.
#[cfg(test)]
#[macro_export]
macro_rules! prop_hemisphere_direction {
    ($name: ident) => {
        prop_compose! {
            fn $name()(cos_theta in 0.05f32..1.0f32, phi in 0.0f32..6.28f32) -> Vector3f {
                let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
                Vector3f::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
            }
        }
    };
}

#[cfg(test)]
#[macro_export]
macro_rules! prop_point2 {
    ($name: ident, $t: ty, $xr: expr, $yr: expr) => {
        prop_compose! {
            fn $name()(x in $xr, y in $yr) -> Point2<$t> {
                Point2 { x, y }
            }
        }
    };
}

mod common;
mod coordinate_system;
mod point2;
mod vector3;

// Re-export
pub use common::*;
pub use coordinate_system::*;
pub use point2::*;
pub use vector3::*;
