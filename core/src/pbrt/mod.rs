//! PBRT common stuff

mod clamp;
mod common;
mod hash;
mod math;

// Re-export
pub use clamp::*;
pub use common::*;
pub use hash::*;
pub use math::*;
