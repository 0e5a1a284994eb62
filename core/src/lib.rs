//! Core

extern crate bitflags;
#[macro_use]
extern crate hexf;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;

// Re-export.
pub mod geometry;
pub mod medium;
pub mod microfacet;
pub mod options;
pub mod pbrt;
pub mod reflection;
pub mod rng;
pub mod sampling;
pub mod spectrum;
