//! Sampling

#![allow(dead_code)]

mod common;
mod piecewise_linear_2d;

// Re-export
pub use common::*;
pub use piecewise_linear_2d::*;
