//! Microfacet Distribution Models

mod trowbridge_reitz;

// Re-exports
pub use trowbridge_reitz::*;
