//! Medium

mod henyey_greenstein;

// Re-exports
pub use henyey_greenstein::*;
