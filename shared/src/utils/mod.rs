//! Common utility functions

pub mod email;
pub mod validation;

// Re-export commonly used utilities
pub use email::*;
