//! Shared utilities and common types for MailGate
//!
//! This crate provides functionality used across all workspace members:
//! - Configuration types loaded from the environment
//! - Email validation and masking helpers

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, EmailConfig, Environment, JwtConfig,
    LogFormat, LoggingConfig, MaintenanceConfig, VerificationConfig,
};
pub use utils::validation;
