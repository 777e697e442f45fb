//! Configuration for the verification service

use chrono::Duration;
use mg_shared::VerificationConfig;

use crate::domain::entities::verification_code::{DEFAULT_EXPIRATION_MINUTES, MAX_ATTEMPTS};

/// Configuration for the verification service
#[derive(Debug, Clone)]
pub struct VerificationServiceConfig {
    /// Lifetime of an issued code
    pub code_ttl: Duration,
    /// An active code younger than this blocks a resend
    pub resend_window: Duration,
    /// Domain used in the email subject and verification link
    pub app_domain: String,
    /// Deadline for each store and email call
    pub io_timeout: std::time::Duration,
}

impl Default for VerificationServiceConfig {
    fn default() -> Self {
        Self {
            code_ttl: Duration::minutes(DEFAULT_EXPIRATION_MINUTES),
            resend_window: Duration::minutes(5),
            app_domain: "localhost:3000".to_string(),
            io_timeout: std::time::Duration::from_secs(10),
        }
    }
}

impl VerificationServiceConfig {
    pub fn from_settings(settings: &VerificationConfig, io_timeout_seconds: u64) -> Self {
        Self {
            code_ttl: Duration::seconds(settings.code_ttl_seconds),
            resend_window: Duration::seconds(settings.resend_window_seconds),
            app_domain: settings.app_domain.clone(),
            io_timeout: std::time::Duration::from_secs(io_timeout_seconds),
        }
    }
}

/// Thresholds for the lockout guard
#[derive(Debug, Clone, Copy)]
pub struct LockoutPolicy {
    /// Consecutive failures that trigger a lock
    pub max_attempts: u32,
    /// How long a lock lasts
    pub lock_duration: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            lock_duration: Duration::minutes(15),
        }
    }
}

impl LockoutPolicy {
    pub fn from_settings(settings: &VerificationConfig) -> Self {
        Self {
            max_attempts: settings.max_failed_attempts,
            lock_duration: Duration::seconds(settings.lockout_duration_seconds),
        }
    }
}
