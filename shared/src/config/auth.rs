//! Authentication configuration: token signing and verification-code policy

use serde::{Deserialize, Serialize};

use super::env_or;

/// Placeholder secret used when `JWT_SECRET` is not set
pub const DEFAULT_JWT_SECRET: &str = "development-secret-please-change-in-production";

/// JWT authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Symmetric secret for HS256 signing
    pub secret: String,

    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: String::from(DEFAULT_JWT_SECRET),
            access_token_expiry: 86_400,     // 24 hours
            refresh_token_expiry: 2_592_000, // 30 days
            issuer: String::from("mailgate"),
            audience: String::from("mailgate-api"),
        }
    }
}

impl JwtConfig {
    /// Create a new JWT configuration with secret
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            ..Default::default()
        }
    }

    /// Load from `JWT_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            secret: std::env::var("JWT_SECRET").unwrap_or(defaults.secret),
            access_token_expiry: env_or("JWT_ACCESS_TOKEN_EXPIRY", defaults.access_token_expiry),
            refresh_token_expiry: env_or("JWT_REFRESH_TOKEN_EXPIRY", defaults.refresh_token_expiry),
            issuer: std::env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or(defaults.audience),
        }
    }

    /// Check if using default secret (security warning)
    pub fn is_using_default_secret(&self) -> bool {
        self.secret == DEFAULT_JWT_SECRET
    }
}

/// Verification code and lockout policy
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VerificationConfig {
    /// Lifetime of an issued code in seconds
    pub code_ttl_seconds: i64,

    /// A new code cannot be requested while an active one younger than this exists
    pub resend_window_seconds: i64,

    /// Failed attempts before the identity is locked
    pub max_failed_attempts: u32,

    /// Lockout duration in seconds
    pub lockout_duration_seconds: i64,

    /// Domain used in the verification link and email subject
    pub app_domain: String,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            code_ttl_seconds: 300,
            resend_window_seconds: 300,
            max_failed_attempts: 5,
            lockout_duration_seconds: 900,
            app_domain: String::from("localhost:3000"),
        }
    }
}

impl VerificationConfig {
    /// Load from `VERIFICATION_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            code_ttl_seconds: env_or("VERIFICATION_CODE_TTL", defaults.code_ttl_seconds),
            resend_window_seconds: env_or("VERIFICATION_RESEND_WINDOW", defaults.resend_window_seconds),
            max_failed_attempts: env_or("VERIFICATION_MAX_FAILED_ATTEMPTS", defaults.max_failed_attempts),
            lockout_duration_seconds: env_or("VERIFICATION_LOCKOUT_DURATION", defaults.lockout_duration_seconds),
            app_domain: std::env::var("APP_DOMAIN").unwrap_or(defaults.app_domain),
        }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    pub jwt: JwtConfig,

    /// Verification code policy
    pub verification: VerificationConfig,

    /// Timeout applied to each store and email call, in seconds
    #[serde(default = "default_io_timeout")]
    pub io_timeout_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt: JwtConfig::default(),
            verification: VerificationConfig::default(),
            io_timeout_seconds: default_io_timeout(),
        }
    }
}

impl AuthConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        Self {
            jwt: JwtConfig::from_env(),
            verification: VerificationConfig::from_env(),
            io_timeout_seconds: env_or("AUTH_IO_TIMEOUT", default_io_timeout()),
        }
    }
}

fn default_io_timeout() -> u64 {
    10
}
