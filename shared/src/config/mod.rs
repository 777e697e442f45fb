//! Configuration module with business-specific sub-modules
//!
//! - `auth` - JWT signing, verification-code and lockout policy
//! - `cache` - Redis connection used for shared lockout state
//! - `database` - Database connection and pool configuration
//! - `email` - Outbound email transport
//! - `environment` - Environment detection and logging configuration
//! - `maintenance` - Periodic sweep of expired codes, tokens and lockouts

pub mod auth;
pub mod cache;
pub mod database;
pub mod email;
pub mod environment;
pub mod maintenance;

use serde::{Deserialize, Serialize};

pub use auth::{AuthConfig, JwtConfig, VerificationConfig, DEFAULT_JWT_SECRET};
pub use cache::CacheConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};
pub use maintenance::MaintenanceConfig;

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Authentication configuration
    pub auth: AuthConfig,

    /// Email transport configuration
    pub email: EmailConfig,

    /// Redis configuration (optional shared lockout store)
    #[serde(default)]
    pub cache: Option<CacheConfig>,

    /// Background maintenance configuration
    #[serde(default)]
    pub maintenance: MaintenanceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            database: DatabaseConfig::default(),
            auth: AuthConfig::default(),
            email: EmailConfig::default(),
            cache: None,
            maintenance: MaintenanceConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// Callers are expected to have loaded any `.env` file beforehand.
    pub fn from_env() -> Self {
        let environment = Environment::from_env();
        Self {
            environment,
            database: DatabaseConfig::from_env(),
            auth: AuthConfig::from_env(),
            email: EmailConfig::from_env(),
            cache: CacheConfig::from_env(),
            maintenance: MaintenanceConfig::from_env(),
            logging: LoggingConfig::from_env(environment),
        }
    }

    /// Check the configuration for values that must never reach production
    pub fn validate(&self) -> Result<(), String> {
        if self.environment.is_production() && self.auth.jwt.is_using_default_secret() {
            return Err("JWT_SECRET must be set in production".to_string());
        }
        if !EMAIL_PROVIDERS.contains(&self.email.provider.as_str()) {
            return Err(format!(
                "Unknown EMAIL_PROVIDER '{}', expected one of: {}",
                self.email.provider,
                EMAIL_PROVIDERS.join(", ")
            ));
        }
        if self.environment.is_production() && self.email.provider != "smtp" {
            return Err("EMAIL_PROVIDER must be smtp in production".to_string());
        }
        if self.auth.verification.max_failed_attempts == 0 {
            return Err("VERIFICATION_MAX_FAILED_ATTEMPTS must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Accepted values of `EMAIL_PROVIDER`
pub const EMAIL_PROVIDERS: [&str; 2] = ["smtp", "log"];

/// Read an environment variable and parse it, falling back to `default`
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
