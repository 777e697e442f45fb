//! Outbound email transport configuration

use serde::{Deserialize, Serialize};

use super::env_or;

/// Email transport configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Transport provider ("smtp" or "log")
    pub provider: String,

    /// SMTP relay host
    pub smtp_host: String,

    /// SMTP port (STARTTLS)
    pub smtp_port: u16,

    /// SMTP username
    pub smtp_username: String,

    /// SMTP password
    #[serde(skip_serializing)]
    pub smtp_password: String,

    /// Sender address for verification emails
    pub from_address: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            provider: String::from("log"),
            smtp_host: String::from("localhost"),
            smtp_port: 587,
            smtp_username: String::new(),
            smtp_password: String::new(),
            from_address: String::from("no-reply@mailgate.local"),
        }
    }
}

impl EmailConfig {
    /// Load from `EMAIL_*` / `SMTP_*` environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            provider: std::env::var("EMAIL_PROVIDER").unwrap_or(defaults.provider),
            smtp_host: std::env::var("SMTP_HOST").unwrap_or(defaults.smtp_host),
            smtp_port: env_or("SMTP_PORT", defaults.smtp_port),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or(defaults.smtp_username),
            smtp_password: std::env::var("SMTP_PASSWORD").unwrap_or(defaults.smtp_password),
            from_address: std::env::var("EMAIL_FROM").unwrap_or(defaults.from_address),
        }
    }
}
