//! Configuration for the token services

use chrono::Duration;
use mg_shared::config::DEFAULT_JWT_SECRET;
use mg_shared::JwtConfig;

use crate::domain::entities::token::{
    ACCESS_TOKEN_EXPIRY_HOURS, JWT_AUDIENCE, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_DAYS,
};

/// Minimum accepted length of the HS256 secret, in bytes
pub const MIN_SECRET_LENGTH: usize = 32;

/// Configuration for the token signer
#[derive(Debug, Clone)]
pub struct TokenSignerConfig {
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
    pub issuer: String,
    pub audience: String,
    /// Refuse the development placeholder secret
    pub reject_default_secret: bool,
}

impl Default for TokenSignerConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            access_token_ttl: Duration::hours(ACCESS_TOKEN_EXPIRY_HOURS),
            refresh_token_ttl: Duration::days(REFRESH_TOKEN_EXPIRY_DAYS),
            issuer: JWT_ISSUER.to_string(),
            audience: JWT_AUDIENCE.to_string(),
            reject_default_secret: false,
        }
    }
}

impl TokenSignerConfig {
    /// Build from the shared JWT settings
    ///
    /// # Arguments
    ///
    /// * `jwt` - JWT settings loaded from the environment
    /// * `production` - Whether the placeholder secret must be refused
    pub fn from_settings(jwt: &JwtConfig, production: bool) -> Self {
        Self {
            jwt_secret: jwt.secret.clone(),
            access_token_ttl: Duration::seconds(jwt.access_token_expiry),
            refresh_token_ttl: Duration::seconds(jwt.refresh_token_expiry),
            issuer: jwt.issuer.clone(),
            audience: jwt.audience.clone(),
            reject_default_secret: production,
        }
    }
}
