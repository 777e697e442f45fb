//! HS256 token signing and validation.

use chrono::Duration;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mg_shared::config::DEFAULT_JWT_SECRET;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::token::{Claims, IssuedToken, TokenUse};
use crate::errors::TokenError;
use crate::services::clock::Clock;

use super::config::{TokenSignerConfig, MIN_SECRET_LENGTH};

/// Creates and validates signed, expiring bearer tokens
///
/// Signature, issuer and audience are checked by `jsonwebtoken`. Expiry is
/// checked against the injected clock so it follows simulated time.
pub struct TokenSigner {
    config: TokenSignerConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenSigner {
    /// Creates a new signer
    ///
    /// # Returns
    ///
    /// * `Ok(TokenSigner)` - The secret is acceptable
    /// * `Err(TokenError::WeakSecret)` - The secret is too short, or is the
    ///   development placeholder while `reject_default_secret` is set
    pub fn new(config: TokenSignerConfig, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        if config.jwt_secret.len() < MIN_SECRET_LENGTH
            || (config.reject_default_secret && config.jwt_secret == DEFAULT_JWT_SECRET)
        {
            tracing::error!(event = "weak_jwt_secret", "Refusing to start with a weak JWT secret");
            return Err(TokenError::WeakSecret {
                min_length: MIN_SECRET_LENGTH,
            });
        }

        let encoding_key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_audience(&[config.audience.as_str()]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        Ok(Self {
            config,
            encoding_key,
            decoding_key,
            validation,
            clock,
        })
    }

    /// Issues an access token whose subject is the email
    pub fn issue_access_token(&self, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue(email, TokenUse::Access, self.config.access_token_ttl)
    }

    /// Issues a refresh token whose `jti` is the returned token id
    pub fn issue_refresh_token(&self, email: &str) -> Result<IssuedToken, TokenError> {
        self.issue(email, TokenUse::Refresh, self.config.refresh_token_ttl)
    }

    /// Validates a token and returns its claims
    ///
    /// # Returns
    ///
    /// * `Ok(Claims)` - Signature, issuer and audience match and `exp` is in the future
    /// * `Err(TokenError::InvalidSignature)` - Signed with another key
    /// * `Err(TokenError::Expired)` - The clock has reached `exp`
    /// * `Err(TokenError::Malformed)` - Anything else
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        let now = self.clock.now();
        if data.claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }
        if data.claims.nbf > now.timestamp() {
            return Err(TokenError::Malformed);
        }

        Ok(data.claims)
    }

    fn issue(&self, email: &str, token_use: TokenUse, ttl: Duration) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let token_id = Uuid::new_v4();
        let claims = Claims::new(
            email,
            token_use,
            token_id,
            now,
            ttl,
            &self.config.issuer,
            &self.config.audience,
        );

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!(error = %e, event = "token_encode_failed", "Failed to sign token");
            TokenError::GenerationFailed
        })?;

        Ok(IssuedToken {
            token_id,
            token,
            expires_at: now + ttl,
        })
    }
}
