//! Refresh token repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RefreshTokenStatus};
use crate::errors::DomainError;

/// Repository trait for refresh token persistence
///
/// Records are never deleted. Rotated and revoked tokens stay behind with a
/// terminal status so replays can be detected.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync {
    /// Save a new refresh token
    ///
    /// # Returns
    /// * `Ok(RefreshToken)` - The saved token
    /// * `Err(DomainError)` - Save failed (e.g. duplicate token id or value)
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError>;

    /// Find a refresh token by its exact signed value
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DomainError>;

    /// Find every active refresh token owned by an email
    async fn find_active_by_email(&self, email: &str) -> Result<Vec<RefreshToken>, DomainError>;

    /// Unconditionally set the status of a token
    ///
    /// # Returns
    /// * `Ok(true)` - The token exists and was updated
    /// * `Ok(false)` - No token with that id
    async fn set_status(
        &self,
        token_id: Uuid,
        status: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Set the status only if it currently equals `expected`
    ///
    /// Exactly one of several concurrent callers with the same `expected`
    /// status observes `Ok(true)`.
    async fn compare_and_set_status(
        &self,
        token_id: Uuid,
        expected: RefreshTokenStatus,
        new: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Find active tokens whose expiry date is before `now`
    async fn find_expired_active(&self, now: DateTime<Utc>)
        -> Result<Vec<RefreshToken>, DomainError>;

    /// Whether the exact token value has been blacklisted
    async fn is_blacklisted(&self, token: &str) -> Result<bool, DomainError> {
        Ok(self
            .find_by_token(token)
            .await?
            .map(|t| t.is_blacklisted())
            .unwrap_or(false))
    }
}
