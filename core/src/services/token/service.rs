//! Refresh token issuance, rotation and revocation

use std::sync::Arc;
use std::time::Duration as StdDuration;

use mg_shared::utils::email::mask_email;

use crate::domain::entities::token::{RefreshToken, RefreshTokenStatus, TokenPair, TokenUse};
use crate::domain::value_objects::RevocationReport;
use crate::errors::{AuthError, DomainError, DomainResult, TokenError};
use crate::repositories::{AccountRepository, RefreshTokenRepository};
use crate::services::clock::Clock;
use crate::services::timeout::with_timeout;

use super::signer::TokenSigner;

/// Service for managing refresh tokens
///
/// Every refresh token value is single use. A successful refresh retires the
/// presented token (inactive, then blacklisted) and hands out a new pair.
pub struct RefreshTokenService<R, A>
where
    R: RefreshTokenRepository,
    A: AccountRepository,
{
    repository: Arc<R>,
    accounts: Arc<A>,
    signer: Arc<TokenSigner>,
    clock: Arc<dyn Clock>,
    io_timeout: StdDuration,
}

impl<R, A> RefreshTokenService<R, A>
where
    R: RefreshTokenRepository,
    A: AccountRepository,
{
    /// Creates a new refresh token service
    ///
    /// # Arguments
    ///
    /// * `repository` - Refresh token store
    /// * `accounts` - Account directory used to confirm the identity still exists
    /// * `signer` - Token signer
    /// * `clock` - Time source
    /// * `io_timeout` - Deadline for each store call
    pub fn new(
        repository: Arc<R>,
        accounts: Arc<A>,
        signer: Arc<TokenSigner>,
        clock: Arc<dyn Clock>,
        io_timeout: StdDuration,
    ) -> Self {
        Self {
            repository,
            accounts,
            signer,
            clock,
            io_timeout,
        }
    }

    /// Mints an access token and a refresh token and stores the refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Both tokens, with expiries in seconds
    /// * `Err(DomainError)` - Signing or persistence failed
    pub async fn issue_pair(&self, email: &str) -> DomainResult<TokenPair> {
        let now = self.clock.now();
        let access = self.signer.issue_access_token(email)?;
        let refresh = self.signer.issue_refresh_token(email)?;
        let pair = TokenPair::from_issued(&access, &refresh, now);

        let record = RefreshToken::from_issued(email.to_string(), refresh, now);
        let token_id = record.token_id;
        with_timeout(self.io_timeout, "refresh_token.save", self.repository.save(record)).await?;

        tracing::info!(
            email = %mask_email(email),
            token_id = %token_id,
            event = "token_pair_issued",
            "Issued new token pair"
        );

        Ok(pair)
    }

    /// Exchanges a refresh token for a new token pair
    ///
    /// The checks run in this order: blank value, blacklist, store lookup,
    /// stored status, stored expiry, signature, account existence. Expired
    /// or badly signed tokens are deactivated before the error is returned.
    ///
    /// The presented token is claimed with a compare-and-set from `Active` to
    /// `Inactive` before anything is minted, so two concurrent refreshes of the
    /// same value cannot both succeed.
    pub async fn refresh(&self, presented: &str) -> DomainResult<TokenPair> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(TokenError::MissingToken.into());
        }

        if self
            .timed("refresh_token.is_blacklisted", self.repository.is_blacklisted(presented))
            .await?
        {
            tracing::warn!(event = "refresh_token_replay", "Blacklisted refresh token presented");
            return Err(TokenError::Blacklisted.into());
        }

        let stored = self
            .timed("refresh_token.find_by_token", self.repository.find_by_token(presented))
            .await?
            .ok_or(TokenError::NotFound)?;

        match stored.status {
            RefreshTokenStatus::Active => {}
            RefreshTokenStatus::Blacklisted => return Err(TokenError::Blacklisted.into()),
            RefreshTokenStatus::Inactive => {
                tracing::info!(
                    token_id = %stored.token_id,
                    event = "refresh_token_inactive",
                    "Inactive refresh token presented"
                );
                return Err(TokenError::Inactive.into());
            }
        }

        let now = self.clock.now();
        if stored.is_expired_at(now) {
            self.deactivate(&stored).await?;
            return Err(TokenError::Expired.into());
        }

        let claims = match self.signer.validate(presented) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!(
                    token_id = %stored.token_id,
                    error = %e,
                    event = "refresh_token_invalid",
                    "Stored refresh token failed validation"
                );
                self.deactivate(&stored).await?;
                return Err(e.into());
            }
        };
        if claims.token_use != TokenUse::Refresh
            || claims.sub != stored.email
            || claims.token_id() != Some(stored.token_id)
        {
            self.deactivate(&stored).await?;
            return Err(TokenError::Malformed.into());
        }

        let account = self
            .timed("account.find_by_email", self.accounts.find_by_email(&stored.email))
            .await?;
        if account.is_none() {
            return Err(AuthError::AccountNotFound.into());
        }

        let claimed = self
            .timed(
                "refresh_token.compare_and_set_status",
                self.repository.compare_and_set_status(
                    stored.token_id,
                    RefreshTokenStatus::Active,
                    RefreshTokenStatus::Inactive,
                    now,
                ),
            )
            .await?;
        if !claimed {
            tracing::warn!(
                token_id = %stored.token_id,
                event = "refresh_token_race_lost",
                "Refresh token was rotated by a concurrent request"
            );
            return Err(TokenError::Inactive.into());
        }

        let pair = self.issue_pair(&stored.email).await?;

        self.timed(
            "refresh_token.set_status",
            self.repository
                .set_status(stored.token_id, RefreshTokenStatus::Blacklisted, now),
        )
        .await?;

        tracing::info!(
            email = %mask_email(&stored.email),
            old_token_id = %stored.token_id,
            event = "refresh_token_rotated",
            "Rotated refresh token"
        );

        Ok(pair)
    }

    /// Revokes a single refresh token
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The token is now blacklisted
    /// * `Err(TokenError::NotFound)` - No such token
    pub async fn revoke(&self, token: &str) -> DomainResult<()> {
        let stored = self
            .timed("refresh_token.find_by_token", self.repository.find_by_token(token.trim()))
            .await?
            .ok_or(TokenError::NotFound)?;

        self.retire(&stored).await?;

        tracing::info!(
            email = %mask_email(&stored.email),
            token_id = %stored.token_id,
            event = "refresh_token_revoked",
            "Revoked refresh token"
        );
        Ok(())
    }

    /// Revokes every active refresh token of an identity
    ///
    /// Tokens are processed one at a time. A failure on one token is logged
    /// and counted, and the remaining tokens are still processed.
    pub async fn revoke_all(&self, email: &str) -> DomainResult<RevocationReport> {
        let active = self
            .timed("refresh_token.find_active_by_email", self.repository.find_active_by_email(email))
            .await?;

        let mut report = RevocationReport {
            attempted: active.len(),
            ..Default::default()
        };

        for token in &active {
            match self.retire(token).await {
                Ok(()) => report.revoked += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        email = %mask_email(email),
                        token_id = %token.token_id,
                        error = %e,
                        event = "refresh_token_revoke_failed",
                        "Failed to revoke refresh token"
                    );
                }
            }
        }

        tracing::info!(
            email = %mask_email(email),
            attempted = report.attempted,
            revoked = report.revoked,
            failed = report.failed,
            event = "refresh_tokens_revoked",
            "Revoked refresh tokens for identity"
        );

        Ok(report)
    }

    // Inactive first, then blacklisted
    async fn retire(&self, token: &RefreshToken) -> DomainResult<()> {
        let now = self.clock.now();
        self.deactivate(token).await?;
        self.timed(
            "refresh_token.set_status",
            self.repository
                .set_status(token.token_id, RefreshTokenStatus::Blacklisted, now),
        )
        .await?;
        Ok(())
    }

    async fn deactivate(&self, token: &RefreshToken) -> DomainResult<()> {
        self.timed(
            "refresh_token.set_status",
            self.repository
                .set_status(token.token_id, RefreshTokenStatus::Inactive, self.clock.now()),
        )
        .await?;
        Ok(())
    }

    async fn timed<T, F>(&self, operation: &str, fut: F) -> DomainResult<T>
    where
        F: std::future::Future<Output = Result<T, DomainError>>,
    {
        with_timeout(self.io_timeout, operation, fut).await
    }
}
