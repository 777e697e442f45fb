//! Main authentication service implementation

use std::sync::Arc;
use std::time::Duration;

use mg_shared::utils::email::{mask_email, normalize_email};

use crate::domain::entities::account::Account;
use crate::domain::entities::token::TokenPair;
use crate::domain::value_objects::{RevocationReport, SendCodeResult};
use crate::errors::{AuthError, DomainError, DomainResult};
use crate::repositories::{AccountRepository, RefreshTokenRepository, VerificationCodeRepository};
use crate::services::clock::Clock;
use crate::services::timeout::with_timeout;
use crate::services::token::RefreshTokenService;
use crate::services::verification::{EmailServiceTrait, VerificationService};

/// Authentication service for the complete passwordless flow
///
/// Exposes the five caller-facing operations: send a code, verify it for a
/// token pair, refresh, revoke one token, and revoke every token of an
/// identity.
pub struct AuthService<V, E, R, A>
where
    V: VerificationCodeRepository,
    E: EmailServiceTrait + ?Sized,
    R: RefreshTokenRepository,
    A: AccountRepository,
{
    /// Email code issuance and verification
    verification_service: Arc<VerificationService<V, E>>,
    /// Refresh token lifecycle
    token_service: Arc<RefreshTokenService<R, A>>,
    /// Account directory
    account_repository: Arc<A>,
    clock: Arc<dyn Clock>,
    io_timeout: Duration,
}

impl<V, E, R, A> AuthService<V, E, R, A>
where
    V: VerificationCodeRepository,
    E: EmailServiceTrait + ?Sized,
    R: RefreshTokenRepository,
    A: AccountRepository,
{
    /// Create a new authentication service
    ///
    /// # Arguments
    ///
    /// * `verification_service` - Service for email verification codes
    /// * `token_service` - Service for refresh token management
    /// * `account_repository` - Account directory
    /// * `clock` - Time source
    /// * `io_timeout` - Deadline for each account directory call
    pub fn new(
        verification_service: Arc<VerificationService<V, E>>,
        token_service: Arc<RefreshTokenService<R, A>>,
        account_repository: Arc<A>,
        clock: Arc<dyn Clock>,
        io_timeout: Duration,
    ) -> Self {
        Self {
            verification_service,
            token_service,
            account_repository,
            clock,
            io_timeout,
        }
    }

    /// Send a verification code to an email address
    pub async fn send_verification_code(&self, email: &str) -> DomainResult<SendCodeResult> {
        self.verification_service.send_code(email).await
    }

    /// Verify a code and log the identity in
    ///
    /// Creates the account on first successful verification, then issues a
    /// token pair.
    ///
    /// # Returns
    ///
    /// * `Ok(TokenPair)` - Verification succeeded
    /// * `Err(AuthError::InvalidVerificationCode)` - For every rejected code,
    ///   whether mismatched, expired, missing or locked out
    /// * `Err(DomainError)` - Infrastructure failures, which are retryable
    pub async fn verify_code(&self, email: &str, code: &str) -> DomainResult<TokenPair> {
        let email = normalize_email(email);

        if !self.verification_service.verify_code(&email, code).await? {
            return Err(AuthError::InvalidVerificationCode.into());
        }

        self.ensure_account(&email).await?;
        self.token_service.issue_pair(&email).await
    }

    /// Exchange a refresh token for a new token pair
    pub async fn refresh_token(&self, refresh_token: &str) -> DomainResult<TokenPair> {
        self.token_service.refresh(refresh_token).await
    }

    /// Revoke a single refresh token
    pub async fn revoke_token(&self, refresh_token: &str) -> DomainResult<()> {
        self.token_service.revoke(refresh_token).await
    }

    /// Revoke every active refresh token of an identity
    pub async fn revoke_all_for_identity(&self, email: &str) -> DomainResult<RevocationReport> {
        self.token_service.revoke_all(&normalize_email(email)).await
    }

    async fn ensure_account(&self, email: &str) -> DomainResult<Account> {
        let existing = with_timeout(
            self.io_timeout,
            "account.find_by_email",
            self.account_repository.find_by_email(email),
        )
        .await?;
        if let Some(account) = existing {
            return Ok(account);
        }

        let account = Account::new(email.to_string(), self.clock.now());
        match with_timeout(
            self.io_timeout,
            "account.create",
            self.account_repository.create(account),
        )
        .await
        {
            Ok(created) => {
                tracing::info!(
                    email = %mask_email(email),
                    account_id = %created.id,
                    event = "account_created",
                    "Created account on first verification"
                );
                Ok(created)
            }
            // A concurrent verification created it first
            Err(DomainError::Validation { .. }) => with_timeout(
                self.io_timeout,
                "account.find_by_email",
                self.account_repository.find_by_email(email),
            )
            .await?
            .ok_or_else(|| DomainError::Internal {
                message: "Account vanished after a create conflict".to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}
