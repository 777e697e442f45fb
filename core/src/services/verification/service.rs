//! Main verification service implementation

use constant_time_eq::constant_time_eq;
use std::sync::Arc;

use mg_shared::utils::email::{mask_email, normalize_email};
use mg_shared::validation::validate_identity;

use crate::domain::entities::verification_code::VerificationCode;
use crate::domain::value_objects::SendCodeResult;
use crate::errors::{AuthError, DomainError, DomainResult, ValidationError};
use crate::services::clock::Clock;
use crate::services::timeout::with_timeout;

use super::code_generator::generate_verification_code;
use super::config::VerificationServiceConfig;
use super::lockout::{LockoutGuard, LockoutState};
use super::traits::EmailServiceTrait;
use crate::repositories::VerificationCodeRepository;

/// Verification service for email one-time codes
pub struct VerificationService<R, E>
where
    R: VerificationCodeRepository,
    E: EmailServiceTrait + ?Sized,
{
    /// Durable store of issued codes
    repository: Arc<R>,
    /// Email transport
    email_service: Arc<E>,
    /// Failed-attempt tracking
    lockout: Arc<dyn LockoutGuard>,
    /// Time source
    clock: Arc<dyn Clock>,
    /// Service configuration
    config: VerificationServiceConfig,
}

impl<R, E> VerificationService<R, E>
where
    R: VerificationCodeRepository,
    E: EmailServiceTrait + ?Sized,
{
    /// Create a new verification service
    ///
    /// # Arguments
    ///
    /// * `repository` - Verification code store
    /// * `email_service` - Email transport implementation
    /// * `lockout` - Lockout guard shared with the maintenance sweep
    /// * `clock` - Time source
    /// * `config` - Service configuration
    pub fn new(
        repository: Arc<R>,
        email_service: Arc<E>,
        lockout: Arc<dyn LockoutGuard>,
        clock: Arc<dyn Clock>,
        config: VerificationServiceConfig,
    ) -> Self {
        Self {
            repository,
            email_service,
            lockout,
            clock,
            config,
        }
    }

    /// Send a verification code to an email address
    ///
    /// This method:
    /// 1. Validates the address
    /// 2. Refuses the request if a recent active code exists
    /// 3. Supersedes older active codes and stores a new one atomically
    /// 4. Emails the code
    ///
    /// A code that was stored but could not be delivered is left in place. It
    /// expires on its own and is cleaned up by the maintenance sweep.
    ///
    /// # Returns
    ///
    /// * `Ok(SendCodeResult)` - The code was stored and handed to the transport
    /// * `Err(DomainError)` - `InvalidEmail`, `RateLimited`, `EmailDeliveryFailed`
    ///   or an infrastructure failure
    pub async fn send_code(&self, email: &str) -> DomainResult<SendCodeResult> {
        let email = validate_identity(email).map_err(|_| ValidationError::InvalidEmail)?;
        let masked = mask_email(&email);
        let now = self.clock.now();

        let recent = with_timeout(
            self.config.io_timeout,
            "verification_code.exists_active_created_after",
            self.repository
                .exists_active_created_after(&email, now - self.config.resend_window),
        )
        .await?;

        if recent {
            let retry_after_seconds = self.retry_after_seconds(&email, now).await?;
            tracing::info!(
                email = %masked,
                retry_after_seconds = retry_after_seconds,
                event = "rate_limit_exceeded",
                "Verification code requested again within the resend window"
            );
            return Err(AuthError::RateLimited { retry_after_seconds }.into());
        }

        let code = VerificationCode::new(
            email.clone(),
            generate_verification_code(),
            now,
            self.config.code_ttl,
        );
        let expires_at = code.expires_at;
        let plain_code = code.code.clone();
        let code_id = code.id;

        let superseded = with_timeout(
            self.config.io_timeout,
            "verification_code.supersede_and_create",
            self.repository.supersede_and_create(code),
        )
        .await?;

        tracing::info!(
            email = %masked,
            code_id = %code_id,
            superseded = superseded,
            event = "code_generated",
            "Stored new verification code"
        );

        let subject = self.email_subject();
        let body = self.email_body(&email, &plain_code);
        with_timeout(self.config.io_timeout, "email.send", async {
            self.email_service
                .send_email(&email, &subject, &body)
                .await
                .map_err(|reason| {
                    tracing::error!(
                        email = %masked,
                        error = %reason,
                        event = "email_delivery_failed",
                        "Failed to deliver verification code"
                    );
                    DomainError::from(AuthError::EmailDeliveryFailed)
                })
        })
        .await?;

        tracing::info!(email = %masked, event = "code_sent", "Verification code sent");

        Ok(SendCodeResult::sent(expires_at))
    }

    /// Verify a candidate code for an email address
    ///
    /// Returns `Ok(true)` only when an active, unexpired code equal to the
    /// candidate exists and this call is the one that consumed it. Locked
    /// identities get `Ok(false)` without the store being consulted.
    ///
    /// # Arguments
    ///
    /// * `email` - Identity the code was sent to
    /// * `candidate` - Code supplied by the caller
    pub async fn verify_code(&self, email: &str, candidate: &str) -> DomainResult<bool> {
        let email = normalize_email(email);
        let masked = mask_email(&email);
        let now = self.clock.now();

        let locked = with_timeout(
            self.config.io_timeout,
            "lockout.is_locked",
            self.lockout.is_locked(&email, now),
        )
        .await?;
        if locked {
            tracing::info!(
                email = %masked,
                event = "verification_refused_locked",
                "Verification attempt refused while locked"
            );
            return Ok(false);
        }

        let active = with_timeout(
            self.config.io_timeout,
            "verification_code.find_active_by_email",
            self.repository.find_active_by_email(&email),
        )
        .await?;

        let code = match active {
            Some(code) if code.is_usable_at(now) => code,
            Some(_) => {
                self.record_failure(&email, &masked, "expired_code").await?;
                return Ok(false);
            }
            None => {
                self.record_failure(&email, &masked, "no_active_code").await?;
                return Ok(false);
            }
        };

        if !constant_time_eq(candidate.as_bytes(), code.code.as_bytes()) {
            self.record_failure(&email, &masked, "code_mismatch").await?;
            return Ok(false);
        }

        let consumed = with_timeout(
            self.config.io_timeout,
            "verification_code.mark_used",
            self.repository.mark_used(code.id, now),
        )
        .await?;

        if !consumed {
            // Another request used the same code first
            self.record_failure(&email, &masked, "code_already_used").await?;
            return Ok(false);
        }

        with_timeout(self.config.io_timeout, "lockout.reset", self.lockout.reset(&email)).await?;
        tracing::info!(
            email = %masked,
            code_id = %code.id,
            event = "code_verified",
            "Verification code accepted"
        );

        Ok(true)
    }

    async fn record_failure(&self, email: &str, masked: &str, reason: &str) -> DomainResult<()> {
        let state = with_timeout(
            self.config.io_timeout,
            "lockout.record_failure",
            self.lockout.record_failure(email, self.clock.now()),
        )
        .await?;
        match state {
            LockoutState::Locked { failed_attempts, until } => tracing::warn!(
                email = %masked,
                reason = reason,
                failed_attempts = failed_attempts,
                locked_until = %until,
                event = "identity_locked",
                "Too many failed verification attempts"
            ),
            LockoutState::Counting { failed_attempts } => tracing::info!(
                email = %masked,
                reason = reason,
                failed_attempts = failed_attempts,
                event = "verification_failed",
                "Verification attempt failed"
            ),
        }
        Ok(())
    }

    async fn retry_after_seconds(&self, email: &str, now: chrono::DateTime<chrono::Utc>) -> DomainResult<i64> {
        let active = with_timeout(
            self.config.io_timeout,
            "verification_code.find_active_by_email",
            self.repository.find_active_by_email(email),
        )
        .await?;

        Ok(active
            .map(|code| (code.created_at + self.config.resend_window - now).num_seconds())
            .unwrap_or(0)
            .max(1))
    }

    fn email_subject(&self) -> String {
        format!("Verification Code for {}", self.config.app_domain)
    }

    fn email_body(&self, email: &str, code: &str) -> String {
        let encoded: String = url::form_urlencoded::byte_serialize(email.as_bytes()).collect();
        format!(
            "Your verification code is: {}\n\n\
             Please use this code to verify your email at: http://{}/verify?email={}\n\n\
             If you didn't request this code, please ignore this email.",
            code, self.config.app_domain, encoded
        )
    }
}
