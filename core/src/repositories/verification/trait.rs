//! Verification code repository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::verification_code::{VerificationCode, VerificationCodeStatus};
use crate::errors::DomainError;

/// Repository trait for verification code persistence
///
/// Implementations must keep at most one `Active` code per email. Writes that
/// touch several records for one email must commit atomically so a concurrent
/// reader never sees a mixed state.
#[async_trait]
pub trait VerificationCodeRepository: Send + Sync {
    /// Insert a new verification code
    async fn create(&self, code: VerificationCode) -> Result<VerificationCode, DomainError>;

    /// Find the active code for an email, if any
    async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<VerificationCode>, DomainError>;

    /// Find every active code for an email
    async fn find_all_active_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<VerificationCode>, DomainError>;

    /// Whether an active code for the email was created strictly after `since`
    async fn exists_active_created_after(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError>;

    /// Move a set of codes to a new status
    ///
    /// # Returns
    ///
    /// The number of records updated
    async fn update_status(
        &self,
        ids: &[Uuid],
        status: VerificationCodeStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError>;

    /// Atomically move a code from `Active` to `Used`
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The code was active and is now used
    /// * `Ok(false)` - The code was no longer active
    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError>;

    /// Deactivate every active code for the new code's email and insert it,
    /// as one atomic unit
    ///
    /// # Returns
    ///
    /// The number of codes that were superseded
    async fn supersede_and_create(&self, code: VerificationCode) -> Result<usize, DomainError>;

    /// Find active codes whose expiration time is before `now`
    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<VerificationCode>, DomainError>;
}
