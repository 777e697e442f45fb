//! In-memory VerificationCodeRepository for tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::verification_code::{VerificationCode, VerificationCodeStatus};
use crate::errors::DomainError;

use super::r#trait::VerificationCodeRepository;

/// Mock verification code repository
///
/// Every write takes the map's write lock for its whole duration, which gives
/// the same atomicity a database transaction would.
#[derive(Clone, Default)]
pub struct MockVerificationCodeRepository {
    codes: Arc<RwLock<HashMap<Uuid, VerificationCode>>>,
    should_fail: Arc<AtomicBool>,
}

impl MockVerificationCodeRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with an internal error
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of every stored code for an email, oldest first
    pub async fn codes_for(&self, email: &str) -> Vec<VerificationCode> {
        let codes = self.codes.read().await;
        let mut found: Vec<_> = codes.values().filter(|c| c.email == email).cloned().collect();
        found.sort_by_key(|c| c.created_at);
        found
    }

    /// Insert a code as-is, bypassing the single-active rule
    pub async fn insert_raw(&self, code: VerificationCode) {
        self.codes.write().await.insert(code.id, code);
    }

    fn check(&self) -> Result<(), DomainError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(DomainError::Internal {
                message: "mock verification store failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl VerificationCodeRepository for MockVerificationCodeRepository {
    async fn create(&self, code: VerificationCode) -> Result<VerificationCode, DomainError> {
        self.check()?;
        let mut codes = self.codes.write().await;

        if code.status == VerificationCodeStatus::Active
            && codes
                .values()
                .any(|c| c.email == code.email && c.status == VerificationCodeStatus::Active)
        {
            return Err(DomainError::Validation {
                message: "An active verification code already exists".to_string(),
            });
        }

        codes.insert(code.id, code.clone());
        Ok(code)
    }

    async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<VerificationCode>, DomainError> {
        self.check()?;
        let codes = self.codes.read().await;
        Ok(codes
            .values()
            .filter(|c| c.email == email && c.status == VerificationCodeStatus::Active)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn find_all_active_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<VerificationCode>, DomainError> {
        self.check()?;
        let codes = self.codes.read().await;
        Ok(codes
            .values()
            .filter(|c| c.email == email && c.status == VerificationCodeStatus::Active)
            .cloned()
            .collect())
    }

    async fn exists_active_created_after(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check()?;
        let codes = self.codes.read().await;
        Ok(codes.values().any(|c| {
            c.email == email && c.status == VerificationCodeStatus::Active && c.created_at > since
        }))
    }

    async fn update_status(
        &self,
        ids: &[Uuid],
        status: VerificationCodeStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        self.check()?;
        let mut codes = self.codes.write().await;
        let mut updated = 0;
        for id in ids {
            if let Some(code) = codes.get_mut(id) {
                code.transition(status, at);
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        self.check()?;
        let mut codes = self.codes.write().await;
        match codes.get_mut(&id) {
            Some(code) if code.status == VerificationCodeStatus::Active => {
                code.transition(VerificationCodeStatus::Used, at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn supersede_and_create(&self, code: VerificationCode) -> Result<usize, DomainError> {
        self.check()?;
        let mut codes = self.codes.write().await;
        let mut superseded = 0;
        for existing in codes.values_mut() {
            if existing.email == code.email && existing.status == VerificationCodeStatus::Active {
                existing.transition(VerificationCodeStatus::Inactive, code.created_at);
                superseded += 1;
            }
        }
        codes.insert(code.id, code);
        Ok(superseded)
    }

    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<VerificationCode>, DomainError> {
        self.check()?;
        let codes = self.codes.read().await;
        Ok(codes
            .values()
            .filter(|c| c.status == VerificationCodeStatus::Active && c.expires_at < now)
            .cloned()
            .collect())
    }
}
