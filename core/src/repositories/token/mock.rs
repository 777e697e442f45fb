//! Mock implementation of RefreshTokenRepository for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::token::{RefreshToken, RefreshTokenStatus};
use crate::errors::DomainError;

use super::r#trait::RefreshTokenRepository;

/// Mock refresh token repository keyed by token id
#[derive(Clone, Default)]
pub struct MockRefreshTokenRepository {
    tokens: Arc<RwLock<HashMap<Uuid, RefreshToken>>>,
    failing_ids: Arc<RwLock<HashSet<Uuid>>>,
    fail_saves: Arc<RwLock<bool>>,
}

impl MockRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make status updates for one token fail
    pub async fn fail_updates_for(&self, token_id: Uuid) {
        self.failing_ids.write().await.insert(token_id);
    }

    /// Make `save` fail
    pub async fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.write().await = fail;
    }

    /// Snapshot of a stored token by id
    pub async fn get(&self, token_id: Uuid) -> Option<RefreshToken> {
        self.tokens.read().await.get(&token_id).cloned()
    }

    /// Snapshot of every stored token for an email
    pub async fn tokens_for(&self, email: &str) -> Vec<RefreshToken> {
        self.tokens
            .read()
            .await
            .values()
            .filter(|t| t.email == email)
            .cloned()
            .collect()
    }

    async fn check_update(&self, token_id: Uuid) -> Result<(), DomainError> {
        if self.failing_ids.read().await.contains(&token_id) {
            return Err(DomainError::Internal {
                message: format!("mock update failure for {}", token_id),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl RefreshTokenRepository for MockRefreshTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        if *self.fail_saves.read().await {
            return Err(DomainError::Internal {
                message: "mock save failure".to_string(),
            });
        }

        let mut tokens = self.tokens.write().await;
        if tokens.contains_key(&token.token_id) || tokens.values().any(|t| t.token == token.token) {
            return Err(DomainError::Validation {
                message: "Token already exists".to_string(),
            });
        }

        tokens.insert(token.token_id, token.clone());
        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens.values().find(|t| t.token == token).cloned())
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.email == email && t.is_active())
            .cloned()
            .collect())
    }

    async fn set_status(
        &self,
        token_id: Uuid,
        status: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check_update(token_id).await?;
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&token_id) {
            Some(token) => {
                token.status = status;
                token.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn compare_and_set_status(
        &self,
        token_id: Uuid,
        expected: RefreshTokenStatus,
        new: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check_update(token_id).await?;
        let mut tokens = self.tokens.write().await;
        match tokens.get_mut(&token_id) {
            Some(token) if token.status == expected => {
                token.status = new;
                token.updated_at = at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let tokens = self.tokens.read().await;
        Ok(tokens
            .values()
            .filter(|t| t.is_active() && t.expiry_date < now)
            .cloned()
            .collect())
    }
}
