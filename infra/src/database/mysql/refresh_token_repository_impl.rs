//! MySQL implementation of the RefreshTokenRepository trait.
//!
//! The signed token is stored as issued and looked up through its SHA-256
//! hash, which carries the unique index.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mg_core::domain::entities::token::{RefreshToken, RefreshTokenStatus};
use mg_core::errors::DomainError;
use mg_core::repositories::RefreshTokenRepository;

use super::{db_error, write_error};

const SELECT_COLUMNS: &str =
    "SELECT token_id, email, token, expiry_date, created_at, updated_at, status FROM refresh_tokens";

/// MySQL implementation of RefreshTokenRepository
pub struct MySqlRefreshTokenRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlRefreshTokenRepository {
    /// Create a new MySQL refresh token repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Hash a token value using SHA-256
    ///
    /// # Returns
    /// Hexadecimal string representation of the SHA-256 hash
    pub fn hash_token(token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }

    /// Convert database row to RefreshToken entity
    fn row_to_token(row: &sqlx::mysql::MySqlRow) -> Result<RefreshToken, DomainError> {
        let token_id: String = row.try_get("token_id").map_err(db_error("read token_id"))?;
        let status: String = row.try_get("status").map_err(db_error("read status"))?;

        Ok(RefreshToken {
            token_id: Uuid::parse_str(&token_id).map_err(|e| DomainError::Internal {
                message: format!("Invalid token UUID: {}", e),
            })?,
            email: row.try_get("email").map_err(db_error("read email"))?,
            token: row.try_get("token").map_err(db_error("read token"))?,
            expiry_date: row
                .try_get::<DateTime<Utc>, _>("expiry_date")
                .map_err(db_error("read expiry_date"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("read created_at"))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(db_error("read updated_at"))?,
            status: status
                .parse::<RefreshTokenStatus>()
                .map_err(|message| DomainError::Internal { message })?,
        })
    }

    fn rows_to_tokens(rows: &[sqlx::mysql::MySqlRow]) -> Result<Vec<RefreshToken>, DomainError> {
        rows.iter().map(Self::row_to_token).collect()
    }
}

#[async_trait]
impl RefreshTokenRepository for MySqlRefreshTokenRepository {
    async fn save(&self, token: RefreshToken) -> Result<RefreshToken, DomainError> {
        let query = r#"
            INSERT INTO refresh_tokens (
                token_id, email, token, token_hash, expiry_date, created_at, updated_at, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(token.token_id.to_string())
            .bind(&token.email)
            .bind(&token.token)
            .bind(Self::hash_token(&token.token))
            .bind(token.expiry_date)
            .bind(token.created_at)
            .bind(token.updated_at)
            .bind(token.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(write_error("save refresh token"))?;

        Ok(token)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, DomainError> {
        let query = format!("{} WHERE token_hash = ? LIMIT 1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(Self::hash_token(token))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find refresh token"))?;

        // Guard against a hash collision returning someone else's token
        match row.as_ref().map(Self::row_to_token).transpose()? {
            Some(found) if found.token == token => Ok(Some(found)),
            _ => Ok(None),
        }
    }

    async fn find_active_by_email(&self, email: &str) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!(
            "{} WHERE email = ? AND status = 'ACTIVE' ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("find active refresh tokens"))?;

        Self::rows_to_tokens(&rows)
    }

    async fn set_status(
        &self,
        token_id: Uuid,
        status: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query("UPDATE refresh_tokens SET status = ?, updated_at = ? WHERE token_id = ?")
            .bind(status.as_str())
            .bind(at)
            .bind(token_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("set refresh token status"))?;

        // MySQL reports zero affected rows when the status is unchanged, so
        // fall back to an existence check
        if result.rows_affected() > 0 {
            return Ok(true);
        }

        let exists = sqlx::query("SELECT 1 FROM refresh_tokens WHERE token_id = ?")
            .bind(token_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("check refresh token"))?;

        Ok(exists.is_some())
    }

    async fn compare_and_set_status(
        &self,
        token_id: Uuid,
        expected: RefreshTokenStatus,
        new: RefreshTokenStatus,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE refresh_tokens
            SET status = ?, updated_at = ?
            WHERE token_id = ? AND status = ?
        "#;

        let result = sqlx::query(query)
            .bind(new.as_str())
            .bind(at)
            .bind(token_id.to_string())
            .bind(expected.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error("compare and set refresh token status"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<RefreshToken>, DomainError> {
        let query = format!("{} WHERE status = 'ACTIVE' AND expiry_date < ?", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("find expired refresh tokens"))?;

        Self::rows_to_tokens(&rows)
    }
}
