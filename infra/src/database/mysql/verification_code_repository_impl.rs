//! MySQL implementation of the VerificationCodeRepository trait.
//!
//! Codes for one email are superseded and inserted inside a single
//! transaction. The `active_email` generated column carries a unique index so
//! the table itself refuses a second `ACTIVE` code for the same email.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mg_core::domain::entities::verification_code::{VerificationCode, VerificationCodeStatus};
use mg_core::errors::DomainError;
use mg_core::repositories::VerificationCodeRepository;

use super::{db_error, write_error};

const SELECT_COLUMNS: &str =
    "SELECT id, email, code, created_at, expires_at, updated_at, status FROM verification_codes";

/// MySQL implementation of VerificationCodeRepository
pub struct MySqlVerificationCodeRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlVerificationCodeRepository {
    /// Create a new MySQL verification code repository
    ///
    /// # Arguments
    /// * `pool` - MySQL connection pool from SQLx
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to VerificationCode entity
    fn row_to_code(row: &sqlx::mysql::MySqlRow) -> Result<VerificationCode, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("read id"))?;
        let status: String = row.try_get("status").map_err(db_error("read status"))?;

        Ok(VerificationCode {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid verification code UUID: {}", e),
            })?,
            email: row.try_get("email").map_err(db_error("read email"))?,
            code: row.try_get("code").map_err(db_error("read code"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("read created_at"))?,
            expires_at: row
                .try_get::<DateTime<Utc>, _>("expires_at")
                .map_err(db_error("read expires_at"))?,
            updated_at: row
                .try_get::<DateTime<Utc>, _>("updated_at")
                .map_err(db_error("read updated_at"))?,
            status: status
                .parse::<VerificationCodeStatus>()
                .map_err(|message| DomainError::Internal { message })?,
        })
    }

    fn rows_to_codes(rows: &[sqlx::mysql::MySqlRow]) -> Result<Vec<VerificationCode>, DomainError> {
        rows.iter().map(Self::row_to_code).collect()
    }
}

#[async_trait]
impl VerificationCodeRepository for MySqlVerificationCodeRepository {
    async fn create(&self, code: VerificationCode) -> Result<VerificationCode, DomainError> {
        let query = r#"
            INSERT INTO verification_codes (
                id, email, code, created_at, expires_at, updated_at, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#;

        sqlx::query(query)
            .bind(code.id.to_string())
            .bind(&code.email)
            .bind(&code.code)
            .bind(code.created_at)
            .bind(code.expires_at)
            .bind(code.updated_at)
            .bind(code.status.as_str())
            .execute(&self.pool)
            .await
            .map_err(write_error("insert verification code"))?;

        Ok(code)
    }

    async fn find_active_by_email(
        &self,
        email: &str,
    ) -> Result<Option<VerificationCode>, DomainError> {
        let query = format!(
            "{} WHERE email = ? AND status = 'ACTIVE' ORDER BY created_at DESC LIMIT 1",
            SELECT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find active verification code"))?;

        row.as_ref().map(Self::row_to_code).transpose()
    }

    async fn find_all_active_by_email(
        &self,
        email: &str,
    ) -> Result<Vec<VerificationCode>, DomainError> {
        let query = format!(
            "{} WHERE email = ? AND status = 'ACTIVE' ORDER BY created_at DESC",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("find active verification codes"))?;

        Self::rows_to_codes(&rows)
    }

    async fn exists_active_created_after(
        &self,
        email: &str,
        since: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let query = r#"
            SELECT EXISTS(
                SELECT 1 FROM verification_codes
                WHERE email = ? AND status = 'ACTIVE' AND created_at > ?
            ) AS recent
        "#;

        let row = sqlx::query(query)
            .bind(email)
            .bind(since)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("check recent verification code"))?;

        let recent: i64 = row.try_get("recent").map_err(db_error("read recent"))?;
        Ok(recent == 1)
    }

    async fn update_status(
        &self,
        ids: &[Uuid],
        status: VerificationCodeStatus,
        at: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let placeholders = vec!["?"; ids.len()].join(", ");
        let query = format!(
            "UPDATE verification_codes SET status = ?, updated_at = ? WHERE id IN ({})",
            placeholders
        );

        let mut statement = sqlx::query(&query).bind(status.as_str()).bind(at);
        for id in ids {
            statement = statement.bind(id.to_string());
        }

        let result = statement
            .execute(&self.pool)
            .await
            .map_err(db_error("update verification code status"))?;

        Ok(result.rows_affected() as usize)
    }

    async fn mark_used(&self, id: Uuid, at: DateTime<Utc>) -> Result<bool, DomainError> {
        let query = r#"
            UPDATE verification_codes
            SET status = 'USED', updated_at = ?
            WHERE id = ? AND status = 'ACTIVE'
        "#;

        let result = sqlx::query(query)
            .bind(at)
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error("mark verification code used"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn supersede_and_create(&self, code: VerificationCode) -> Result<usize, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_error("begin supersede transaction"))?;

        // Lock the email's active rows so concurrent senders serialize here
        sqlx::query("SELECT id FROM verification_codes WHERE email = ? AND status = 'ACTIVE' FOR UPDATE")
            .bind(&code.email)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error("lock active verification codes"))?;

        let superseded = sqlx::query(
            r#"
            UPDATE verification_codes
            SET status = 'INACTIVE', updated_at = ?
            WHERE email = ? AND status = 'ACTIVE'
            "#,
        )
        .bind(code.created_at)
        .bind(&code.email)
        .execute(&mut *tx)
        .await
        .map_err(db_error("supersede verification codes"))?
        .rows_affected();

        sqlx::query(
            r#"
            INSERT INTO verification_codes (
                id, email, code, created_at, expires_at, updated_at, status
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(code.id.to_string())
        .bind(&code.email)
        .bind(&code.code)
        .bind(code.created_at)
        .bind(code.expires_at)
        .bind(code.updated_at)
        .bind(code.status.as_str())
        .execute(&mut *tx)
        .await
        .map_err(write_error("insert verification code"))?;

        tx.commit()
            .await
            .map_err(db_error("commit supersede transaction"))?;

        Ok(superseded as usize)
    }

    async fn find_expired_active(
        &self,
        now: DateTime<Utc>,
    ) -> Result<Vec<VerificationCode>, DomainError> {
        let query = format!("{} WHERE status = 'ACTIVE' AND expires_at < ?", SELECT_COLUMNS);

        let rows = sqlx::query(&query)
            .bind(now)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("find expired verification codes"))?;

        Self::rows_to_codes(&rows)
    }
}
