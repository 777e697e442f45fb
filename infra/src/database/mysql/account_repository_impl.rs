//! MySQL implementation of the AccountRepository trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

use mg_core::domain::entities::account::Account;
use mg_core::errors::DomainError;
use mg_core::repositories::AccountRepository;

use super::{db_error, write_error};

/// MySQL implementation of AccountRepository
pub struct MySqlAccountRepository {
    pool: MySqlPool,
}

impl MySqlAccountRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    fn row_to_account(row: &sqlx::mysql::MySqlRow) -> Result<Account, DomainError> {
        let id: String = row.try_get("id").map_err(db_error("read id"))?;

        Ok(Account {
            id: Uuid::parse_str(&id).map_err(|e| DomainError::Internal {
                message: format!("Invalid account UUID: {}", e),
            })?,
            email: row.try_get("email").map_err(db_error("read email"))?,
            created_at: row
                .try_get::<DateTime<Utc>, _>("created_at")
                .map_err(db_error("read created_at"))?,
        })
    }
}

#[async_trait]
impl AccountRepository for MySqlAccountRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError> {
        let row = sqlx::query("SELECT id, email, created_at FROM accounts WHERE email = ? LIMIT 1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error("find account"))?;

        row.as_ref().map(Self::row_to_account).transpose()
    }

    async fn create(&self, account: Account) -> Result<Account, DomainError> {
        sqlx::query("INSERT INTO accounts (id, email, created_at) VALUES (?, ?, ?)")
            .bind(account.id.to_string())
            .bind(&account.email)
            .bind(account.created_at)
            .execute(&self.pool)
            .await
            .map_err(write_error("create account"))?;

        Ok(account)
    }
}
