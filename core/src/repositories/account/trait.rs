//! Account directory trait.
//!
//! Accounts are owned outside the authentication core. The core only needs to
//! know whether an email resolves to an account and to create one after the
//! first successful verification.

use async_trait::async_trait;

use crate::domain::entities::account::Account;
use crate::errors::DomainError;

/// Repository trait for account lookups
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account by its normalized email address
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DomainError>;

    /// Create a new account
    ///
    /// # Returns
    /// * `Ok(Account)` - The created account
    /// * `Err(DomainError)` - Creation failed (e.g. the email is taken)
    async fn create(&self, account: Account) -> Result<Account, DomainError>;
}
