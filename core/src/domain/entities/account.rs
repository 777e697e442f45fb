//! Account entity owned by the account directory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An account, created the first time an identity verifies successfully
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: Uuid,

    /// Email address identifying the account
    pub email: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Creates a new account for an email address
    pub fn new(email: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            created_at: now,
        }
    }
}
