//! Verification code entity for email-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Maximum number of consecutive failed verifications before lockout
pub const MAX_ATTEMPTS: u32 = 5;

/// Length of the verification code
pub const CODE_LENGTH: usize = 6;

/// Default expiration time for verification codes (5 minutes)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 5;

/// Lifecycle status of a verification code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationCodeStatus {
    /// Issued and awaiting verification
    Active,
    /// Successfully verified
    Used,
    /// Passed its expiration time without being used
    Expired,
    /// Superseded by a newer code
    Inactive,
}

impl VerificationCodeStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationCodeStatus::Active => "ACTIVE",
            VerificationCodeStatus::Used => "USED",
            VerificationCodeStatus::Expired => "EXPIRED",
            VerificationCodeStatus::Inactive => "INACTIVE",
        }
    }
}

impl std::fmt::Display for VerificationCodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for VerificationCodeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(VerificationCodeStatus::Active),
            "USED" => Ok(VerificationCodeStatus::Used),
            "EXPIRED" => Ok(VerificationCodeStatus::Expired),
            "INACTIVE" => Ok(VerificationCodeStatus::Inactive),
            other => Err(format!("Unknown verification code status: {}", other)),
        }
    }
}

/// Verification code entity for email-based authentication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationCode {
    /// Unique identifier for the verification code
    pub id: Uuid,

    /// Email address this code was sent to
    pub email: String,

    /// The 6-digit verification code
    pub code: String,

    /// Timestamp when the code was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the code expires
    pub expires_at: DateTime<Utc>,

    /// Timestamp of the last status change
    pub updated_at: DateTime<Utc>,

    /// Current lifecycle status
    pub status: VerificationCodeStatus,
}

impl VerificationCode {
    /// Creates a new active verification code
    ///
    /// # Arguments
    ///
    /// * `email` - The address the code is sent to
    /// * `code` - The generated numeric code
    /// * `now` - Creation time
    /// * `ttl` - Lifetime of the code
    pub fn new(email: String, code: String, now: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            code,
            created_at: now,
            expires_at: now + ttl,
            updated_at: now,
            status: VerificationCodeStatus::Active,
        }
    }

    /// A code is expired once `now` reaches its expiration time
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Whether the code can still be verified at `now`
    pub fn is_usable_at(&self, now: DateTime<Utc>) -> bool {
        self.status == VerificationCodeStatus::Active && !self.is_expired_at(now)
    }

    /// Moves the code to a new status
    pub fn transition(&mut self, status: VerificationCodeStatus, at: DateTime<Utc>) {
        self.status = status;
        self.updated_at = at;
    }
}
