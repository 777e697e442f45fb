//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Access token expiration time (24 hours)
pub const ACCESS_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Refresh token expiration time (30 days)
pub const REFRESH_TOKEN_EXPIRY_DAYS: i64 = 30;

/// JWT issuer
pub const JWT_ISSUER: &str = "mailgate";

/// JWT audience
pub const JWT_AUDIENCE: &str = "mailgate-api";

/// Which kind of credential a token is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// Claims structure for JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (the identity's email address)
    pub sub: String,

    /// Issued at timestamp
    pub iat: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID, equal to the token id for refresh tokens
    pub jti: String,

    /// Access or refresh
    pub token_use: TokenUse,
}

impl Claims {
    /// Creates claims for a token issued at `now`
    ///
    /// # Arguments
    ///
    /// * `email` - Subject of the token
    /// * `token_use` - Access or refresh
    /// * `jti` - Unique token identifier
    /// * `now` - Issue time
    /// * `ttl` - Lifetime of the token
    pub fn new(
        email: &str,
        token_use: TokenUse,
        jti: Uuid,
        now: DateTime<Utc>,
        ttl: Duration,
        issuer: &str,
        audience: &str,
    ) -> Self {
        Self {
            sub: email.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + ttl).timestamp(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            jti: jti.to_string(),
            token_use,
        }
    }

    /// Checks whether the claims have expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }

    /// Gets the token id
    pub fn token_id(&self) -> Option<Uuid> {
        Uuid::parse_str(&self.jti).ok()
    }
}

/// Lifecycle status of a stored refresh token
///
/// `Inactive` and `Blacklisted` are both terminal. `Blacklisted` additionally
/// marks the exact token value as never valid again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RefreshTokenStatus {
    Active,
    Inactive,
    Blacklisted,
}

impl RefreshTokenStatus {
    /// Storage representation
    pub fn as_str(&self) -> &'static str {
        match self {
            RefreshTokenStatus::Active => "ACTIVE",
            RefreshTokenStatus::Inactive => "INACTIVE",
            RefreshTokenStatus::Blacklisted => "BLACKLISTED",
        }
    }
}

impl std::fmt::Display for RefreshTokenStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RefreshTokenStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ACTIVE" => Ok(RefreshTokenStatus::Active),
            "INACTIVE" => Ok(RefreshTokenStatus::Inactive),
            "BLACKLISTED" => Ok(RefreshTokenStatus::Blacklisted),
            other => Err(format!("Unknown refresh token status: {}", other)),
        }
    }
}

/// Refresh token entity stored in the database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshToken {
    /// Unique identifier, also carried as the `jti` claim
    pub token_id: Uuid,

    /// Email address of the token owner
    pub email: String,

    /// The signed token string
    pub token: String,

    /// When the token expires
    pub expiry_date: DateTime<Utc>,

    /// When the token was created
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,

    /// Lifecycle status
    pub status: RefreshTokenStatus,
}

impl RefreshToken {
    /// Creates an active refresh token record from a freshly issued token
    pub fn from_issued(email: String, issued: IssuedToken, now: DateTime<Utc>) -> Self {
        Self {
            token_id: issued.token_id,
            email,
            token: issued.token,
            expiry_date: issued.expires_at,
            created_at: now,
            updated_at: now,
            status: RefreshTokenStatus::Active,
        }
    }

    /// Checks if the token is expired at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expiry_date <= now
    }

    pub fn is_active(&self) -> bool {
        self.status == RefreshTokenStatus::Active
    }

    pub fn is_blacklisted(&self) -> bool {
        self.status == RefreshTokenStatus::Blacklisted
    }
}

/// A signed token together with its identifier and expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token_id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Token pair returned after successful verification or refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// Refresh token
    pub refresh_token: String,

    /// Access token expiry in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry in seconds
    pub refresh_expires_in: i64,
}

impl TokenPair {
    /// Builds a pair from two issued tokens, expressing expiries relative to `now`
    pub fn from_issued(access: &IssuedToken, refresh: &IssuedToken, now: DateTime<Utc>) -> Self {
        Self {
            access_token: access.token.clone(),
            refresh_token: refresh.token.clone(),
            access_expires_in: (access.expires_at - now).num_seconds(),
            refresh_expires_in: (refresh.expires_at - now).num_seconds(),
        }
    }
}
