//! Domain-specific error types for authentication and token operations
//!
//! Each failure mode is a distinct variant so that callers can decide between
//! prompting re-authentication and retrying.

use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please wait before requesting a new code")]
    RateLimited { retry_after_seconds: i64 },

    #[error("Invalid verification code")]
    InvalidVerificationCode,

    #[error("Failed to send verification email")]
    EmailDeliveryFailed,

    #[error("Account not found")]
    AccountNotFound,
}

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Refresh token is missing or empty")]
    MissingToken,

    #[error("Refresh token is blacklisted")]
    Blacklisted,

    #[error("Refresh token not found")]
    NotFound,

    #[error("Refresh token is inactive")]
    Inactive,

    #[error("Token expired")]
    Expired,

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Malformed token")]
    Malformed,

    #[error("Signing secret must be at least {min_length} bytes")]
    WeakSecret { min_length: usize },

    #[error("Token generation failed")]
    GenerationFailed,
}

/// Validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email")]
    InvalidEmail,
}
