//! MySQL repository implementations

mod account_repository_impl;
mod refresh_token_repository_impl;
mod verification_code_repository_impl;

pub use account_repository_impl::MySqlAccountRepository;
pub use refresh_token_repository_impl::MySqlRefreshTokenRepository;
pub use verification_code_repository_impl::MySqlVerificationCodeRepository;

use mg_core::errors::DomainError;

/// Map a read failure to an internal domain error
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| DomainError::Internal {
        message: format!("Failed to {}: {}", context, e),
    }
}

/// Map a write failure, reporting unique key violations as validation errors
pub(crate) fn write_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> DomainError {
    move |e| {
        let duplicate = e
            .as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false);

        if duplicate {
            DomainError::Validation {
                message: format!("Failed to {}: record already exists", context),
            }
        } else {
            DomainError::Internal {
                message: format!("Failed to {}: {}", context, e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_error_keeps_context() {
        let err = db_error("find account")(sqlx::Error::RowNotFound);
        match err {
            DomainError::Internal { message } => {
                assert!(message.starts_with("Failed to find account"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_write_error_without_database_error_is_internal() {
        let err = write_error("save refresh token")(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DomainError::Internal { .. }));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_token_hash_is_stable_hex() {
        let hash = MySqlRefreshTokenRepository::hash_token("header.payload.signature");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, MySqlRefreshTokenRepository::hash_token("header.payload.signature"));
        assert_ne!(hash, MySqlRefreshTokenRepository::hash_token("header.payload.other"));
    }
}
