//! Per-call deadline for store and email calls.

use std::future::Future;
use std::time::Duration;

use crate::errors::{DomainError, DomainResult};

/// Run a collaborator call under a deadline
///
/// An elapsed deadline becomes `DomainError::Timeout`, which callers treat as
/// retryable.
pub(crate) async fn with_timeout<T, F>(limit: Duration, operation: &str, fut: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(
                operation = operation,
                timeout_ms = limit.as_millis() as u64,
                event = "io_timeout",
                "Collaborator call timed out"
            );
            Err(DomainError::Timeout {
                operation: operation.to_string(),
            })
        }
    }
}
