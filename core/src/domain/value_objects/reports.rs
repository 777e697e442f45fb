//! Reports returned by best-effort bulk operations.

use serde::{Deserialize, Serialize};

/// Outcome of revoking every active refresh token for an identity
///
/// Processing is not atomic across the set. Tokens handled before a failure
/// stay revoked and the failure is counted here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationReport {
    /// Active tokens found for the identity
    pub attempted: usize,
    /// Tokens deactivated and blacklisted
    pub revoked: usize,
    /// Tokens whose revocation failed
    pub failed: usize,
}

impl RevocationReport {
    pub fn is_complete(&self) -> bool {
        self.failed == 0 && self.revoked == self.attempted
    }
}

/// Outcome of one maintenance sweep
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Verification codes moved to `Expired`
    pub codes_expired: usize,
    /// Lockout entries whose lock elapsed
    pub locks_released: usize,
    /// Stale failure counters dropped
    pub counters_dropped: usize,
    /// Refresh tokens moved to `Inactive`
    pub tokens_deactivated: usize,
    /// Error messages from steps that failed
    pub errors: Vec<String>,
}

impl SweepReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}
