//! Per-identity failed-attempt counting and temporary lockout.
//!
//! Each identity moves through `Clear -> Counting(n) -> Locked(until)`. The
//! state lives in a single tagged value per identity, so the count and the
//! lock can never disagree.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::errors::DomainResult;

use super::config::LockoutPolicy;

/// Lockout state of one identity; absence from the guard means clear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutState {
    Counting {
        failed_attempts: u32,
    },
    Locked {
        failed_attempts: u32,
        until: DateTime<Utc>,
    },
}

impl LockoutState {
    pub fn failed_attempts(&self) -> u32 {
        match self {
            LockoutState::Counting { failed_attempts } => *failed_attempts,
            LockoutState::Locked { failed_attempts, .. } => *failed_attempts,
        }
    }

    /// Whether the state refuses attempts at `now`
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        matches!(self, LockoutState::Locked { until, .. } if *until > now)
    }

    /// State after one more failure at `now`
    pub fn after_failure(current: Option<LockoutState>, now: DateTime<Utc>, policy: &LockoutPolicy) -> Self {
        let failed_attempts = current.map(|s| s.failed_attempts()).unwrap_or(0).saturating_add(1);
        if failed_attempts >= policy.max_attempts {
            LockoutState::Locked {
                failed_attempts,
                until: now + policy.lock_duration,
            }
        } else {
            LockoutState::Counting { failed_attempts }
        }
    }
}

/// Entries removed by one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockoutSweep {
    pub locks_released: usize,
    pub counters_dropped: usize,
}

/// Bounded-rate verification attempts per identity
///
/// Implementations must apply "increment and maybe lock" atomically so that
/// simultaneous failures for the same identity are all counted.
#[async_trait]
pub trait LockoutGuard: Send + Sync {
    /// Whether attempts for this identity are currently refused
    async fn is_locked(&self, email: &str, now: DateTime<Utc>) -> DomainResult<bool>;

    /// Count one failed attempt and return the resulting state
    async fn record_failure(&self, email: &str, now: DateTime<Utc>) -> DomainResult<LockoutState>;

    /// Clear all state for an identity after a successful verification
    async fn reset(&self, email: &str) -> DomainResult<()>;

    /// Release elapsed locks and drop counters that have no active lock
    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<LockoutSweep>;
}

/// Process-local lockout guard
///
/// State is lost on restart and is not shared between instances. Use the
/// Redis guard in `mg_infra` when running more than one instance.
pub struct InMemoryLockoutGuard {
    policy: LockoutPolicy,
    states: Mutex<HashMap<String, LockoutState>>,
}

impl InMemoryLockoutGuard {
    pub fn new(policy: LockoutPolicy) -> Self {
        Self {
            policy,
            states: Mutex::new(HashMap::new()),
        }
    }

    /// Current state of an identity, if tracked
    pub fn state_of(&self, email: &str) -> Option<LockoutState> {
        self.lock_states().get(email).copied()
    }

    // Critical sections are short and never span an await point
    fn lock_states(&self) -> std::sync::MutexGuard<'_, HashMap<String, LockoutState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryLockoutGuard {
    fn default() -> Self {
        Self::new(LockoutPolicy::default())
    }
}

#[async_trait]
impl LockoutGuard for InMemoryLockoutGuard {
    async fn is_locked(&self, email: &str, now: DateTime<Utc>) -> DomainResult<bool> {
        Ok(self
            .lock_states()
            .get(email)
            .map(|s| s.is_locked_at(now))
            .unwrap_or(false))
    }

    async fn record_failure(&self, email: &str, now: DateTime<Utc>) -> DomainResult<LockoutState> {
        let mut states = self.lock_states();
        let next = LockoutState::after_failure(states.get(email).copied(), now, &self.policy);
        states.insert(email.to_string(), next);
        Ok(next)
    }

    async fn reset(&self, email: &str) -> DomainResult<()> {
        self.lock_states().remove(email);
        Ok(())
    }

    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<LockoutSweep> {
        let mut report = LockoutSweep::default();
        self.lock_states().retain(|_, state| match state {
            LockoutState::Locked { until, .. } if *until > now => true,
            LockoutState::Locked { .. } => {
                report.locks_released += 1;
                false
            }
            LockoutState::Counting { .. } => {
                report.counters_dropped += 1;
                false
            }
        });
        Ok(report)
    }
}
