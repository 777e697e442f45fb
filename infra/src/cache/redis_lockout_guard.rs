//! Redis-backed lockout guard
//!
//! Shares failed-attempt counters and locks between every instance that
//! points at the same Redis. Keys are derived from a SHA-256 of the
//! normalized email so addresses never appear in the keyspace:
//! - `{prefix}lockout:attempts:{hash}` - consecutive failures
//! - `{prefix}lockout:until:{hash}` - lock expiry in epoch milliseconds
//!
//!
//! State transitions match `InMemoryLockoutGuard`. Counters survive until the
//! maintenance sweep, and a lock whose expiry has passed keeps its count until
//! swept, so one more failure re-locks. `sweep` scans the attempt keys and
//! clears each identity in one server-side step. Key TTLs are only a backstop
//! for deployments where no sweep runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{aio::MultiplexedConnection, AsyncCommands, Client, Script};
use sha2::{Digest, Sha256};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use mg_core::errors::{DomainError, DomainResult};
use mg_core::services::verification::{LockoutGuard, LockoutPolicy, LockoutState, LockoutSweep};
use mg_shared::CacheConfig;

use crate::InfrastructureError;

/// Increments the counter and sets the lock once the threshold is reached,
/// in one server-side step.
const RECORD_FAILURE_SCRIPT: &str = r#"
local attempts = redis.call('INCR', KEYS[1])
redis.call('PEXPIRE', KEYS[1], ARGV[3])
if attempts >= tonumber(ARGV[1]) then
    redis.call('SET', KEYS[2], ARGV[2], 'PX', ARGV[3])
end
return attempts
"#;

/// Releases an elapsed lock or drops a counter without a lock.
/// Returns 0 when kept, 1 when a lock was released, 2 when a counter was dropped.
const SWEEP_IDENTITY_SCRIPT: &str = r#"
local until = redis.call('GET', KEYS[2])
if until then
    if tonumber(until) > tonumber(ARGV[1]) then
        return 0
    end
    redis.call('DEL', KEYS[1], KEYS[2])
    return 1
end
if redis.call('DEL', KEYS[1]) == 1 then
    return 2
end
return 0
"#;

/// How long keys outlive the lock duration when no sweep removes them
const KEY_RETENTION_HOURS: i64 = 24;
const SCAN_BATCH: usize = 100;

const CONNECT_ATTEMPTS: u32 = 3;
const CONNECT_RETRY_DELAY_MS: u64 = 100;

/// Lockout guard storing state in Redis
#[derive(Clone)]
pub struct RedisLockoutGuard {
    connection: MultiplexedConnection,
    key_prefix: String,
    policy: LockoutPolicy,
}

impl RedisLockoutGuard {
    /// Connect to Redis with retry and exponential backoff
    pub async fn connect(config: &CacheConfig, policy: LockoutPolicy) -> Result<Self, InfrastructureError> {
        let client = Client::open(config.url.as_str())
            .map_err(|e| InfrastructureError::Config(format!("Invalid Redis URL: {}", e)))?;

        let mut attempts = 0;
        let mut delay = CONNECT_RETRY_DELAY_MS;
        let connection = loop {
            attempts += 1;
            match client.get_multiplexed_async_connection().await {
                Ok(connection) => break connection,
                Err(e) if attempts < CONNECT_ATTEMPTS => {
                    warn!(
                        attempt = attempts,
                        retry_in_ms = delay,
                        error = %e,
                        event = "redis_connect_retry",
                        "Failed to connect to Redis, retrying"
                    );
                    sleep(Duration::from_millis(delay)).await;
                    delay = (delay * 2).min(5000);
                }
                Err(e) => {
                    error!(attempts, error = %e, event = "redis_connect_failed", "Failed to connect to Redis");
                    return Err(InfrastructureError::Cache(e));
                }
            }
        };

        info!(event = "redis_lockout_ready", "Redis lockout guard connected");

        Ok(Self {
            connection,
            key_prefix: config.key_prefix.clone(),
            policy,
        })
    }

    fn identity_hash(email: &str) -> String {
        hex::encode(Sha256::digest(email.as_bytes()))
    }

    fn attempts_prefix(&self) -> String {
        format!("{}lockout:attempts:", self.key_prefix)
    }

    fn attempts_key(&self, email: &str) -> String {
        format!("{}{}", self.attempts_prefix(), Self::identity_hash(email))
    }

    fn lock_key_for_hash(&self, hash: &str) -> String {
        format!("{}lockout:until:{}", self.key_prefix, hash)
    }

    fn lock_key(&self, email: &str) -> String {
        self.lock_key_for_hash(&Self::identity_hash(email))
    }

    fn retention_millis(&self) -> i64 {
        (self.policy.lock_duration + chrono::Duration::hours(KEY_RETENTION_HOURS))
            .num_milliseconds()
            .max(1)
    }
}

fn cache_error(operation: &'static str) -> impl FnOnce(redis::RedisError) -> DomainError {
    move |e| DomainError::Internal {
        message: format!("Redis {} failed: {}", operation, e),
    }
}

#[async_trait]
impl LockoutGuard for RedisLockoutGuard {
    async fn is_locked(&self, email: &str, now: DateTime<Utc>) -> DomainResult<bool> {
        let mut conn = self.connection.clone();
        let until: Option<i64> = conn
            .get(self.lock_key(email))
            .await
            .map_err(cache_error("lockout read"))?;

        Ok(until.map(|millis| millis > now.timestamp_millis()).unwrap_or(false))
    }

    async fn record_failure(&self, email: &str, now: DateTime<Utc>) -> DomainResult<LockoutState> {
        let until = now + self.policy.lock_duration;
        let mut conn = self.connection.clone();

        let attempts: u32 = Script::new(RECORD_FAILURE_SCRIPT)
            .key(self.attempts_key(email))
            .key(self.lock_key(email))
            .arg(self.policy.max_attempts)
            .arg(until.timestamp_millis())
            .arg(self.retention_millis())
            .invoke_async(&mut conn)
            .await
            .map_err(cache_error("lockout increment"))?;

        debug!(attempts, event = "lockout_failure_recorded", "Recorded failed attempt");

        if attempts >= self.policy.max_attempts {
            Ok(LockoutState::Locked {
                failed_attempts: attempts,
                until,
            })
        } else {
            Ok(LockoutState::Counting { failed_attempts: attempts })
        }
    }

    async fn reset(&self, email: &str) -> DomainResult<()> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(vec![self.attempts_key(email), self.lock_key(email)])
            .await
            .map_err(cache_error("lockout reset"))?;
        Ok(())
    }

    async fn sweep(&self, now: DateTime<Utc>) -> DomainResult<LockoutSweep> {
        let mut conn = self.connection.clone();
        let attempts_prefix = self.attempts_prefix();
        let pattern = format!("{}*", attempts_prefix);
        let script = Script::new(SWEEP_IDENTITY_SCRIPT);
        let mut report = LockoutSweep::default();

        let mut cursor: u64 = 0;
        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .cursor_arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(SCAN_BATCH)
                .query_async(&mut conn)
                .await
                .map_err(cache_error("lockout scan"))?;

            for attempts_key in &keys {
                let Some(hash) = attempts_key.strip_prefix(&attempts_prefix) else {
                    continue;
                };
                let outcome: u8 = script
                    .key(attempts_key)
                    .key(self.lock_key_for_hash(hash))
                    .arg(now.timestamp_millis())
                    .invoke_async(&mut conn)
                    .await
                    .map_err(cache_error("lockout sweep"))?;
                match outcome {
                    1 => report.locks_released += 1,
                    2 => report.counters_dropped += 1,
                    _ => {}
                }
            }

            if next == 0 {
                break;
            }
            cursor = next;
        }

        debug!(
            locks_released = report.locks_released,
            counters_dropped = report.counters_dropped,
            event = "lockout_swept",
            "Swept Redis lockout keys"
        );
        Ok(report)
    }
}
