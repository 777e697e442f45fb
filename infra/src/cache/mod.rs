//! Cache module for Redis-backed shared state
//!
//! Holds the lockout guard used when several MailGate instances must agree
//! on failed-attempt counts.

pub mod redis_lockout_guard;

pub use redis_lockout_guard::RedisLockoutGuard;
