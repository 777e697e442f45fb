//! Database module - MySQL implementations using SQLx
//!
//! This module provides the database access layer:
//! - Connection pool management and migrations
//! - Repository implementations for codes, refresh tokens and accounts

pub mod connection;
pub mod mysql;

pub use connection::{DatabasePool, PoolStatistics};
pub use mysql::{MySqlAccountRepository, MySqlRefreshTokenRepository, MySqlVerificationCodeRepository};
