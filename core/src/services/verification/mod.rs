//! Verification service module for email-based authentication
//!
//! This module provides the verification code workflow:
//! - Code generation from the OS CSPRNG
//! - Sending codes with a resend window
//! - Verifying codes with single-use consumption
//! - Failed-attempt lockout behind the `LockoutGuard` trait

mod code_generator;
mod config;
mod lockout;
mod service;
mod traits;


pub use code_generator::generate_verification_code;
pub use config::{LockoutPolicy, VerificationServiceConfig};
pub use lockout::{InMemoryLockoutGuard, LockoutGuard, LockoutState, LockoutSweep};
pub use service::VerificationService;
pub use traits::EmailServiceTrait;
