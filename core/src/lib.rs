//! # MailGate Core
//!
//! Core business logic for MailGate passwordless authentication.
//! This crate contains domain entities, business services, repository interfaces,
//! and error types. It has no knowledge of MySQL, Redis or SMTP; those live in
//! `mg_infra` behind the traits defined here.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::{
    Account, Claims, IssuedToken, RefreshToken, RefreshTokenStatus, TokenPair, TokenUse,
    VerificationCode, VerificationCodeStatus,
};
pub use domain::value_objects::{RevocationReport, SendCodeResult, SweepReport};
pub use errors::{AuthError, DomainError, DomainResult, TokenError, ValidationError};
pub use repositories::{AccountRepository, RefreshTokenRepository, VerificationCodeRepository};
pub use services::{
    AuthService, Clock, EmailServiceTrait, InMemoryLockoutGuard, LockoutGuard, LockoutPolicy,
    LockoutState, LockoutSweep, MaintenanceService, RefreshTokenService, SystemClock,
    TokenSigner, TokenSignerConfig, VerificationService, VerificationServiceConfig,
};
