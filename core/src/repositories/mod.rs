//! Repository interfaces consumed by the services.
//!
//! Concrete MySQL implementations live in `mg_infra`. The `Mock*` types are
//! in-memory doubles compiled only for tests.

pub mod account;
pub mod token;
pub mod verification;

pub use account::AccountRepository;
pub use token::RefreshTokenRepository;
pub use verification::VerificationCodeRepository;

#[cfg(test)]
pub use account::MockAccountRepository;
#[cfg(test)]
pub use token::MockRefreshTokenRepository;
#[cfg(test)]
pub use verification::MockVerificationCodeRepository;
