//! Domain layer containing business entities and value objects.

pub mod entities;
pub mod value_objects;

// Re-export commonly used domain types
pub use entities::{
    Account, Claims, IssuedToken, RefreshToken, RefreshTokenStatus, TokenPair, TokenUse,
    VerificationCode, VerificationCodeStatus,
};
pub use value_objects::{RevocationReport, SendCodeResult, SweepReport};
