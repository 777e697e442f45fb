//! Domain entities representing core business objects.

pub mod account;
pub mod token;
pub mod verification_code;

// Re-export commonly used types
pub use account::Account;
pub use token::{
    Claims, IssuedToken, RefreshToken, RefreshTokenStatus, TokenPair, TokenUse,
    ACCESS_TOKEN_EXPIRY_HOURS, JWT_AUDIENCE, JWT_ISSUER, REFRESH_TOKEN_EXPIRY_DAYS,
};
pub use verification_code::{
    VerificationCode, VerificationCodeStatus, CODE_LENGTH, DEFAULT_EXPIRATION_MINUTES,
    MAX_ATTEMPTS,
};
