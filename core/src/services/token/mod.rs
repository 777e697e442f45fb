//! Token services: HS256 signing and refresh token lifecycle

mod config;
mod service;
mod signer;


pub use config::{TokenSignerConfig, MIN_SECRET_LENGTH};
pub use service::RefreshTokenService;
pub use signer::TokenSigner;
