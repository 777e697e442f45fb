//! Authentication service module
//!
//! Ties email verification, account creation and token issuance together
//! behind one facade.

mod service;


pub use service::AuthService;
