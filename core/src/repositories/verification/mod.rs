mod r#trait;

pub use r#trait::VerificationCodeRepository;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockVerificationCodeRepository;
