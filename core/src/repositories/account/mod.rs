mod r#trait;

pub use r#trait::AccountRepository;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockAccountRepository;
