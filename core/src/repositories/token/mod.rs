mod r#trait;

pub use r#trait::RefreshTokenRepository;

#[cfg(test)]
pub mod mock;
#[cfg(test)]
pub use mock::MockRefreshTokenRepository;

#[cfg(test)]
mod tests;
