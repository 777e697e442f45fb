//! Traits for email transport integration

use async_trait::async_trait;

/// Trait for email transport integration
#[async_trait]
pub trait EmailServiceTrait: Send + Sync {
    /// Send a plain-text email
    ///
    /// # Returns
    /// * `Ok(())` - The transport accepted the message
    /// * `Err(String)` - Delivery failed, with the transport's reason
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), String>;
}
