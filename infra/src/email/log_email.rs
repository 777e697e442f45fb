//! Logging email transport
//!
//! Writes outbound messages to the tracing log instead of delivering them.
//! Used in development and whenever no SMTP relay is configured.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use mg_core::services::verification::EmailServiceTrait;
use mg_shared::utils::email::{is_valid_email, mask_email};

/// Email transport that only logs
///
/// Message bodies carry live verification codes and are written at debug level.
#[derive(Clone)]
pub struct LogEmailService {
    /// Counter for tracking number of messages sent
    message_count: Arc<AtomicU64>,
    /// Whether to simulate failures
    simulate_failure: bool,
}

impl LogEmailService {
    pub fn new() -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: false,
        }
    }

    /// Create a transport that rejects every message
    pub fn failing() -> Self {
        Self {
            message_count: Arc::new(AtomicU64::new(0)),
            simulate_failure: true,
        }
    }

    /// Get the total number of messages accepted
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

impl Default for LogEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmailServiceTrait for LogEmailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        if !is_valid_email(to) {
            return Err(format!("Invalid recipient address: {}", mask_email(to)));
        }

        if self.simulate_failure {
            warn!(to = %mask_email(to), event = "email_simulated_failure", "Simulated email failure");
            return Err("Simulated email delivery failure".to_string());
        }

        let sequence = self.message_count.fetch_add(1, Ordering::SeqCst) + 1;
        info!(
            to = %mask_email(to),
            subject,
            sequence,
            event = "email_logged",
            "Email accepted by log transport"
        );
        tracing::debug!(body, "Email body");

        Ok(())
    }
}
