//! Email Transport Module
//!
//! Outbound transports for verification emails:
//!
//! - **SMTP**: Delivery through a relay via lettre
//! - **Log**: Writes messages to the log for development

pub mod log_email;
pub mod smtp;

use std::sync::Arc;

use mg_core::services::verification::EmailServiceTrait;
use mg_shared::EmailConfig;

use crate::InfrastructureError;

pub use log_email::LogEmailService;
pub use smtp::SmtpEmailService;

/// Create an email transport based on configuration
///
/// # Arguments
///
/// * `config` - Email configuration containing provider settings
///
/// # Returns
///
/// A shared transport, or a configuration error for an unknown provider or
/// a broken SMTP setup
pub fn create_email_service(
    config: &EmailConfig,
) -> Result<Arc<dyn EmailServiceTrait>, InfrastructureError> {
    match config.provider.as_str() {
        "smtp" => Ok(Arc::new(SmtpEmailService::new(config)?)),
        "log" => {
            tracing::warn!(
                event = "email_log_transport",
                "Using log email transport, messages are not delivered"
            );
            Ok(Arc::new(LogEmailService::new()))
        }
        other => Err(InfrastructureError::Config(format!(
            "Unknown email provider '{}'",
            other
        ))),
    }
}
