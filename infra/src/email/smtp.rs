//! SMTP email transport backed by lettre

use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{error, info};

use mg_core::services::verification::EmailServiceTrait;
use mg_shared::utils::email::mask_email;
use mg_shared::EmailConfig;

use crate::InfrastructureError;

/// Email transport that relays through an SMTP server
pub struct SmtpEmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpEmailService {
    /// Build the transport from configuration
    ///
    /// Uses STARTTLS with credentials when a username is configured, and a
    /// plain connection to the given host and port otherwise (local relays).
    pub fn new(config: &EmailConfig) -> Result<Self, InfrastructureError> {
        let from = config
            .from_address
            .parse::<Mailbox>()
            .map_err(|e| InfrastructureError::Config(format!("Invalid EMAIL_FROM address: {}", e)))?;

        let mailer = if config.smtp_username.is_empty() {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(config.smtp_host.as_str())
                .port(config.smtp_port)
                .build()
        } else {
            let credentials =
                Credentials::new(config.smtp_username.clone(), config.smtp_password.clone());

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| InfrastructureError::Email(format!("Invalid SMTP relay: {}", e)))?
                .port(config.smtp_port)
                .credentials(credentials)
                .build()
        };

        info!(
            host = %config.smtp_host,
            port = config.smtp_port,
            event = "smtp_transport_ready",
            "SMTP email transport configured"
        );

        Ok(Self { mailer, from })
    }

    fn build_message(&self, to: &str, subject: &str, body: &str) -> Result<Message, String> {
        let recipient = to
            .parse::<Mailbox>()
            .map_err(|e| format!("Invalid recipient address: {}", e))?;

        Message::builder()
            .from(self.from.clone())
            .to(recipient)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| format!("Failed to build message: {}", e))
    }
}

#[async_trait]
impl EmailServiceTrait for SmtpEmailService {
    async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), String> {
        let message = self.build_message(to, subject, body)?;

        match self.mailer.send(message).await {
            Ok(response) => {
                info!(
                    to = %mask_email(to),
                    code = %response.code(),
                    event = "smtp_message_accepted",
                    "SMTP relay accepted message"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    to = %mask_email(to),
                    error = %e,
                    event = "smtp_send_failed",
                    "SMTP relay rejected message"
                );
                Err(e.to_string())
            }
        }
    }
}
