//! Outbound mail collaborator.
//!
//! Uses `lettre` for SMTP transport. Mail is sent strictly after the
//! authoring database transaction commits; a send failure is reported to the
//! caller as information, never as an operation failure.

use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::header::ContentType, transport::smtp::authentication::Credentials,
};
use thiserror::Error;

use crate::config::MailConfig;

/// Mail collaborator errors.
#[derive(Debug, Error)]
pub enum MailError {
    /// Failed to build the message.
    #[error("Failed to build email: {0}")]
    Build(String),
    /// Failed to send the message.
    #[error("Failed to send email: {0}")]
    Send(String),
    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),
}

/// Outbound mailer for member notifications.
#[derive(Clone)]
pub struct Mailer {
    config: MailConfig,
}

impl Mailer {
    /// Creates a new mailer.
    #[must_use]
    pub const fn new(config: MailConfig) -> Self {
        Self { config }
    }

    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
        let creds = Credentials::new(
            self.config.smtp_username.clone(),
            self.config.smtp_password.clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&self.config.smtp_host)
            .map_err(|e| MailError::Send(e.to_string()))?
            .port(self.config.smtp_port)
            .credentials(creds)
            .build();
        Ok(transport)
    }

    fn build_message(&self, to: &str, subject: &str, body: String) -> Result<Message, MailError> {
        Message::builder()
            .from(
                self.config
                    .sender
                    .parse()
                    .map_err(|_| MailError::InvalidAddress(self.config.sender.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| MailError::Build(e.to_string()))
    }

    /// Sends a plain-text message.
    ///
    /// # Errors
    ///
    /// Returns an error if the message cannot be built or sent.
    pub async fn send(&self, to: &str, subject: &str, body: String) -> Result<(), MailError> {
        let message = self.build_message(to, subject, body)?;
        let transport = self.create_transport()?;
        transport
            .send(message)
            .await
            .map_err(|e| MailError::Send(e.to_string()))?;
        Ok(())
    }

    /// Notifies a member that another member requested their guarantee.
    pub async fn send_guarantee_requested(
        &self,
        to: &str,
        guarantor_name: &str,
        applicant_name: &str,
        amount: &str,
    ) -> Result<(), MailError> {
        let subject = "Guarantee requested - Tamarind";
        let body = format!(
            r"Hi {guarantor_name},

{applicant_name} has requested that you guarantee {amount} of their loan
application. Sign in at {url} to accept or decline the request.

Best regards,
The Tamarind Team",
            url = self.config.domain_url,
        );
        self.send(to, subject, body).await
    }

    /// Notifies an applicant of a loan decision (approved, declined,
    /// disbursed).
    pub async fn send_loan_decision(
        &self,
        to: &str,
        member_name: &str,
        decision: &str,
        amount: &str,
    ) -> Result<(), MailError> {
        let subject = format!("Loan application {decision} - Tamarind");
        let body = format!(
            r"Hi {member_name},

Your loan application for {amount} has been {decision}. Sign in at {url}
for details.

Best regards,
The Tamarind Team",
            url = self.config.domain_url,
        );
        self.send(to, &subject, body).await
    }

    /// Sends a bulk-batch processing summary to the operator.
    pub async fn send_bulk_summary(
        &self,
        to: &str,
        reference: &str,
        success_count: u32,
        error_count: u32,
    ) -> Result<(), MailError> {
        let subject = format!("Bulk batch {reference} processed - Tamarind");
        let body = format!(
            r"Bulk batch {reference} finished processing.

Rows succeeded: {success_count}
Rows failed:    {error_count}

Sign in at {url} to review the batch log.

Best regards,
The Tamarind Team",
            url = self.config.domain_url,
        );
        self.send(to, &subject, body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> MailConfig {
        MailConfig {
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "user".to_string(),
            smtp_password: "pass".to_string(),
            sender: "no-reply@tamarind.example".to_string(),
            domain_url: "https://tamarind.example".to_string(),
        }
    }

    #[test]
    fn test_build_message_ok() {
        let mailer = Mailer::new(test_config());
        let message = mailer.build_message("member@example.com", "Hello", "Body".to_string());
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_invalid_recipient() {
        let mailer = Mailer::new(test_config());
        let message = mailer.build_message("not-an-address", "Hello", "Body".to_string());
        assert!(matches!(message, Err(MailError::InvalidAddress(_))));
    }

    #[test]
    fn test_build_message_invalid_sender() {
        let mut config = test_config();
        config.sender = "broken sender".to_string();
        let mailer = Mailer::new(config);
        let message = mailer.build_message("member@example.com", "Hello", "Body".to_string());
        assert!(matches!(message, Err(MailError::InvalidAddress(_))));
    }
}
