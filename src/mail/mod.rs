mod smtp;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;

pub use smtp::SmtpMailer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("could not build message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: Email) -> Result<(), MailError>;
}

pub type SharedMailer = Arc<dyn Mailer>;

/// Used when no SMTP server is configured: the email only reaches the log.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, email: Email) -> Result<(), MailError> {
        tracing::info!(to = %email.to, subject = %email.subject, "email not sent, smtp is not configured");
        Ok(())
    }
}

/// Sends `email`, logging instead of failing. Notifications never fail a request.
pub async fn notify(mailer: &dyn Mailer, email: Email) -> bool {
    let to = email.to.clone();
    match mailer.send(email).await {
        Ok(()) => true,
        Err(err) => {
            tracing::warn!(%to, error = %err, "failed to send email");
            false
        }
    }
}
