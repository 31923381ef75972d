pub mod gmail;
pub mod mime;
pub mod outbox;

use async_trait::async_trait;

pub use gmail::GmailSender;
pub use outbox::OutboxSender;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub data: Vec<u8>,
}

/// A message ready for a [`MailSender`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingMail {
    pub fn new(recipients: Vec<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipients,
            subject: subject.into(),
            body: body.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, filename: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachments.push(Attachment { filename: filename.into(), data });
        self
    }

    /// Checked by every sender before any I/O.
    pub fn validate(&self) -> Result<(), MailError> {
        if self.recipients.iter().all(|r| r.trim().is_empty()) {
            return Err(MailError::NoRecipients);
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("No recipients provided.")]
    NoRecipients,

    #[error("Mail transport error: {0}")]
    Transport(String),

    #[error("Failed to write message: {0}")]
    Io(#[from] std::io::Error),
}

/// Delivers an [`OutgoingMail`]. Single attempt, no retry.
#[async_trait]
pub trait MailSender: Send + Sync {
    /// Send the message, returning a transport reference (message id or file path).
    async fn send(&self, mail: &OutgoingMail) -> Result<String, MailError>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_empty_recipients() {
        let mail = OutgoingMail::new(vec![], "s", "b");
        assert!(matches!(mail.validate(), Err(MailError::NoRecipients)));
        let mail = OutgoingMail::new(vec!["  ".into()], "s", "b");
        assert!(matches!(mail.validate(), Err(MailError::NoRecipients)));
        let mail = OutgoingMail::new(vec!["a@x.com".into()], "s", "b");
        assert!(mail.validate().is_ok());
    }
}
