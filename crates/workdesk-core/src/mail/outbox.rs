use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;

use super::mime::encode;
use super::{MailError, MailSender, OutgoingMail};

/// Writes each message as an `.eml` file instead of delivering it
pub struct OutboxSender {
    dir: PathBuf,
}

impl OutboxSender {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl MailSender for OutboxSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<String, MailError> {
        mail.validate()?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let stamp = Utc::now().format("%Y%m%dT%H%M%S%.6f");
        let path = self.dir.join(format!("{}.eml", stamp));
        tokio::fs::write(&path, encode(mail)).await?;

        info!(path = %path.display(), recipients = mail.recipients.len(), "wrote mail to outbox");
        Ok(path.display().to_string())
    }

    fn name(&self) -> &str {
        "outbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_writes_eml_file() {
        let dir = tempdir().unwrap();
        let sender = OutboxSender::new(dir.path().join("outbox"));
        let mail = OutgoingMail::new(vec!["a@x.com".into()], "Hi", "Body");

        let path = sender.send(&mail).await.unwrap();

        assert!(path.ends_with(".eml"));
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("To: a@x.com"));
        assert!(written.ends_with("Body"));
    }

    #[tokio::test]
    async fn test_no_recipients_writes_nothing() {
        let dir = tempdir().unwrap();
        let outbox = dir.path().join("outbox");
        let sender = OutboxSender::new(outbox.clone());
        let mail = OutgoingMail::new(vec![], "Hi", "Body");

        assert!(matches!(sender.send(&mail).await, Err(MailError::NoRecipients)));
        assert!(!outbox.exists());
    }
}
