use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::mime::to_gmail_raw;
use super::{MailError, MailSender, OutgoingMail};

const GMAIL_SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

#[derive(Debug, Deserialize)]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
}

/// Sends through the Gmail REST API with a pre-obtained OAuth access token
pub struct GmailSender {
    access_token: String,
    client: reqwest::Client,
}

impl GmailSender {
    pub fn new(access_token: String) -> Self {
        Self {
            access_token,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl MailSender for GmailSender {
    async fn send(&self, mail: &OutgoingMail) -> Result<String, MailError> {
        mail.validate()?;

        let body = serde_json::json!({ "raw": to_gmail_raw(mail) });

        let response = self.client
            .post(GMAIL_SEND_URL)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| MailError::Transport(format!("Failed to send request to Gmail: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(MailError::Transport(format!("Gmail API error ({}): {}", status, error_text)));
        }

        let sent: SendResponse = response
            .json()
            .await
            .map_err(|e| MailError::Transport(format!("Failed to parse Gmail response: {}", e)))?;

        let id = sent.id.unwrap_or_default();
        info!(message_id = %id, recipients = mail.recipients.len(), "sent mail via gmail");
        Ok(id)
    }

    fn name(&self) -> &str {
        "gmail"
    }
}
