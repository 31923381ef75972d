//! Test doubles for the collaborator traits.

use std::collections::VecDeque;

use anyhow::Result;
use async_trait::async_trait;
use parking_lot::Mutex;

use crate::ai::GenerativeBackend;
use crate::mail::{MailError, MailSender, OutgoingMail};

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub prompt: String,
    pub temperature: f32,
}

/// Backend that replays scripted responses in order and records every call.
///
/// `Err(message)` entries fail the call with that message; an exhausted script
/// fails every further call.
pub struct ScriptedBackend {
    responses: Mutex<VecDeque<Result<String, String>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedBackend {
    pub fn new<I>(responses: I) -> Self
    where
        I: IntoIterator<Item = Result<String, String>>,
    {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Convenience: every response succeeds.
    pub fn replying<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(responses.into_iter().map(|r| Ok(r.into())))
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl GenerativeBackend for ScriptedBackend {
    async fn generate(&self, prompt: &str, temperature: f32) -> Result<String> {
        self.calls.lock().push(RecordedCall {
            prompt: prompt.to_string(),
            temperature,
        });
        match self.responses.lock().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(anyhow::anyhow!(message)),
            None => anyhow::bail!("scripted backend exhausted"),
        }
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Mail sender that records messages, optionally failing every send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<OutgoingMail>>,
    fail_with: Option<String>,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<String, MailError> {
        mail.validate()?;
        if let Some(message) = &self.fail_with {
            return Err(MailError::Transport(message.clone()));
        }
        let mut sent = self.sent.lock();
        sent.push(mail.clone());
        Ok(format!("recorded-{}", sent.len()))
    }

    fn name(&self) -> &str {
        "recording"
    }
}
