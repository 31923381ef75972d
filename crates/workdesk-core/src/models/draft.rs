use serde::{Deserialize, Serialize};

use crate::constants::{FALLBACK_DRAFT_SUBJECT, SUBJECT_FROM_BODY_CHARS};

/// What a draft was composed from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DraftKind {
    #[default]
    Email,
    Summary,
}

/// The single in-progress email held per session.
///
/// An empty `body` is the canonical "no draft" state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftArtifact {
    pub subject: String,
    pub body: String,
    /// Order-preserving, de-duplicated
    pub recipients: Vec<String>,
    pub context: String,
    #[serde(default)]
    pub kind: DraftKind,
}

impl DraftArtifact {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Replace the recipient list, dropping duplicates while keeping first-seen order.
    pub fn set_recipients<I, S>(&mut self, recipients: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipients.clear();
        for recipient in recipients {
            let recipient = recipient.into();
            if !recipient.is_empty() && !self.recipients.contains(&recipient) {
                self.recipients.push(recipient);
            }
        }
    }

    /// Body preview (first 100 chars, newlines flattened)
    pub fn preview(&self) -> String {
        self.body.chars().take(100).collect::<String>().replace('\n', " ")
    }
}

/// Derive a subject from the first line of a body (truncated to 50 chars).
pub fn subject_from_body(body: &str) -> String {
    let subject = body
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .chars()
        .take(SUBJECT_FROM_BODY_CHARS)
        .collect::<String>()
        .trim()
        .to_string();

    if subject.is_empty() { FALLBACK_DRAFT_SUBJECT.to_string() } else { subject }
}
