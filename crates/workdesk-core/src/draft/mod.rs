//! The per-session email draft and the operations that mutate it.
//!
//! The engine holds no draft state itself: every call takes the session's
//! [`DraftArtifact`] explicitly. `create` and `refine` either replace the
//! artifact or leave it as it was; `send` consumes it only on success.

pub mod clarify;

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::ai::prompts::{draft_prompt, refine_prompt, strip_code_fence, summary_prompt};
use crate::ai::GenerativeBackend;
use crate::constants::{
    DEFAULT_DRAFT_SUBJECT, DRAFT_TEMPERATURE, MAX_INSUFFICIENT_CONTEXT_WORDS, MIN_DRAFT_CONTEXT_CHARS,
    REFINE_TEMPERATURE, REFINE_UNPARSED_NOTE, SUMMARY_INPUT_LIMIT, SUMMARY_TEMPERATURE,
};
use crate::entities::extract_emails;
use crate::mail::{MailSender, OutgoingMail};
use crate::models::{subject_from_body, DraftArtifact, DraftKind};

pub use clarify::{ClarificationAnswers, CLARIFICATION_QUESTIONS};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftError {
    #[error("No draft exists. Create one first with 'draft ...'")]
    NoDraft,

    #[error("Please provide more details about what email you want to draft.")]
    NeedsMoreDetail,

    #[error("No recipients found. Who should receive this email? (e.g. 'send draft to name@example.com')")]
    MissingRecipients,

    #[error("No content to summarize.")]
    EmptyContent,

    #[error("Drafting failed: {0}")]
    Generation(String),

    #[error("Sending failed: {0}")]
    Send(String),
}

/// Result of a refine call. The draft always survives; `applied` says whether it changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefineOutcome {
    pub applied: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub recipients: Vec<String>,
    pub kind: DraftKind,
    /// Transport reference (message id or outbox path)
    pub reference: String,
}

impl SendReceipt {
    pub fn message(&self) -> String {
        let what = match self.kind {
            DraftKind::Email => "Email",
            DraftKind::Summary => "Summary",
        };
        format!("{} sent to {}", what, self.recipients.join(", "))
    }
}

pub struct DraftEngine {
    backend: Arc<dyn GenerativeBackend>,
}

impl DraftEngine {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Generate a fresh draft from free-text context.
    ///
    /// Too-short context is rejected with [`DraftError::NeedsMoreDetail`] so the
    /// caller can ask for more; nothing is mutated on any failure.
    pub async fn create<'a>(&self, draft: &'a mut DraftArtifact, context: &str) -> Result<&'a DraftArtifact, DraftError> {
        let context = context.trim();
        if context.chars().count() < MIN_DRAFT_CONTEXT_CHARS
            || context.split_whitespace().count() <= MAX_INSUFFICIENT_CONTEXT_WORDS
        {
            return Err(DraftError::NeedsMoreDetail);
        }

        let raw = self
            .backend
            .generate(&draft_prompt(context), DRAFT_TEMPERATURE)
            .await
            .map_err(|e| {
                warn!(backend = self.backend.name(), error = %e, "draft generation failed");
                DraftError::Generation(e.to_string())
            })?;

        let (subject, body) = parse_draft_response(&raw);
        if body.is_empty() {
            return Err(DraftError::Generation("the model returned an empty email".to_string()));
        }

        *draft = DraftArtifact {
            subject,
            body,
            recipients: Vec::new(),
            context: context.to_string(),
            kind: DraftKind::Email,
        };
        draft.set_recipients(extract_emails(context));
        info!(subject = %draft.subject, recipients = draft.recipients.len(), "draft created");
        Ok(draft)
    }

    pub fn show<'a>(&self, draft: &'a DraftArtifact) -> Result<&'a DraftArtifact, DraftError> {
        if draft.is_empty() {
            return Err(DraftError::NoDraft);
        }
        Ok(draft)
    }

    /// Apply a natural-language instruction to the current draft.
    ///
    /// Each field falls back to its prior value when the model leaves it empty.
    /// An unusable response keeps the draft and appends a visible note.
    pub async fn refine(&self, draft: &mut DraftArtifact, instruction: &str) -> Result<RefineOutcome, DraftError> {
        if draft.is_empty() {
            return Err(DraftError::NoDraft);
        }

        let prompt = refine_prompt(instruction.trim(), &draft.subject, &draft.body);
        let raw = match self.backend.generate(&prompt, REFINE_TEMPERATURE).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "refine call failed");
                draft.body.push_str(&format!("\n\n[Refinement failed: {}]", e));
                return Ok(RefineOutcome { applied: false });
            }
        };

        let parsed = parse_refine_response(&raw).filter(|(subject, body)| !subject.is_empty() || !body.is_empty());
        let Some((subject, body)) = parsed else {
            debug!("refine response had no usable subject or body");
            draft.body.push_str("\n\n");
            draft.body.push_str(REFINE_UNPARSED_NOTE);
            return Ok(RefineOutcome { applied: false });
        };

        if !subject.is_empty() {
            draft.subject = subject;
        }
        if !body.is_empty() {
            draft.body = body;
        }
        info!(subject = %draft.subject, "draft refined");
        Ok(RefineOutcome { applied: true })
    }

    pub fn clear(&self, draft: &mut DraftArtifact) {
        draft.reset();
        debug!("draft cleared");
    }

    /// Send the draft and reset it.
    ///
    /// Recipients come from the first non-empty source: `explicit`, addresses in
    /// `command_text`, then the draft's stored recipients. A failed send leaves
    /// the draft untouched.
    pub async fn send(
        &self,
        draft: &mut DraftArtifact,
        explicit: &[String],
        command_text: &str,
        mailer: &dyn MailSender,
    ) -> Result<SendReceipt, DraftError> {
        if draft.is_empty() {
            return Err(DraftError::NoDraft);
        }

        let recipients = resolve_recipients(explicit, command_text, &draft.recipients);
        if recipients.is_empty() {
            return Err(DraftError::MissingRecipients);
        }

        let subject = if draft.subject.trim().is_empty() {
            DEFAULT_DRAFT_SUBJECT.to_string()
        } else {
            draft.subject.clone()
        };
        let mail = OutgoingMail::new(recipients.clone(), subject, draft.body.clone());

        let reference = mailer.send(&mail).await.map_err(|e| {
            warn!(mailer = mailer.name(), error = %e, "sending draft failed");
            DraftError::Send(e.to_string())
        })?;

        let receipt = SendReceipt {
            recipients,
            kind: draft.kind,
            reference,
        };
        draft.reset();
        info!(recipients = receipt.recipients.len(), "draft sent");
        Ok(receipt)
    }

    /// One-paragraph summary of `text` (input capped at [`SUMMARY_INPUT_LIMIT`] chars).
    pub async fn summarize(&self, text: &str) -> Result<String, DraftError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DraftError::EmptyContent);
        }
        let snippet: String = text.chars().take(SUMMARY_INPUT_LIMIT).collect();

        let summary = self
            .backend
            .generate(&summary_prompt(&snippet), SUMMARY_TEMPERATURE)
            .await
            .map_err(|e| DraftError::Generation(format!("Summarization failed: {}", e)))?;

        let summary = strip_code_fence(&summary).trim().to_string();
        if summary.is_empty() {
            return Err(DraftError::Generation("the model returned an empty summary".to_string()));
        }
        Ok(summary)
    }

    /// Replace the draft with a summary of `title`, ready to send.
    pub fn create_summary<'a>(
        &self,
        draft: &'a mut DraftArtifact,
        title: &str,
        summary: &str,
        recipients: &[String],
    ) -> Result<&'a DraftArtifact, DraftError> {
        let summary = summary.trim();
        if summary.is_empty() {
            return Err(DraftError::EmptyContent);
        }
        *draft = DraftArtifact {
            subject: format!("Summary of {}", title.trim()),
            body: summary.to_string(),
            recipients: Vec::new(),
            context: title.trim().to_string(),
            kind: DraftKind::Summary,
        };
        draft.set_recipients(extract_emails(&recipients.join(" ")));
        info!(subject = %draft.subject, "summary draft created");
        Ok(draft)
    }
}

fn resolve_recipients(explicit: &[String], command_text: &str, stored: &[String]) -> Vec<String> {
    let explicit = extract_emails(&explicit.join(" "));
    if !explicit.is_empty() {
        return explicit;
    }
    let from_command = extract_emails(command_text);
    if !from_command.is_empty() {
        return from_command;
    }
    stored.to_vec()
}

fn json_field(object: &serde_json::Map<String, Value>, key: &str) -> String {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// `(subject, body)` from a drafting response: JSON first, then a `Subject:` line scan.
fn parse_draft_response(raw: &str) -> (String, String) {
    let text = strip_code_fence(raw);

    if let Ok(Value::Object(object)) = serde_json::from_str::<Value>(text) {
        let body = json_field(&object, "body");
        let mut subject = json_field(&object, "subject");
        if subject.is_empty() {
            subject = subject_from_body(&body);
        }
        return (subject, body);
    }

    let mut subject = String::new();
    let mut body_lines = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();
        if lower.starts_with("subject:") {
            subject = trimmed.get("subject:".len()..).unwrap_or_default().trim().to_string();
        } else if !trimmed.is_empty() && !lower.starts_with("json") && !lower.starts_with("```") {
            body_lines.push(trimmed.to_string());
        }
    }

    let body = if body_lines.is_empty() { text.trim().to_string() } else { body_lines.join("\n") };
    if subject.is_empty() {
        subject = subject_from_body(&body);
    }
    (subject, body)
}

/// `(subject, body)` from a refine response, or `None` if it is not a JSON object.
fn parse_refine_response(raw: &str) -> Option<(String, String)> {
    match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(object)) => Some((json_field(&object, "subject"), json_field(&object, "body"))),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::FALLBACK_DRAFT_SUBJECT;
    use crate::testing::{RecordingMailer, ScriptedBackend};

    const DRAFT_JSON: &str = r#"{"subject": "Sick Leave Request", "body": "Dear Manager,\n\nI need two days off.\n\nBest,\n[Your Name]"}"#;

    fn engine(responses: Vec<Result<String, String>>) -> (DraftEngine, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new(responses));
        (DraftEngine::new(backend.clone()), backend)
    }

    fn drafted() -> DraftArtifact {
        DraftArtifact {
            subject: "Original".into(),
            body: "Original body".into(),
            recipients: vec!["bob@x.com".into()],
            context: "ctx".into(),
            kind: DraftKind::Email,
        }
    }

    #[tokio::test]
    async fn test_create_then_show_then_clear() {
        let (engine, backend) = engine(vec![Ok(format!("```json\n{}\n```", DRAFT_JSON))]);
        let mut draft = DraftArtifact::default();

        engine
            .create(&mut draft, "schedule a sick leave request for two days starting Monday")
            .await
            .unwrap();

        let shown = engine.show(&draft).unwrap();
        assert_eq!(shown.subject, "Sick Leave Request");
        assert!(shown.body.starts_with("Dear Manager,"));
        assert_eq!(backend.calls()[0].temperature, DRAFT_TEMPERATURE);

        engine.clear(&mut draft);
        assert_eq!(engine.show(&draft), Err(DraftError::NoDraft));
    }

    #[tokio::test]
    async fn test_create_rejects_thin_context_without_calling_backend() {
        let (engine, backend) = engine(vec![]);
        let mut draft = drafted();

        assert_eq!(engine.create(&mut draft, "hi").await.err(), Some(DraftError::NeedsMoreDetail));
        assert_eq!(engine.create(&mut draft, "sick leave").await.err(), Some(DraftError::NeedsMoreDetail));
        assert_eq!(engine.create(&mut draft, "ab cd").await.err(), Some(DraftError::NeedsMoreDetail));
        assert!(backend.calls().is_empty());
        assert_eq!(draft, drafted());
    }

    #[tokio::test]
    async fn test_create_failure_keeps_prior_draft() {
        let (engine, _) = engine(vec![Err("connection refused".into())]);
        let mut draft = drafted();

        let err = engine.create(&mut draft, "write to the team about friday").await.unwrap_err();

        assert_eq!(err, DraftError::Generation("connection refused".into()));
        assert_eq!(draft, drafted());
    }

    #[tokio::test]
    async fn test_create_extracts_recipients_and_synthesizes_subject() {
        let (engine, _) = engine(vec![Ok(r#"{"body": "Hi Carol,\nThe report is attached."}"#.into())]);
        let mut draft = DraftArtifact::default();

        engine
            .create(&mut draft, "tell carol@x.com and dan@y.org the report is ready, cc carol@x.com")
            .await
            .unwrap();

        assert_eq!(draft.subject, "Hi Carol,");
        assert_eq!(draft.recipients, vec!["carol@x.com", "dan@y.org"]);
    }

    #[tokio::test]
    async fn test_create_text_fallback() {
        let reply = "Subject: Offsite Planning\n\nHello team,\nLet's plan the offsite.\n";
        let (engine, _) = engine(vec![Ok(reply.into())]);
        let mut draft = DraftArtifact::default();

        engine.create(&mut draft, "ask the team about offsite plans").await.unwrap();

        assert_eq!(draft.subject, "Offsite Planning");
        assert_eq!(draft.body, "Hello team,\nLet's plan the offsite.");
    }

    #[tokio::test]
    async fn test_create_empty_body_is_an_error() {
        let (engine, _) = engine(vec![Ok(r#"{"subject": "Hi", "body": "  "}"#.into())]);
        let mut draft = DraftArtifact::default();
        let err = engine.create(&mut draft, "ask the team about offsite plans").await.unwrap_err();
        assert!(matches!(err, DraftError::Generation(_)));
        assert!(draft.is_empty());
    }

    #[tokio::test]
    async fn test_refine_replaces_with_field_fallback() {
        let (engine, backend) = engine(vec![Ok(r#"{"subject": "", "body": "Shorter body"}"#.into())]);
        let mut draft = drafted();

        let outcome = engine.refine(&mut draft, "make it shorter").await.unwrap();

        assert!(outcome.applied);
        assert_eq!(draft.subject, "Original");
        assert_eq!(draft.body, "Shorter body");
        assert_eq!(draft.recipients, vec!["bob@x.com"]);
        let call = &backend.calls()[0];
        assert_eq!(call.temperature, REFINE_TEMPERATURE);
        assert!(call.prompt.contains("Body: Original body"));
    }

    #[tokio::test]
    async fn test_refine_invalid_json_preserves_and_annotates() {
        let (engine, _) = engine(vec![Ok("Sure, here is a shorter version!".into())]);
        let mut draft = drafted();

        let outcome = engine.refine(&mut draft, "make it shorter").await.unwrap();

        assert!(!outcome.applied);
        let shown = engine.show(&draft).unwrap();
        assert_eq!(shown.subject, "Original");
        assert_eq!(shown.body, format!("Original body\n\n{}", REFINE_UNPARSED_NOTE));
    }

    #[tokio::test]
    async fn test_refine_empty_object_is_not_applied() {
        let (engine, _) = engine(vec![Ok(r#"{"note": "nothing to change"}"#.into())]);
        let mut draft = drafted();

        let outcome = engine.refine(&mut draft, "make it shorter").await.unwrap();

        assert!(!outcome.applied);
        assert_eq!(draft.subject, "Original");
        assert_eq!(draft.body, format!("Original body\n\n{}", REFINE_UNPARSED_NOTE));
    }

    #[tokio::test]
    async fn test_refine_backend_error_preserves_and_annotates() {
        let (engine, _) = engine(vec![Err("503".into())]);
        let mut draft = drafted();

        engine.refine(&mut draft, "more formal").await.unwrap();

        assert_eq!(draft.body, "Original body\n\n[Refinement failed: 503]");
    }

    #[tokio::test]
    async fn test_refine_without_draft() {
        let (engine, _) = engine(vec![]);
        let mut draft = DraftArtifact::default();
        assert_eq!(engine.refine(&mut draft, "shorter").await, Err(DraftError::NoDraft));
    }

    #[tokio::test]
    async fn test_send_recipient_fallback_chain() {
        let (engine, _) = engine(vec![]);
        let mailer = RecordingMailer::new();

        // stored recipients when nothing else is given
        let mut draft = drafted();
        let receipt = engine.send(&mut draft, &[], "send it", &mailer).await.unwrap();
        assert_eq!(receipt.recipients, vec!["bob@x.com"]);
        assert_eq!(receipt.message(), "Email sent to bob@x.com");
        assert!(draft.is_empty());

        // command text beats stored
        let mut draft = drafted();
        let receipt = engine.send(&mut draft, &[], "send to amy@z.io", &mailer).await.unwrap();
        assert_eq!(receipt.recipients, vec!["amy@z.io"]);

        // explicit beats command text; non-addresses are ignored
        let mut draft = drafted();
        let explicit = vec!["my manager".to_string(), "eve@q.net".to_string()];
        let receipt = engine.send(&mut draft, &explicit, "send to amy@z.io", &mailer).await.unwrap();
        assert_eq!(receipt.recipients, vec!["eve@q.net"]);

        assert_eq!(mailer.sent().len(), 3);
        assert_eq!(mailer.sent()[0].subject, "Original");
    }

    #[tokio::test]
    async fn test_send_without_any_recipient_fails() {
        let (engine, _) = engine(vec![]);
        let mailer = RecordingMailer::new();
        let mut draft = DraftArtifact {
            recipients: vec![],
            ..drafted()
        };

        let err = engine.send(&mut draft, &["my manager".to_string()], "send it", &mailer).await;

        assert_eq!(err, Err(DraftError::MissingRecipients));
        assert!(!draft.is_empty());
        assert!(mailer.sent().is_empty());
    }

    #[tokio::test]
    async fn test_send_failure_preserves_draft() {
        let (engine, _) = engine(vec![]);
        let mailer = RecordingMailer::failing("smtp down");
        let mut draft = drafted();

        let err = engine.send(&mut draft, &[], "", &mailer).await.unwrap_err();

        assert_eq!(err, DraftError::Send("Mail transport error: smtp down".into()));
        assert_eq!(draft, drafted());
    }

    #[tokio::test]
    async fn test_send_defaults_subject() {
        let (engine, _) = engine(vec![]);
        let mailer = RecordingMailer::new();
        let mut draft = DraftArtifact { subject: String::new(), ..drafted() };

        engine.send(&mut draft, &[], "", &mailer).await.unwrap();

        assert_eq!(mailer.sent()[0].subject, DEFAULT_DRAFT_SUBJECT);
    }

    #[tokio::test]
    async fn test_send_without_draft() {
        let (engine, _) = engine(vec![]);
        let mailer = RecordingMailer::new();
        let mut draft = DraftArtifact::default();
        assert_eq!(
            engine.send(&mut draft, &["a@x.com".to_string()], "", &mailer).await,
            Err(DraftError::NoDraft)
        );
    }

    #[tokio::test]
    async fn test_summary_draft_flow() {
        let (engine, backend) = engine(vec![Ok("Revenue grew 12% in Q3.".into())]);
        let mailer = RecordingMailer::new();
        let mut draft = DraftArtifact::default();

        let long_text = "x".repeat(SUMMARY_INPUT_LIMIT + 500);
        let summary = engine.summarize(&long_text).await.unwrap();
        assert_eq!(summary, "Revenue grew 12% in Q3.");
        let call = &backend.calls()[0];
        assert_eq!(call.temperature, SUMMARY_TEMPERATURE);
        assert!(!call.prompt.contains(&"x".repeat(SUMMARY_INPUT_LIMIT + 1)));

        engine
            .create_summary(&mut draft, "report.pdf", &summary, &["alice@example.com".to_string()])
            .unwrap();
        assert_eq!(draft.kind, DraftKind::Summary);
        assert_eq!(draft.subject, "Summary of report.pdf");

        let receipt = engine.send(&mut draft, &[], "", &mailer).await.unwrap();
        assert_eq!(receipt.message(), "Summary sent to alice@example.com");
    }

    #[tokio::test]
    async fn test_summarize_empty_text() {
        let (engine, _) = engine(vec![]);
        assert_eq!(engine.summarize("  ").await, Err(DraftError::EmptyContent));
    }

    #[test]
    fn test_parse_draft_response_fallback_subject() {
        let (subject, body) = parse_draft_response("");
        assert_eq!(subject, FALLBACK_DRAFT_SUBJECT);
        assert!(body.is_empty());
    }
}
