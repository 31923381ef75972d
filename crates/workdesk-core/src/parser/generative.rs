use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::Classifier;
use crate::ai::prompts::{classification_prompt, strip_code_fence};
use crate::ai::GenerativeBackend;
use crate::constants::CLASSIFY_TEMPERATURE;
use crate::models::ActionRecord;

/// Classifier that asks the generative backend for a JSON action record.
///
/// Never fails: backend errors and malformed responses yield `None` so the
/// next classifier in the chain gets a turn.
pub struct GenerativeClassifier {
    backend: Arc<dyn GenerativeBackend>,
}

impl GenerativeClassifier {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }
}

/// Decode a raw model response into a record, if it is a JSON object with an `action` key.
pub fn decode_response(raw: &str) -> Option<ActionRecord> {
    let text = strip_code_fence(raw);
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    ActionRecord::from_model_value(value)
}

#[async_trait]
impl Classifier for GenerativeClassifier {
    async fn classify(&self, utterance: &str) -> Option<ActionRecord> {
        let prompt = classification_prompt(utterance);
        let raw = match self.backend.generate(&prompt, CLASSIFY_TEMPERATURE).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(backend = self.backend.name(), error = %e, "classification call failed");
                return None;
            }
        };

        let record = decode_response(&raw);
        if record.is_none() {
            debug!(backend = self.backend.name(), "model response was not an action object");
        }
        record
    }

    fn name(&self) -> &str {
        "generative"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedBackend;

    #[test]
    fn test_decode_response_shapes() {
        assert_eq!(decode_response("```json\n{\"action\":\"help\"}\n```"), Some(ActionRecord::Help));
        assert_eq!(decode_response("{\"action\":\"list_files\"}"), Some(ActionRecord::ListFiles));
        assert_eq!(decode_response("Sure! {\"action\":\"help\"}"), None);
        assert_eq!(decode_response("[{\"action\":\"help\"}]"), None);
        assert_eq!(decode_response("{\"intent\":\"help\"}"), None);
        assert_eq!(decode_response(""), None);
    }

    #[tokio::test]
    async fn test_classify_uses_zero_temperature() {
        let backend = Arc::new(ScriptedBackend::new([Ok("{\"action\":\"show_draft\"}".to_string())]));
        let classifier = GenerativeClassifier::new(backend.clone());

        let record = classifier.classify("show it").await;

        assert_eq!(record, Some(ActionRecord::ShowDraft));
        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].temperature, 0.0);
        assert!(calls[0].prompt.ends_with("Command: show it\n"));
    }

    #[tokio::test]
    async fn test_classify_swallows_backend_errors() {
        let backend = Arc::new(ScriptedBackend::new([Err("timeout".to_string())]));
        let classifier = GenerativeClassifier::new(backend);
        assert_eq!(classifier.classify("list files").await, None);
    }
}
