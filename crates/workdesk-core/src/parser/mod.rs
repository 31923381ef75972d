//! Command interpretation: contact pre-resolution followed by a chain of
//! classifiers, generative first and the rule table last.

pub mod contacts;
pub mod generative;
pub mod heuristic;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::ai::GenerativeBackend;
use crate::models::ActionRecord;

pub use contacts::{resolve_contact_names, ContactResolver};
pub use generative::GenerativeClassifier;
pub use heuristic::{parse_heuristically, HeuristicClassifier};

/// One strategy for turning an utterance into an action record.
///
/// Returning `None` hands the utterance to the next classifier in the chain.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, utterance: &str) -> Option<ActionRecord>;

    fn name(&self) -> &str;
}

/// Whose contacts to consult, and where.
#[derive(Clone, Copy)]
pub struct ContactScope<'a> {
    pub resolver: &'a dyn ContactResolver,
    pub user_id: &'a str,
}

pub struct CommandInterpreter {
    chain: Vec<Arc<dyn Classifier>>,
}

impl CommandInterpreter {
    pub fn new(chain: Vec<Arc<dyn Classifier>>) -> Self {
        Self { chain }
    }

    /// Rule table only; never touches the network.
    pub fn heuristic_only() -> Self {
        Self::new(vec![Arc::new(HeuristicClassifier)])
    }

    /// Ask the model first, fall back to the rule table.
    pub fn with_backend(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self::new(vec![
            Arc::new(GenerativeClassifier::new(backend)),
            Arc::new(HeuristicClassifier),
        ])
    }

    pub fn classifier_names(&self) -> Vec<&str> {
        self.chain.iter().map(|c| c.name()).collect()
    }

    /// Classify one utterance. Always yields exactly one record.
    pub async fn interpret(&self, utterance: &str, contacts: Option<ContactScope<'_>>) -> ActionRecord {
        let rewritten = match contacts {
            Some(scope) => resolve_contact_names(utterance, scope.user_id, scope.resolver),
            None => utterance.to_string(),
        };

        for classifier in &self.chain {
            if let Some(record) = classifier.classify(&rewritten).await {
                debug!(classifier = classifier.name(), action = record.tag(), "utterance classified");
                return record;
            }
        }
        ActionRecord::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::DisabledBackend;
    use crate::testing::ScriptedBackend;
    use anyhow::Result;

    struct OneContact;

    impl ContactResolver for OneContact {
        fn lookup(&self, _user_id: &str, display_name: &str) -> Result<Option<String>> {
            Ok((display_name.eq_ignore_ascii_case("alice")).then(|| "alice@example.com".to_string()))
        }
    }

    #[tokio::test]
    async fn test_bulk_delete_then_confirmation_tokens() {
        let interpreter = CommandInterpreter::heuristic_only();
        assert_eq!(
            interpreter.interpret("delete all my upcoming events", None).await,
            ActionRecord::DeleteAllEvents
        );
        assert_eq!(interpreter.interpret("yes", None).await, ActionRecord::ConfirmYes);
        assert_eq!(interpreter.interpret("no", None).await, ActionRecord::ConfirmNo);

        let undecided = interpreter.interpret("I don't know", None).await;
        assert_ne!(undecided, ActionRecord::ConfirmYes);
        assert_ne!(undecided, ActionRecord::ConfirmNo);
    }

    #[tokio::test]
    async fn test_odd_input_still_yields_a_record() {
        let interpreter = CommandInterpreter::with_backend(Arc::new(DisabledBackend));
        for input in ["", "   ", "\0\0", "\u{1b}[31m", "\t\n"] {
            assert_eq!(interpreter.interpret(input, None).await, ActionRecord::Unknown);
        }
    }

    #[tokio::test]
    async fn test_model_answer_wins_when_usable() {
        let backend = Arc::new(ScriptedBackend::replying([r#"{"action": "list_tasks"}"#]));
        let interpreter = CommandInterpreter::with_backend(backend.clone());
        assert_eq!(interpreter.interpret("what's on my plate", None).await, ActionRecord::ListTasks);
        assert_eq!(backend.calls().len(), 1);
        assert_eq!(backend.calls()[0].temperature, 0.0);
    }

    #[tokio::test]
    async fn test_falls_back_on_backend_error_and_garbage() {
        let backend = Arc::new(ScriptedBackend::new([
            Err("connection refused".to_string()),
            Ok("Sure! Here you go: list files".to_string()),
            Ok(r#"[{"action": "exit"}]"#.to_string()),
        ]));
        let interpreter = CommandInterpreter::with_backend(backend);
        assert_eq!(interpreter.interpret("list files", None).await, ActionRecord::ListFiles);
        assert_eq!(interpreter.interpret("show my draft", None).await, ActionRecord::ShowDraft);
        assert_eq!(interpreter.interpret("help", None).await, ActionRecord::Help);
    }

    #[tokio::test]
    async fn test_contacts_are_resolved_before_classification() {
        let backend = Arc::new(ScriptedBackend::replying([r#"{"action": "unknown"}"#]));
        let interpreter = CommandInterpreter::with_backend(backend.clone());
        let scope = ContactScope { resolver: &OneContact, user_id: "u1" };

        interpreter.interpret("send the draft to Alice", Some(scope)).await;
        assert!(backend.calls()[0].prompt.contains("Command: send the draft to alice@example.com"));

        let offline = CommandInterpreter::heuristic_only();
        assert_eq!(
            offline.interpret("send the draft to Alice", Some(scope)).await,
            ActionRecord::SendDraft { email: Some(vec!["alice@example.com".to_string()]) }
        );
    }

    #[tokio::test]
    async fn test_empty_chain_is_unknown() {
        let interpreter = CommandInterpreter::new(Vec::new());
        assert!(interpreter.classifier_names().is_empty());
        assert_eq!(interpreter.interpret("list files", None).await, ActionRecord::Unknown);
    }
}
