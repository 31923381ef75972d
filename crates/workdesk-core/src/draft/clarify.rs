//! Questions asked when a draft request carries too little context.

/// Prompts shown in order: purpose, recipient, key details, tone.
pub const CLARIFICATION_QUESTIONS: [&str; 4] = [
    "Purpose of this email (e.g., sick leave, meeting request, etc.): ",
    "Who is this for? (manager, colleague, client, team, etc.): ",
    "Key details/dates/reason: ",
    "Tone? (formal, casual, urgent, polite) [formal]: ",
];

pub const DEFAULT_TONE: &str = "formal";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClarificationAnswers {
    pub purpose: String,
    pub recipient: String,
    pub details: String,
    pub tone: String,
}

impl ClarificationAnswers {
    /// Build from answers given in [`CLARIFICATION_QUESTIONS`] order. Missing answers are empty.
    pub fn from_answers<S: AsRef<str>>(answers: &[S]) -> Self {
        let get = |i: usize| answers.get(i).map(|a| a.as_ref().trim().to_string()).unwrap_or_default();
        Self {
            purpose: get(0),
            recipient: get(1),
            details: get(2),
            tone: get(3),
        }
    }

    /// The drafting context, or `None` when no purpose was given (the flow is aborted).
    pub fn into_context(self) -> Option<String> {
        if self.purpose.is_empty() {
            return None;
        }
        let tone = if self.tone.is_empty() { DEFAULT_TONE.to_string() } else { self.tone };
        Some(format!(
            "Email purpose: {}\nRecipient: {}\nDetails: {}\nTone: {}",
            self.purpose, self.recipient, self.details, tone
        ))
    }
}
