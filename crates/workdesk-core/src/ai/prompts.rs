//! Prompt templates sent to the generative backend.
//!
//! The classification prompt is rendered from [`ActionRecord::catalogue`] so the
//! tags it promises always decode back into a variant.

use crate::models::ActionRecord;

/// Build the fixed classification prompt for `utterance`.
pub fn classification_prompt(utterance: &str) -> String {
    let mut prompt = String::from(
        "You are a command interpreter for a Google Workspace assistant.\n\
         Return ONLY a single valid JSON object, no prose, no markdown.\n\n\
         Valid actions:\n",
    );
    for (i, example) in ActionRecord::catalogue().iter().enumerate() {
        prompt.push_str(&format!("{}. {}\n", i + 1, example.to_json()));
    }
    prompt.push_str("\nParse this command and output JSON only:\nCommand: ");
    prompt.push_str(utterance);
    prompt.push('\n');
    prompt
}

pub fn draft_prompt(context: &str) -> String {
    format!(
        "You are a professional email assistant. Generate a complete, ready-to-send email based on this request:\n\n\
         Request: {context}\n\n\
         Create a JSON response with:\n\
         1. \"subject\": A clear, concise subject line (max 10 words)\n\
         2. \"body\": The complete email body with:\n   \
            - Appropriate greeting\n   \
            - Clear main message\n   \
            - Professional closing\n   \
            - Signature placeholder: [Your Name]\n\n\
         The email should be professional, clear, and ready to send immediately.\n\n\
         Return ONLY valid JSON, no other text:"
    )
}

pub fn refine_prompt(instruction: &str, subject: &str, body: &str) -> String {
    let subject = if subject.is_empty() { "(No subject)" } else { subject };
    format!(
        "You are a professional email assistant. Refine this email draft according to the instruction.\n\n\
         Current Email:\n\
         Subject: {subject}\n\
         Body: {body}\n\n\
         Instruction: {instruction}\n\n\
         Return ONLY a JSON object with \"subject\" and \"body\" containing the refined email.\n\
         Keep the same general content but adjust the tone/length/style as requested."
    )
}

pub fn summary_prompt(text: &str) -> String {
    format!(
        "Summarize the following document in one short paragraph. \
         Return only the summary text.\n\n{text}"
    )
}

/// Remove a surrounding Markdown code fence (optionally tagged `json`).
pub fn strip_code_fence(text: &str) -> &str {
    let mut inner = text.trim();
    if let Some(rest) = inner.strip_prefix("```") {
        inner = rest;
        if inner.get(..4).is_some_and(|tag| tag.eq_ignore_ascii_case("json")) {
            inner = &inner[4..];
        }
        inner = inner.trim_start();
    }
    if let Some(rest) = inner.strip_suffix("```") {
        inner = rest.trim_end();
    }
    inner
}
