//! Application-wide constants
//!
//! Centralized location for model names, temperatures and user-facing
//! defaults that are shared between the parser, the draft engine and the shell.

/// Default Cohere chat model
pub const DEFAULT_COHERE_MODEL: &str = "command-r-plus-08-2024";

/// Default OpenRouter chat model
pub const DEFAULT_OPENROUTER_MODEL: &str = "openai/gpt-4o-mini";

// Sampling temperatures per call kind. Classification must be deterministic.
pub const CLASSIFY_TEMPERATURE: f32 = 0.0;
pub const DRAFT_TEMPERATURE: f32 = 0.3;
pub const REFINE_TEMPERATURE: f32 = 0.2;
pub const SUMMARY_TEMPERATURE: f32 = 0.3;

/// Longest input passed to the summarizer, in characters
pub const SUMMARY_INPUT_LIMIT: usize = 50_000;

// Draft defaults
pub const DEFAULT_DRAFT_SUBJECT: &str = "Drafted Email";
pub const FALLBACK_DRAFT_SUBJECT: &str = "Email from Workspace Agent";
/// Characters kept when a subject is synthesized from the body's first line
pub const SUBJECT_FROM_BODY_CHARS: usize = 50;
/// Minimum characters of drafting context
pub const MIN_DRAFT_CONTEXT_CHARS: usize = 5;
/// Contexts with this many words or fewer trigger the clarification flow
pub const MAX_INSUFFICIENT_CONTEXT_WORDS: usize = 2;

/// Annotation appended to a draft when the refine response could not be parsed
pub const REFINE_UNPARSED_NOTE: &str = "[Refinement attempt failed: using original]";

/// Default time applied to events that do not name one (HH:MM)
pub const DEFAULT_EVENT_TIME: &str = "09:00";

/// Pending bulk-destructive confirmations expire after this many seconds (5 minutes)
pub const DEFAULT_CONFIRMATION_TTL_SECS: u64 = 5 * 60;

/// Shown whenever nothing in the cascade recognized the utterance
pub const UNRECOGNIZED_MESSAGE: &str = "Command not recognized. Try 'help'.";
