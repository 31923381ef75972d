//! Deterministic fallback classifier.
//!
//! An ordered table of independent rules evaluated top to bottom; the first
//! rule that returns a record wins. Categories overlap, so order is part of the
//! grammar: summary drafts before generic drafts, send-draft before send-file,
//! summarize-by-id before summarize-by-name.
//!
//! Rules match case-insensitively against the original utterance so captured
//! content (file names, addresses, instructions) keeps its casing.

use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use super::Classifier;
use crate::constants::MAX_INSUFFICIENT_CONTEXT_WORDS;
use crate::entities::{extract_context_after_keyword, extract_emails};
use crate::models::ActionRecord;

macro_rules! static_regex {
    ($name:ident, $pattern:expr) => {
        fn $name() -> &'static Regex {
            static RE: OnceLock<Regex> = OnceLock::new();
            RE.get_or_init(|| {
                Regex::new($pattern).expect(concat!(stringify!($name), " regex must compile"))
            })
        }
    };
}

/// An utterance prepared for rule matching.
pub struct Utterance<'a> {
    /// Trimmed original text
    pub original: &'a str,
    /// Lowercased copy for substring and whole-string tests
    pub lower: String,
}

impl<'a> Utterance<'a> {
    pub fn new(text: &'a str) -> Self {
        let original = text.trim();
        Self {
            original,
            lower: original.to_lowercase(),
        }
    }

    fn words(&self) -> impl Iterator<Item = &str> {
        self.lower.split_whitespace()
    }

    fn has_word(&self, word: &str) -> bool {
        self.words().any(|w| w == word)
    }
}

/// One entry in the rule table.
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&Utterance<'_>) -> Option<ActionRecord>,
}

/// The rule table, in precedence order.
pub const RULES: &[Rule] = &[
    // session
    Rule { name: "exit", apply: exit },
    Rule { name: "help", apply: help },
    // draft management
    Rule { name: "show_draft", apply: show_draft },
    Rule { name: "clear_draft", apply: clear_draft },
    // tasks
    Rule { name: "list_tasks", apply: list_tasks },
    Rule { name: "add_task", apply: add_task },
    Rule { name: "complete_task", apply: complete_task },
    Rule { name: "delete_task", apply: delete_task },
    // notes
    Rule { name: "list_notes", apply: list_notes },
    Rule { name: "create_note", apply: create_note },
    Rule { name: "get_note", apply: get_note },
    Rule { name: "delete_note", apply: delete_note },
    Rule { name: "search_notes", apply: search_notes },
    // calendar
    Rule { name: "list_events", apply: list_events },
    Rule { name: "list_today", apply: list_today },
    Rule { name: "list_date", apply: list_date },
    Rule { name: "create_event", apply: create_event },
    Rule { name: "get_event", apply: get_event },
    Rule { name: "delete_event", apply: delete_event },
    // meet
    Rule { name: "schedule_meet", apply: schedule_meet },
    Rule { name: "send_meet_invite", apply: send_meet_invite },
    // images and folders
    Rule { name: "show_image", apply: show_image },
    Rule { name: "show_images", apply: show_images },
    Rule { name: "view_folder", apply: view_folder },
    // must precede generic draft creation
    Rule { name: "draft_summary", apply: draft_summary },
    Rule { name: "delete_all_events", apply: delete_all_events },
    Rule { name: "confirm", apply: confirm },
    Rule { name: "draft_email", apply: draft_email },
    Rule { name: "draft_email_about", apply: draft_email_about },
    Rule { name: "refine_draft", apply: refine_draft },
    Rule { name: "send_draft", apply: send_draft },
    Rule { name: "send_draft_bare", apply: send_draft_bare },
    Rule { name: "list_files", apply: list_files },
    Rule { name: "search_files", apply: search_files },
    Rule { name: "summarize_by_id", apply: summarize_by_id },
    Rule { name: "summarize_by_name", apply: summarize_by_name },
    Rule { name: "send_file", apply: send_file },
];

/// Classify `text` with the rule table. Total: unmatched input is `Unknown`.
pub fn parse_heuristically(text: &str) -> ActionRecord {
    let utterance = Utterance::new(text);
    for rule in RULES {
        if let Some(record) = (rule.apply)(&utterance) {
            debug!(rule = rule.name, action = record.tag(), "heuristic rule matched");
            return record;
        }
    }
    debug!("no heuristic rule matched");
    ActionRecord::Unknown
}

/// Rule-table classifier. Always produces a record.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

#[async_trait]
impl Classifier for HeuristicClassifier {
    async fn classify(&self, utterance: &str) -> Option<ActionRecord> {
        Some(parse_heuristically(utterance))
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn capture(caps: &regex::Captures<'_>, index: usize) -> Option<String> {
    caps.get(index)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn split_list(text: &str) -> Vec<String> {
    re_list_separator()
        .split(text)
        .map(|part| part.trim().trim_matches(|c| c == '"' || c == '\'').trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}

/// Emails in `raw`, or `raw` itself as the single recipient
fn recipients_or_raw(raw: &str) -> Vec<String> {
    let emails = extract_emails(raw);
    if emails.is_empty() { vec![raw.trim().to_string()] } else { emails }
}

fn draft_context(context: &str) -> ActionRecord {
    let context = context.trim();
    let text = if context.split_whitespace().count() <= MAX_INSUFFICIENT_CONTEXT_WORDS {
        String::new()
    } else {
        context.to_string()
    };
    ActionRecord::DraftEmail { text: Some(text) }
}

static_regex!(re_list_separator, r"(?i)[,&]|\s+and\s+");

// =============================================================================
// Session
// =============================================================================

static_regex!(re_exit, r"(?i)\b(exit|quit|bye|close)\b");
static_regex!(re_help, r"(?i)\b(help|what can you do|commands)\b");

fn exit(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_exit().is_match(u.original).then_some(ActionRecord::Exit)
}

fn help(u: &Utterance<'_>) -> Option<ActionRecord> {
    (u.lower == "?" || re_help().is_match(u.original)).then_some(ActionRecord::Help)
}

// =============================================================================
// Draft management
// =============================================================================

static_regex!(re_show_draft, r"(?i)\b(show|display|view)\b.*\bdraft\b");
static_regex!(re_clear_draft, r"(?i)\b(clear|delete|discard|erase)\b.*\bdraft\b");

fn show_draft(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_show_draft().is_match(u.original).then_some(ActionRecord::ShowDraft)
}

fn clear_draft(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_clear_draft().is_match(u.original).then_some(ActionRecord::ClearDraft)
}

// =============================================================================
// Tasks
// =============================================================================

static_regex!(re_list_tasks, r"(?i)\blist\s+tasks?\b");
static_regex!(re_add_task, r"(?i)\badd\s+task:?\s*(.+?)(?:\s+due:\s*(.+))?$");
static_regex!(re_complete_task, r"(?i)\bcomplete\s+task\s+(\d+)");
static_regex!(re_delete_task, r"(?i)\bdelete\s+task\s+(\d+)");

fn list_tasks(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_list_tasks().is_match(u.original).then_some(ActionRecord::ListTasks)
}

fn add_task(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_add_task().captures(u.original)?;
    Some(ActionRecord::AddTask {
        text: capture(&caps, 1),
        due: capture(&caps, 2),
    })
}

fn complete_task(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_complete_task().captures(u.original)?;
    Some(ActionRecord::CompleteTask { task_id: capture(&caps, 1) })
}

fn delete_task(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_delete_task().captures(u.original)?;
    Some(ActionRecord::DeleteTask { task_id: capture(&caps, 1) })
}

// =============================================================================
// Notes
// =============================================================================

static_regex!(re_list_notes, r"(?i)\blist\s+notes?\b");
static_regex!(re_create_note, r"(?i)\bcreate\s+note:?\s*(.+?)\s*-\s*(.+)");
static_regex!(re_get_note, r"(?i)\bget\s+note\s+(\d+)");
static_regex!(re_delete_note, r"(?i)\bdelete\s+note\s+(\d+)");
static_regex!(re_search_notes, r"(?i)\bsearch\s+notes?:?\s*(.+)");

fn list_notes(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_list_notes().is_match(u.original).then_some(ActionRecord::ListNotes)
}

fn create_note(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_create_note().captures(u.original)?;
    Some(ActionRecord::CreateNote {
        title: capture(&caps, 1),
        content: capture(&caps, 2),
    })
}

fn get_note(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_get_note().captures(u.original)?;
    Some(ActionRecord::GetNote { note_id: capture(&caps, 1) })
}

fn delete_note(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_delete_note().captures(u.original)?;
    Some(ActionRecord::DeleteNote { note_id: capture(&caps, 1) })
}

fn search_notes(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_search_notes().captures(u.original)?;
    Some(ActionRecord::SearchNotes { keyword: capture(&caps, 1) })
}

// =============================================================================
// Calendar
// =============================================================================

static_regex!(re_list_events, r"(?i)\blist\s+events?\b");
static_regex!(re_list_today, r"(?i)\blist\s+today\b");
static_regex!(re_list_date, r"(?i)(?:\bwhat'?s\s+on|\bevents\s+on)\s+(.+)");
static_regex!(re_create_event, r"(?i)\bcreate\s+event:?\s*(.+?)\s+on\s+(.+?)(?:\s+at\s+(.+))?$");
static_regex!(re_get_event, r"(?i)\bget\s+event\s+(\d+)");
static_regex!(re_delete_event, r"(?i)\bdelete\s+event\s+(\d+)");

fn list_events(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_list_events().is_match(u.original).then_some(ActionRecord::ListEvents)
}

fn list_today(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_list_today().is_match(u.original).then_some(ActionRecord::ListToday)
}

fn list_date(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_list_date().captures(u.original)?;
    let date = capture(&caps, 1)?.trim_end_matches('?').trim().to_string();
    Some(ActionRecord::ListDate { date: Some(date) })
}

fn create_event(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_create_event().captures(u.original)?;
    Some(ActionRecord::CreateEvent {
        title: capture(&caps, 1),
        date: capture(&caps, 2),
        time: capture(&caps, 3),
        description: None,
    })
}

fn get_event(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_get_event().captures(u.original)?;
    Some(ActionRecord::GetEvent { event_id: capture(&caps, 1) })
}

fn delete_event(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_delete_event().captures(u.original)?;
    Some(ActionRecord::DeleteEvent { event_id: capture(&caps, 1) })
}

// =============================================================================
// Meet
// =============================================================================

static_regex!(
    re_schedule_meet,
    r"(?i)\bschedule\s+meet:?\s*(.+?)\s+on\s+(.+?)(?:\s+at\s+(.+?))?(?:\s+with\s+(.+))?$"
);
static_regex!(re_meet_invite, r"(?i)\bsend\s+meet\s+invite\s+to\s+(\S+@\S+)(?:\s+for\s+(.+))?");

fn schedule_meet(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_schedule_meet().captures(u.original)?;
    let attendees = capture(&caps, 4).map(|list| split_list(&list)).filter(|l| !l.is_empty());
    Some(ActionRecord::ScheduleMeet {
        title: capture(&caps, 1),
        date: capture(&caps, 2),
        time: capture(&caps, 3),
        attendees,
    })
}

fn send_meet_invite(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_meet_invite().captures(u.original)?;
    Some(ActionRecord::SendMeetInvite {
        email: capture(&caps, 1),
        event_id: None,
        event_title: capture(&caps, 2),
    })
}

// =============================================================================
// Images and folders
// =============================================================================

static_regex!(re_show_image, r"(?i)\b(?:show|view|display)\s+image\s+(.+)");
static_regex!(re_show_images, r"(?i)\b(?:show|view|display)\s+(?:all\s+)?(?:my\s+)?images?\b");
static_regex!(re_view_folder, r"(?i)\b(?:view|open|show)\s+folder\s+(.+)");

fn show_image(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_show_image().captures(u.original)?;
    Some(ActionRecord::ShowImage { file_name: capture(&caps, 1) })
}

fn show_images(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_show_images().is_match(u.original).then_some(ActionRecord::ShowImages)
}

fn view_folder(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_view_folder().captures(u.original)?;
    Some(ActionRecord::ViewFolder { folder_name: capture(&caps, 1) })
}

// =============================================================================
// Summary drafts
// =============================================================================

static_regex!(
    re_draft_summary,
    r"(?i)\b(?:draft|create|make)\s+(?:a\s+)?summary\s+(?:of\s+)?(.+?)(?:\s+to\s+(\S+@\S+))?$"
);

fn draft_summary(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_draft_summary().captures(u.original)?;
    Some(ActionRecord::DraftSummary {
        file_name: capture(&caps, 1),
        email: capture(&caps, 2),
    })
}

// =============================================================================
// Bulk delete
// =============================================================================

const DELETE_WORDS: [&str; 4] = ["delete", "remove", "clear", "erase"];
const ALL_WORDS: [&str; 3] = ["all", "every", "everything"];
const EVENT_WORDS: [&str; 3] = ["event", "calendar", "appointment"];

static_regex!(
    re_delete_all_phrase,
    r"(?i)\b(?:(?:delete|remove|clear|erase)\s+all\s+(?:the\s+)?(?:my\s+)?(?:upcoming\s+)?(?:events|appointments)|delete\s+(?:my\s+)?(?:entire|whole)\s+calendar|clear\s+(?:my\s+)?calendar|delete\s+everything\s+(?:from\s+)?(?:my\s+)?calendar)"
);

/// Deliberately over-inclusive; the dispatcher gates this behind a confirmation.
fn delete_all_events(u: &Utterance<'_>) -> Option<ActionRecord> {
    let contains_any = |words: &[&str]| words.iter().any(|w| u.lower.contains(w));

    let lexical = contains_any(&DELETE_WORDS) && contains_any(&ALL_WORDS) && contains_any(&EVENT_WORDS);
    let clear_calendar = u.has_word("clear") && (u.has_word("calendar") || u.has_word("schedule"));
    let phrase = re_delete_all_phrase().is_match(u.original);

    (lexical || clear_calendar || phrase).then_some(ActionRecord::DeleteAllEvents)
}

// =============================================================================
// Confirmation
// =============================================================================

static_regex!(re_confirm_yes, r"^(?:yes|yeah|yep|sure|confirm|go ahead)$");
static_regex!(re_confirm_no, r"^(?:no|nope|cancel|stop|abort|never mind)$");

/// Whole-string matches only; "yes please send it" is not a confirmation.
fn confirm(u: &Utterance<'_>) -> Option<ActionRecord> {
    if re_confirm_yes().is_match(&u.lower) {
        Some(ActionRecord::ConfirmYes)
    } else if re_confirm_no().is_match(&u.lower) {
        Some(ActionRecord::ConfirmNo)
    } else {
        None
    }
}

// =============================================================================
// Draft creation
// =============================================================================

static_regex!(re_draft_anchored, r"(?is)^(?:draft|compose|write|create\s+(?:an?\s+)?email)\s+(.+)$");
static_regex!(re_draft_bare, r"^(?:draft|compose|write)$");
static_regex!(re_draft_verb, r"(?i)\b(?:draft|compose|write)\b");
static_regex!(re_send_prefix, r"(?i)^(?:send|email|mail)\b");

fn draft_email(u: &Utterance<'_>) -> Option<ActionRecord> {
    if re_draft_bare().is_match(&u.lower) {
        return Some(ActionRecord::DraftEmail { text: Some(String::new()) });
    }
    let caps = re_draft_anchored().captures(u.original)?;
    Some(draft_context(caps.get(1).map_or("", |m| m.as_str())))
}

/// "can you write something about X": the context is what follows about/regarding/for.
fn draft_email_about(u: &Utterance<'_>) -> Option<ActionRecord> {
    if re_send_prefix().is_match(u.original) {
        return None;
    }
    let verb = re_draft_verb().find(u.original)?;
    let tail = &u.original[verb.end()..];
    let context = extract_context_after_keyword(tail, &[" about ", " regarding ", " for "]);
    if context.is_empty() {
        return None;
    }
    Some(draft_context(&context))
}

// =============================================================================
// Refine and send
// =============================================================================

static_regex!(
    re_refine,
    r"(?i)\b(?:make it|more formal|more polite|shorten|shorter|longer|expand|rewrite|reword|polite|formal|casual|tone|concise|professional)\b"
);
static_regex!(re_send_draft, r"(?is)\b(?:send|email|mail)\s+(?:the\s+)?(?:draft|message|email)\s+to\s+(.+)");
static_regex!(re_send_draft_bare, r"^(?:send|mail)\s+(?:the\s+|my\s+)?draft(?:\s+now)?$");

/// The whole utterance is the instruction.
fn refine_draft(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_refine().is_match(u.original).then(|| ActionRecord::RefineDraft {
        instruction: Some(u.original.to_string()),
    })
}

fn send_draft(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_send_draft().captures(u.original)?;
    let raw = capture(&caps, 1)?;
    Some(ActionRecord::SendDraft { email: Some(recipients_or_raw(&raw)) })
}

/// "send the draft" with no recipients: the engine falls back to the stored ones.
fn send_draft_bare(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_send_draft_bare().is_match(&u.lower).then_some(ActionRecord::SendDraft { email: None })
}

// =============================================================================
// Files
// =============================================================================

static_regex!(re_list_files, r"(?i)\b(?:list|show)\b.*\bfiles?\b");
static_regex!(re_search_files, r"(?is)\b(?:search|find|look\s*up)\b\s+(.+)");
static_regex!(re_leading_for, r"(?i)^for\b\s*");
static_regex!(re_summarize_id, r"(?i)(?:summari[sz]e|summary|tl;dr).*?\bid\s+([a-zA-Z0-9_\-]+)");
static_regex!(re_summarize_name, r"(?is)(?:summari[sz]e|summary|tl;dr|what'?s inside)\s+(?:file\s+)?(.+)");
static_regex!(re_send_generic, r"(?is)\b(?:send|email|mail)\s+(.+?)\s+to\s+(.+)$");

fn list_files(u: &Utterance<'_>) -> Option<ActionRecord> {
    re_list_files().is_match(u.original).then_some(ActionRecord::ListFiles)
}

fn search_files(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_search_files().captures(u.original)?;
    let rest = caps.get(1)?.as_str().trim();
    let rest = re_leading_for().replace(rest, "");
    let mut parts = split_list(&rest);
    match parts.len() {
        0 => None,
        1 => Some(ActionRecord::SearchFiles { keyword: parts.pop(), keywords: None }),
        _ => Some(ActionRecord::SearchFiles { keyword: None, keywords: Some(parts) }),
    }
}

/// Tried before [`summarize_by_name`], whose surface pattern is a superset.
fn summarize_by_id(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_summarize_id().captures(u.original)?;
    Some(ActionRecord::SummarizeFile { file_name: None, file_id: capture(&caps, 1) })
}

fn summarize_by_name(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_summarize_name().captures(u.original)?;
    Some(ActionRecord::SummarizeFile { file_name: capture(&caps, 1), file_id: None })
}

/// "send X to Y". An object mentioning draft/message/email is taken to mean the
/// current draft; a file literally named "draft_budget.xlsx" is misread.
fn send_file(u: &Utterance<'_>) -> Option<ActionRecord> {
    let caps = re_send_generic().captures(u.original)?;
    let object = capture(&caps, 1)?;
    let raw = capture(&caps, 2)?;

    let lowered = object.to_lowercase();
    if ["draft", "message", "email"].iter().any(|w| lowered.contains(w)) {
        return Some(ActionRecord::SendDraft { email: Some(recipients_or_raw(&raw)) });
    }

    let email = extract_emails(&raw).into_iter().next().unwrap_or(raw);
    Some(ActionRecord::SendFile {
        file_name: Some(split_list(&object)),
        email: Some(email),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Option<String> {
        Some(v.to_string())
    }

    fn l(v: &[&str]) -> Option<Vec<String>> {
        Some(v.iter().map(|x| x.to_string()).collect())
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<_> = RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), RULES.len());
    }

    #[test]
    fn test_total_on_degenerate_input() {
        assert_eq!(parse_heuristically(""), ActionRecord::Unknown);
        assert_eq!(parse_heuristically("   \t\n"), ActionRecord::Unknown);
        assert_eq!(parse_heuristically("\0\u{1}\u{7f}"), ActionRecord::Unknown);
        assert_eq!(parse_heuristically("I don't know"), ActionRecord::Unknown);
    }

    #[test]
    fn test_exit_and_help_whole_words() {
        assert_eq!(parse_heuristically("bye"), ActionRecord::Exit);
        assert_eq!(parse_heuristically("please QUIT now"), ActionRecord::Exit);
        assert_eq!(parse_heuristically("?"), ActionRecord::Help);
        assert_eq!(parse_heuristically("what can you do"), ActionRecord::Help);
        // "closet" must not trip the exit rule
        assert_ne!(parse_heuristically("search closet photos"), ActionRecord::Exit);
    }

    #[test]
    fn test_summary_draft_precedes_generic_draft() {
        assert_eq!(
            parse_heuristically("draft a summary of report.pdf to alice@example.com"),
            ActionRecord::DraftSummary { file_name: s("report.pdf"), email: s("alice@example.com") }
        );
        assert_eq!(
            parse_heuristically("make summary of Q3 Plan.docx"),
            ActionRecord::DraftSummary { file_name: s("Q3 Plan.docx"), email: None }
        );
    }

    #[test]
    fn test_short_context_gating() {
        assert_eq!(
            parse_heuristically("draft leave"),
            ActionRecord::DraftEmail { text: s("") }
        );
        assert_eq!(parse_heuristically("draft"), ActionRecord::DraftEmail { text: s("") });
        assert_eq!(
            parse_heuristically("draft a two-day sick leave request for my manager"),
            ActionRecord::DraftEmail { text: s("a two-day sick leave request for my manager") }
        );
        assert_eq!(
            parse_heuristically("Create an email inviting Dana to the offsite"),
            ActionRecord::DraftEmail { text: s("inviting Dana to the offsite") }
        );
    }

    #[test]
    fn test_draft_about_keeps_case_and_skips_send() {
        assert_eq!(
            parse_heuristically("could you write something about the Berlin Offsite budget"),
            ActionRecord::DraftEmail { text: s("the Berlin Offsite budget") }
        );
        assert_eq!(
            parse_heuristically("please draft one for Bob"),
            ActionRecord::DraftEmail { text: s("") }
        );
    }

    #[test]
    fn test_show_and_clear_draft() {
        assert_eq!(parse_heuristically("show me the draft"), ActionRecord::ShowDraft);
        assert_eq!(parse_heuristically("discard this draft"), ActionRecord::ClearDraft);
    }

    #[test]
    fn test_bulk_delete_variants() {
        for text in [
            "delete all my upcoming events",
            "remove every appointment",
            "clear my calendar",
            "please clear schedule",
            "delete my entire calendar",
            "erase everything from my calendar",
        ] {
            assert_eq!(parse_heuristically(text), ActionRecord::DeleteAllEvents, "{text}");
        }
        assert_eq!(
            parse_heuristically("delete event 42"),
            ActionRecord::DeleteEvent { event_id: s("42") }
        );
    }

    #[test]
    fn test_confirmation_is_whole_string() {
        assert_eq!(parse_heuristically("yes"), ActionRecord::ConfirmYes);
        assert_eq!(parse_heuristically("  Go ahead "), ActionRecord::ConfirmYes);
        assert_eq!(parse_heuristically("no"), ActionRecord::ConfirmNo);
        assert_eq!(parse_heuristically("never mind"), ActionRecord::ConfirmNo);
        assert_ne!(parse_heuristically("yes and no"), ActionRecord::ConfirmYes);
    }

    #[test]
    fn test_refine_uses_whole_utterance() {
        assert_eq!(
            parse_heuristically("Make it shorter and friendlier"),
            ActionRecord::RefineDraft { instruction: s("Make it shorter and friendlier") }
        );
        // word boundaries: "stone" does not contain the word "tone"
        assert_ne!(
            parse_heuristically("search stone tablets"),
            ActionRecord::RefineDraft { instruction: s("search stone tablets") }
        );
        // refine runs before the file rules, so a whole vocabulary word wins
        assert_eq!(
            parse_heuristically("search for professional templates"),
            ActionRecord::RefineDraft { instruction: s("search for professional templates") }
        );
    }

    #[test]
    fn test_send_draft_recipients() {
        assert_eq!(
            parse_heuristically("send the draft to Bob@Example.com, carol@x.org"),
            ActionRecord::SendDraft { email: l(&["Bob@Example.com", "carol@x.org"]) }
        );
        assert_eq!(
            parse_heuristically("email the message to my manager"),
            ActionRecord::SendDraft { email: l(&["my manager"]) }
        );
        assert_eq!(parse_heuristically("Send the draft"), ActionRecord::SendDraft { email: None });
        assert_eq!(parse_heuristically("send my draft now"), ActionRecord::SendDraft { email: None });
    }

    #[test]
    fn test_files() {
        assert_eq!(parse_heuristically("list my files"), ActionRecord::ListFiles);
        assert_eq!(
            parse_heuristically("search for Budget 2024"),
            ActionRecord::SearchFiles { keyword: s("Budget 2024"), keywords: None }
        );
        assert_eq!(
            parse_heuristically("find invoices, receipts and contracts"),
            ActionRecord::SearchFiles {
                keyword: None,
                keywords: l(&["invoices", "receipts", "contracts"])
            }
        );
        assert_eq!(
            parse_heuristically("summarize file with id 1AbC_x-9"),
            ActionRecord::SummarizeFile { file_name: None, file_id: s("1AbC_x-9") }
        );
        assert_eq!(
            parse_heuristically("summarize Quarterly Report.pdf"),
            ActionRecord::SummarizeFile { file_name: s("Quarterly Report.pdf"), file_id: None }
        );
        assert_eq!(
            parse_heuristically("what's inside notes.txt"),
            ActionRecord::SummarizeFile { file_name: s("notes.txt"), file_id: None }
        );
    }

    #[test]
    fn test_send_file_vs_draft_disambiguation() {
        assert_eq!(
            parse_heuristically("send Report.pdf and 'Plan.xlsx' to dana@corp.io"),
            ActionRecord::SendFile {
                file_name: l(&["Report.pdf", "Plan.xlsx"]),
                email: s("dana@corp.io")
            }
        );
        // known ambiguity: a file name containing "draft" routes to the draft
        assert_eq!(
            parse_heuristically("send draft_budget.xlsx to dana@corp.io"),
            ActionRecord::SendDraft { email: l(&["dana@corp.io"]) }
        );
    }

    #[test]
    fn test_tasks_notes_calendar() {
        assert_eq!(parse_heuristically("list tasks"), ActionRecord::ListTasks);
        assert_eq!(
            parse_heuristically("add task: Buy Milk due: tomorrow"),
            ActionRecord::AddTask { text: s("Buy Milk"), due: s("tomorrow") }
        );
        assert_eq!(
            parse_heuristically("complete task 7"),
            ActionRecord::CompleteTask { task_id: s("7") }
        );
        assert_eq!(
            parse_heuristically("create note: Standup - Ship the parser"),
            ActionRecord::CreateNote { title: s("Standup"), content: s("Ship the parser") }
        );
        assert_eq!(
            parse_heuristically("search notes: roadmap"),
            ActionRecord::SearchNotes { keyword: s("roadmap") }
        );
        assert_eq!(
            parse_heuristically("what's on march 19?"),
            ActionRecord::ListDate { date: s("march 19") }
        );
        assert_eq!(
            parse_heuristically("create event Dentist on friday at 3pm"),
            ActionRecord::CreateEvent {
                title: s("Dentist"),
                date: s("friday"),
                time: s("3pm"),
                description: None
            }
        );
    }

    #[test]
    fn test_meet_and_images() {
        assert_eq!(
            parse_heuristically("schedule meet Sync on tomorrow at 2pm with a@x.com, b@y.com"),
            ActionRecord::ScheduleMeet {
                title: s("Sync"),
                date: s("tomorrow"),
                time: s("2pm"),
                attendees: l(&["a@x.com", "b@y.com"])
            }
        );
        assert_eq!(
            parse_heuristically("send meet invite to a@x.com for Sync"),
            ActionRecord::SendMeetInvite {
                email: s("a@x.com"),
                event_id: None,
                event_title: s("Sync")
            }
        );
        assert_eq!(parse_heuristically("show all images"), ActionRecord::ShowImages);
        assert_eq!(
            parse_heuristically("show image Cat.JPG"),
            ActionRecord::ShowImage { file_name: s("Cat.JPG") }
        );
        assert_eq!(
            parse_heuristically("open folder Photos 2024"),
            ActionRecord::ViewFolder { folder_name: s("Photos 2024") }
        );
    }
}
