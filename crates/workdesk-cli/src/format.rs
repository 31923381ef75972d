use workdesk_core::calendar::CalendarEvent;
use workdesk_core::docs::DocumentInfo;
use workdesk_core::models::{DraftArtifact, HistoryEntry, HistoryStats};

use crate::dispatch::Reply;

// ANSI color codes
pub const CYAN: &str = "\x1b[36m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const RED: &str = "\x1b[31m";
pub const WHITE_BOLD: &str = "\x1b[1;37m";
pub const DIM: &str = "\x1b[2m";
pub const RESET: &str = "\x1b[0m";

const RULE_WIDTH: usize = 60;

pub fn separator() -> String {
    format!("{DIM}{}{RESET}", "─".repeat(RULE_WIDTH))
}

pub fn error_line(msg: &str) -> String {
    format!("{RED}{msg}{RESET}")
}

pub fn system_line(msg: &str) -> String {
    format!("{DIM}{msg}{RESET}")
}

/// Colour a dispatch reply for the terminal: failures in red, the first line of
/// a success in green.
pub fn paint(reply: &Reply) -> Vec<String> {
    reply
        .lines
        .iter()
        .enumerate()
        .map(|(i, line)| match (reply.success, i) {
            (false, 0) => error_line(line),
            (true, 0) => format!("{GREEN}{line}{RESET}"),
            _ => line.clone(),
        })
        .collect()
}

/// Plain-text rendering of a draft, shown after every mutation.
pub fn draft_lines(draft: &DraftArtifact) -> Vec<String> {
    let recipients = if draft.recipients.is_empty() {
        "Not specified".to_string()
    } else {
        draft.recipients.join(", ")
    };
    let mut lines = vec![
        format!("Subject: {}", draft.subject),
        format!("Recipients: {}", recipients),
        String::new(),
    ];
    lines.extend(draft.body.lines().map(str::to_string));
    lines
}

pub fn file_lines(files: &[DocumentInfo]) -> Vec<String> {
    files
        .iter()
        .map(|f| format!("  {} ({}, {})", f.name, f.id, human_size(f.size)))
        .collect()
}

pub fn event_lines(events: &[CalendarEvent]) -> Vec<String> {
    events
        .iter()
        .map(|e| format!("  {} {DIM}({}, id {}){RESET}", e.title, e.start.format("%a %Y-%m-%d %H:%M"), e.id))
        .collect()
}

fn human_size(bytes: u64) -> String {
    match bytes {
        b if b >= 1024 * 1024 => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
        b if b >= 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        b => format!("{} B", b),
    }
}

pub fn history_lines(entries: &[HistoryEntry]) -> Vec<String> {
    if entries.is_empty() {
        return vec![system_line("No history yet.")];
    }
    entries
        .iter()
        .map(|e| {
            let mark = if e.success { format!("{GREEN}✓{RESET}") } else { format!("{RED}✗{RESET}") };
            format!(
                "{mark} {DIM}{}{RESET} {} {DIM}({}){RESET}",
                e.timestamp.format("%Y-%m-%d %H:%M"),
                e.command,
                e.action
            )
        })
        .collect()
}

pub fn stats_lines(stats: &HistoryStats) -> Vec<String> {
    let mut lines = vec![format!(
        "{WHITE_BOLD}{} commands{RESET}: {GREEN}{} succeeded{RESET}, {RED}{} failed{RESET}",
        stats.total, stats.succeeded, stats.failed
    )];
    for (action, count) in &stats.by_action {
        lines.push(format!("  {CYAN}{action}{RESET}: {count}"));
    }
    lines
}

pub fn help_lines() -> Vec<String> {
    [
        "FILES",
        "  list all files",
        "  search [keyword]",
        "  summarize [file name] | summarize file id [file-id]",
        "  send [file name] to [email] | send summary of [file] to [email]",
        "  view folder [name] | show images | show image [name]",
        "",
        "DRAFTS",
        "  draft [your complete request]",
        "  make it more formal / shorten it / expand it",
        "  show draft | clear draft | send draft to [email(s)]",
        "  draft a summary of [file] to [email]",
        "",
        "TASKS, NOTES, CALENDAR",
        "  list tasks | add task: [text] due: [date] | complete task [id]",
        "  list notes | create note: [title] - [content] | search notes: [keyword]",
        "  list events | create event [title] on [date] at [time] | delete all events",
        "  schedule meet [title] on [date] at [time] with [emails]",
        "",
        "SHELL",
        "  /contacts | /contact add <name> <email> | /contact rm <name>",
        "  /history [n] | /stats | help | exit",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
