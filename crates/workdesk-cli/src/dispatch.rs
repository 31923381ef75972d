//! Routes interpreted action records to the draft engine, the document store,
//! the calendar and the mail sender. Task and note records, and single-event
//! calendar edits, have no backend here and are echoed back with their parsed
//! parameters.

use tracing::{debug, warn};

use workdesk_core::confirm::confirmation_prompt;
use workdesk_core::constants::{DEFAULT_EVENT_TIME, UNRECOGNIZED_MESSAGE};
use workdesk_core::docs::{DocumentError, DocumentInfo};
use workdesk_core::entities::{extract_emails, parse_date, parse_time};
use workdesk_core::mail::OutgoingMail;
use workdesk_core::{ActionRecord, ConfirmationOutcome, DraftError, Session};

use crate::agent::Agent;
use crate::format::{draft_lines, event_lines, file_lines, help_lines};

const FILES_SUBJECT: &str = "Files from Workspace Agent";
const SUMMARIES_SUBJECT: &str = "File Summaries from Workspace Agent";
const MAX_SUMMARIZED_FILES: usize = 3;

/// What the shell should do after printing a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowUp {
    #[default]
    None,
    /// Run the four-question draft clarification
    Clarify,
    /// Ask who the draft should go to
    Recipients,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub lines: Vec<String>,
    pub success: bool,
    pub follow_up: FollowUp,
}

impl Reply {
    pub fn ok(lines: Vec<String>) -> Self {
        Self { lines, success: true, follow_up: FollowUp::None }
    }

    pub fn ok_with(heading: &str, body: Vec<String>) -> Self {
        let mut lines = vec![heading.to_string()];
        lines.extend(body);
        Self::ok(lines)
    }

    pub fn failure(lines: Vec<String>) -> Self {
        Self { lines, success: false, follow_up: FollowUp::None }
    }

    fn message(msg: impl Into<String>) -> Self {
        Self::ok(vec![msg.into()])
    }

    fn error(msg: impl Into<String>) -> Self {
        Self::failure(vec![msg.into()])
    }

    fn then(mut self, follow_up: FollowUp) -> Self {
        self.follow_up = follow_up;
        self
    }

    fn prepend(mut self, line: String) -> Self {
        self.lines.insert(0, line);
        self
    }
}

fn not_connected(service: &str, details: Vec<String>) -> Reply {
    let mut lines = vec![format!("{} is not connected; nothing was changed.", service)];
    lines.extend(details);
    Reply::ok(lines)
}

fn field(label: &str, value: &Option<String>) -> Option<String> {
    value.as_deref().map(|v| format!("  {}: {}", label, v))
}

impl Agent {
    /// Handle one action record against the session's state.
    pub(crate) async fn dispatch(&self, session: &mut Session, action: &ActionRecord, command_text: &str) -> Reply {
        let mut note = None;
        match session.confirmations.resolve(action) {
            ConfirmationOutcome::NothingPending => {}
            ConfirmationOutcome::Confirmed(ids) => return self.delete_events(&session.user_id, &ids).await,
            ConfirmationOutcome::Cancelled { .. } => {
                return Reply::message("Cancelled. No events were deleted.");
            }
            ConfirmationOutcome::Expired => {
                if matches!(action, ActionRecord::ConfirmYes | ActionRecord::ConfirmNo) {
                    return Reply::error("That delete request expired. Ask again to delete all events.");
                }
            }
            ConfirmationOutcome::Superseded { discarded } => {
                note = Some(format!("(Pending delete of {} event(s) discarded.)", discarded));
            }
        }

        let reply = self.route(session, action, command_text).await;
        match note {
            Some(note) => reply.prepend(note),
            None => reply,
        }
    }

    async fn route(&self, session: &mut Session, action: &ActionRecord, command_text: &str) -> Reply {
        use ActionRecord as A;

        match action {
            A::Exit => Reply::message("Goodbye.").then(FollowUp::Exit),
            A::Help => Reply::ok(help_lines()),

            // Drafts
            A::DraftEmail { text } => self.draft_email(session, text.as_deref().unwrap_or_default()).await,
            A::ShowDraft => match self.engine.show(&session.draft) {
                Ok(draft) => Reply::ok_with("Current draft:", draft_lines(draft)),
                Err(e) => Reply::error(e.to_string()),
            },
            A::ClearDraft => {
                self.engine.clear(&mut session.draft);
                Reply::message("Draft cleared.")
            }
            A::RefineDraft { instruction } => {
                let instruction = instruction.as_deref().unwrap_or(command_text);
                match self.engine.refine(&mut session.draft, instruction).await {
                    Ok(outcome) if outcome.applied => Reply::ok_with("Draft updated:", draft_lines(&session.draft)),
                    Ok(_) => Reply::ok_with("Could not apply that change; the draft was kept:", draft_lines(&session.draft)),
                    Err(e) => Reply::error(e.to_string()),
                }
            }
            A::SendDraft { email } => {
                let explicit = email.clone().unwrap_or_default();
                self.send_draft(session, &explicit, command_text).await
            }
            A::DraftSummary { file_name, email } => self.draft_summary(session, file_name, email).await,

            // Files
            A::ListFiles => self.list_files(),
            A::SearchFiles { keyword, keywords } => self.search_files(keyword, keywords),
            A::SummarizeFile { file_name, file_id } => self.summarize_file(file_name, file_id).await,
            A::SendFile { file_name, email } => self.send_files(file_name, email, command_text).await,
            A::ShowImages => match self.documents.images() {
                Ok(images) if images.is_empty() => Reply::message("No images found."),
                Ok(images) => Reply::ok_with(&format!("{} image(s):", images.len()), file_lines(&images)),
                Err(e) => Reply::error(e.to_string()),
            },
            A::ShowImage { file_name } => self.show_image(file_name),
            A::ViewFolder { folder_name } => match folder_name.as_deref() {
                None => Reply::error("Which folder? Try 'view folder <name>'."),
                Some(name) => match self.documents.folder(name) {
                    Ok(files) => Reply::ok_with(&format!("Folder '{}':", name), file_lines(&files)),
                    Err(e) => Reply::error(e.to_string()),
                },
            },

            // Calendar bulk delete
            A::DeleteAllEvents => {
                let upcoming = self.calendar.upcoming(&session.user_id, (self.now)()).await;
                match upcoming {
                    Ok(events) if events.is_empty() => Reply::message("No upcoming events to delete."),
                    Ok(events) => {
                        let prompt = confirmation_prompt(events.len());
                        session.confirmations.arm(events.into_iter().map(|e| e.id).collect());
                        Reply::message(prompt)
                    }
                    Err(e) => Reply::error(e.to_string()),
                }
            }
            A::ConfirmDeleteAll { event_ids } => {
                let ids = event_ids.clone().unwrap_or_default();
                if ids.is_empty() {
                    return Reply::message("No upcoming events to delete.");
                }
                let prompt = confirmation_prompt(ids.len());
                session.confirmations.arm(ids);
                Reply::message(prompt)
            }
            A::ConfirmYes | A::ConfirmNo => Reply::message("Nothing is waiting for confirmation."),

            // No backend in the shell
            A::ListTasks => not_connected("Tasks", vec![]),
            A::AddTask { text, due } => {
                let due = due.as_deref().map(|d| self.describe_date(d));
                not_connected("Tasks", [field("task", text), field("due", &due)].into_iter().flatten().collect())
            }
            A::CompleteTask { task_id } | A::DeleteTask { task_id } => {
                not_connected("Tasks", field("task id", task_id).into_iter().collect())
            }
            A::ListNotes => not_connected("Notes", vec![]),
            A::CreateNote { title, content } => {
                not_connected("Notes", [field("title", title), field("content", content)].into_iter().flatten().collect())
            }
            A::GetNote { note_id } | A::DeleteNote { note_id } => {
                not_connected("Notes", field("note id", note_id).into_iter().collect())
            }
            A::SearchNotes { keyword } => not_connected("Notes", field("keyword", keyword).into_iter().collect()),
            A::ListEvents => match self.calendar.upcoming(&session.user_id, (self.now)()).await {
                Ok(events) if events.is_empty() => Reply::message("No upcoming events."),
                Ok(events) => Reply::ok_with(&format!("{} upcoming event(s):", events.len()), event_lines(&events)),
                Err(e) => Reply::error(e.to_string()),
            },
            A::ListToday => not_connected("Calendar", vec![format!("  date: {}", self.describe_date("today"))]),
            A::ListDate { date } => {
                let date = date.as_deref().map(|d| self.describe_date(d));
                not_connected("Calendar", field("date", &date).into_iter().collect())
            }
            A::CreateEvent { title, date, time, description } => {
                let when = self.describe_when(date.as_deref(), time.as_deref());
                not_connected(
                    "Calendar",
                    [field("title", title), Some(format!("  when: {}", when)), field("description", description)]
                        .into_iter()
                        .flatten()
                        .collect(),
                )
            }
            A::GetEvent { event_id } | A::DeleteEvent { event_id } => {
                not_connected("Calendar", field("event id", event_id).into_iter().collect())
            }
            A::ScheduleMeet { title, date, time, attendees } => {
                let when = self.describe_when(date.as_deref(), time.as_deref());
                let attendees = attendees.as_ref().map(|a| a.join(", "));
                not_connected(
                    "Google Meet",
                    [field("title", title), Some(format!("  when: {}", when)), field("attendees", &attendees)]
                        .into_iter()
                        .flatten()
                        .collect(),
                )
            }
            A::SendMeetInvite { email, event_id, event_title } => not_connected(
                "Google Meet",
                [field("to", email), field("event id", event_id), field("event", event_title)]
                    .into_iter()
                    .flatten()
                    .collect(),
            ),

            A::Unsupported { action } => {
                debug!(action, "unsupported action tag");
                Reply::error(UNRECOGNIZED_MESSAGE)
            }
            A::Unknown => Reply::error(UNRECOGNIZED_MESSAGE),
        }
    }

    async fn draft_email(&self, session: &mut Session, text: &str) -> Reply {
        if text.trim().is_empty() {
            return Reply::message("I need a few more details to draft this email.").then(FollowUp::Clarify);
        }
        match self.engine.create(&mut session.draft, text).await {
            Ok(draft) => Reply::ok_with("Draft created:", draft_lines(draft)),
            Err(DraftError::NeedsMoreDetail) => {
                Reply::message("I need a few more details to draft this email.").then(FollowUp::Clarify)
            }
            Err(e) => Reply::error(e.to_string()),
        }
    }

    async fn send_draft(&self, session: &mut Session, explicit: &[String], command_text: &str) -> Reply {
        match self.engine.send(&mut session.draft, explicit, command_text, self.mailer.as_ref()).await {
            Ok(receipt) => Reply::ok(vec![receipt.message(), "Draft cleared after sending.".to_string()]),
            Err(DraftError::MissingRecipients) => {
                Reply::message("Who should I send this draft to? (comma-separated emails)").then(FollowUp::Recipients)
            }
            Err(e) => Reply::error(e.to_string()),
        }
    }

    async fn draft_summary(&self, session: &mut Session, file_name: &Option<String>, email: &Option<String>) -> Reply {
        let Some(name) = file_name.as_deref() else {
            return Reply::error("Which file should I summarize?");
        };
        let (doc, text) = match self.load_document(name) {
            Ok(found) => found,
            Err(e) => return Reply::error(e.to_string()),
        };
        let summary = match self.engine.summarize(&text).await {
            Ok(summary) => summary,
            Err(e) => return Reply::error(e.to_string()),
        };
        let recipients: Vec<String> = email.iter().cloned().collect();
        match self.engine.create_summary(&mut session.draft, &doc.name, &summary, &recipients) {
            Ok(draft) => {
                let mut reply = Reply::ok_with("Summary draft created:", draft_lines(draft));
                reply.lines.push(String::new());
                reply.lines.push("Say 'send draft' to send it.".to_string());
                reply
            }
            Err(e) => Reply::error(e.to_string()),
        }
    }

    fn list_files(&self) -> Reply {
        match self.documents.list() {
            Ok(files) if files.is_empty() => {
                Reply::message(format!("No files found in {}.", self.documents.root().display()))
            }
            Ok(files) => Reply::ok_with(&format!("{} file(s):", files.len()), file_lines(&files)),
            Err(e) => Reply::error(e.to_string()),
        }
    }

    fn search_files(&self, keyword: &Option<String>, keywords: &Option<Vec<String>>) -> Reply {
        let terms: Vec<String> = keyword.iter().chain(keywords.iter().flatten()).cloned().collect();
        if terms.is_empty() {
            return Reply::error("What should I search for?");
        }
        match self.documents.search(&terms) {
            Ok(hits) if hits.is_empty() => Reply::error(format!("No files found for '{}'.", terms.join(", "))),
            Ok(hits) => Reply::ok_with(&format!("{} match(es):", hits.len()), file_lines(&hits)),
            Err(e) => Reply::error(e.to_string()),
        }
    }

    async fn summarize_file(&self, file_name: &Option<String>, file_id: &Option<String>) -> Reply {
        let doc = match (file_id, file_name) {
            (Some(id), _) => self.documents.get_by_id(id),
            (None, Some(name)) => self.documents.best_match(name),
            (None, None) => return Reply::error("Could not find the file to summarize."),
        };
        let doc = match doc {
            Ok(doc) => doc,
            Err(e) => return Reply::error(e.to_string()),
        };
        let text = match self.documents.load_text(&doc) {
            Ok(text) => text,
            Err(e) => return Reply::error(e.to_string()),
        };
        match self.engine.summarize(&text).await {
            Ok(summary) => Reply::ok_with(&format!("Summary: {}", doc.name), vec![summary]),
            Err(e) => Reply::error(e.to_string()),
        }
    }

    async fn send_files(&self, file_names: &Option<Vec<String>>, email: &Option<String>, command_text: &str) -> Reply {
        let mut recipients = extract_emails(command_text);
        if recipients.is_empty() {
            recipients = email.as_deref().map(extract_emails).unwrap_or_default();
        }
        if recipients.is_empty() {
            return Reply::error("Missing recipient email(s).");
        }

        let names = file_names.clone().unwrap_or_default();
        if names.is_empty() {
            return Reply::error("No file names specified.");
        }
        let matched = match self.documents.search(&names) {
            Ok(matched) if matched.is_empty() => return Reply::error("No files matched your request."),
            Ok(matched) => matched,
            Err(e) => return Reply::error(e.to_string()),
        };

        let wants_summary = {
            let lower = command_text.to_lowercase();
            lower.contains("summary") || lower.contains("summarize") || lower.contains("summarise")
        };
        if wants_summary {
            self.send_summaries(&matched, recipients).await
        } else {
            self.send_attachments(&matched, recipients).await
        }
    }

    async fn send_summaries(&self, files: &[DocumentInfo], recipients: Vec<String>) -> Reply {
        let mut sections = Vec::new();
        for doc in files.iter().take(MAX_SUMMARIZED_FILES) {
            let section = match self.documents.load_text(doc) {
                Ok(text) => match self.engine.summarize(&text).await {
                    Ok(summary) => format!("--- {} ---\n{}\n", doc.name, summary),
                    Err(e) => format!("Could not summarize '{}': {}", doc.name, e),
                },
                Err(e) => format!("Could not extract content for '{}': {}", doc.name, e),
            };
            sections.push(section);
        }
        let body = format!("Here are the summaries you requested:\n\n{}", sections.join("\n\n").trim());
        let mail = OutgoingMail::new(recipients.clone(), SUMMARIES_SUBJECT, body);
        match self.mailer.send(&mail).await {
            Ok(_) => Reply::message(format!("Sent summaries to: {}", recipients.join(", "))),
            Err(e) => Reply::error(format!("Failed to send summaries: {}", e)),
        }
    }

    async fn send_attachments(&self, files: &[DocumentInfo], recipients: Vec<String>) -> Reply {
        let mut mail = OutgoingMail::new(recipients.clone(), FILES_SUBJECT, String::new());
        let mut failed = Vec::new();
        for doc in files {
            match self.documents.read_bytes(doc) {
                Ok(data) => mail = mail.with_attachment(doc.name.clone(), data),
                Err(e) => {
                    warn!(file = %doc.name, error = %e, "could not attach file");
                    failed.push(format!("  - {}: {}", doc.name, e));
                }
            }
        }
        if mail.attachments.is_empty() {
            let mut lines = vec!["No files could be attached.".to_string()];
            lines.extend(failed);
            return Reply::failure(lines);
        }

        let count = mail.attachments.len();
        mail.body = format!("Attached {} file(s) as requested.", count);
        match self.mailer.send(&mail).await {
            Ok(_) => {
                let mut lines = vec![format!("Sent {} file(s) to: {}", count, recipients.join(", "))];
                if !failed.is_empty() {
                    lines.push("Some files failed to attach:".to_string());
                    lines.extend(failed);
                }
                Reply::ok(lines)
            }
            Err(e) => Reply::error(format!("Failed to send attachments: {}", e)),
        }
    }

    fn show_image(&self, file_name: &Option<String>) -> Reply {
        let Some(name) = file_name.as_deref() else {
            return Reply::error("Which image? Try 'show image <name>'.");
        };
        match self.documents.best_match(name) {
            Ok(doc) if doc.is_image() => Reply::message(format!("{}: {}", doc.name, doc.path.display())),
            Ok(doc) => Reply::error(format!("'{}' is not an image.", doc.name)),
            Err(e) => Reply::error(e.to_string()),
        }
    }

    async fn delete_events(&self, user_id: &str, ids: &[String]) -> Reply {
        match self.calendar.delete(user_id, ids).await {
            Ok(deleted) if deleted == ids.len() => {
                Reply::message(format!("Confirmed. Deleted all {} upcoming event(s).", deleted))
            }
            Ok(deleted) => Reply::message(format!(
                "Confirmed. Deleted {} of {} event(s); the rest were already gone.",
                deleted,
                ids.len()
            )),
            Err(e) => {
                warn!(error = %e, "bulk delete failed");
                Reply::error(e.to_string())
            }
        }
    }

    fn load_document(&self, name: &str) -> Result<(DocumentInfo, String), DocumentError> {
        let doc = self.documents.best_match(name)?;
        let text = self.documents.load_text(&doc)?;
        Ok((doc, text))
    }

    fn describe_date(&self, raw: &str) -> String {
        match parse_date(raw, (self.today)()) {
            Some(date) => date.format("%A %Y-%m-%d").to_string(),
            None => raw.trim().to_string(),
        }
    }

    fn describe_when(&self, date: Option<&str>, time: Option<&str>) -> String {
        let date = date.map(|d| self.describe_date(d)).unwrap_or_else(|| "no date".to_string());
        let time = time
            .and_then(parse_time)
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| DEFAULT_EVENT_TIME.to_string());
        format!("{} at {}", date, time)
    }
}
