use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{debug, info, warn};

use workdesk_core::calendar::{EventSource, LocalCalendar};
use workdesk_core::docs::LocalDocumentStore;
use workdesk_core::draft::ClarificationAnswers;
use workdesk_core::entities::extract_emails;
use workdesk_core::models::HistoryEntry;
use workdesk_core::store::{ContactBook, HistoryLog};
use workdesk_core::{
    ActionRecord, AgentConfig, CommandInterpreter, ContactScope, DraftEngine, DraftError, GenerativeBackend,
    MailSender, SessionRegistry,
};

use crate::dispatch::Reply;
use crate::format::draft_lines;

/// Everything one shell needs to turn a line of input into a reply.
pub struct Agent {
    pub(crate) interpreter: CommandInterpreter,
    pub(crate) engine: DraftEngine,
    pub(crate) mailer: Arc<dyn MailSender>,
    pub(crate) contacts: ContactBook,
    pub(crate) history: HistoryLog,
    pub(crate) documents: LocalDocumentStore,
    pub(crate) calendar: Arc<dyn EventSource>,
    pub(crate) sessions: SessionRegistry,
    pub(crate) user_id: String,
    pub(crate) today: fn() -> NaiveDate,
    pub(crate) now: fn() -> NaiveDateTime,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl Agent {
    /// Build from config. A selected provider or mail transport without
    /// credentials fails here rather than on the first command.
    pub fn from_config(config: &AgentConfig, offline: bool) -> Result<Self> {
        let backend = config.build_backend()?;
        let mailer = config.build_mailer()?;
        Self::new(config, backend, mailer, offline)
    }

    pub fn new(
        config: &AgentConfig,
        backend: Arc<dyn GenerativeBackend>,
        mailer: Arc<dyn MailSender>,
        offline: bool,
    ) -> Result<Self> {
        let interpreter = if offline || !config.generative_parsing {
            CommandInterpreter::heuristic_only()
        } else {
            CommandInterpreter::with_backend(backend.clone())
        };
        info!(
            backend = backend.name(),
            mailer = mailer.name(),
            classifiers = ?interpreter.classifier_names(),
            "agent ready"
        );

        let contacts = ContactBook::open(config.contacts_path()).context("Failed to open contact book")?;

        Ok(Self {
            interpreter,
            engine: DraftEngine::new(backend),
            mailer,
            contacts,
            history: HistoryLog::new(config.history_path()),
            documents: LocalDocumentStore::new(config.documents_dir()),
            calendar: Arc::new(LocalCalendar::new(config.events_path())),
            sessions: SessionRegistry::new(std::time::Duration::from_secs(config.confirmation_ttl_secs)),
            user_id: config.user_id.clone(),
            today: local_today,
            now: local_now,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn contacts(&self) -> &ContactBook {
        &self.contacts
    }

    pub fn contacts_mut(&mut self) -> &mut ContactBook {
        &mut self.contacts
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// Classify without dispatching.
    pub async fn interpret(&self, line: &str) -> ActionRecord {
        let scope = ContactScope { resolver: &self.contacts, user_id: &self.user_id };
        self.interpreter.interpret(line, Some(scope)).await
    }

    /// Interpret and dispatch one line for `session_id`, then log it.
    pub async fn handle_line(&self, session_id: &str, line: &str) -> Reply {
        let handle = self.sessions.get_or_create(session_id, &self.user_id);
        let mut session = handle.lock().await;

        let action = self.interpret(line).await;
        debug!(session_id, action = action.tag(), "dispatching");
        let reply = self.dispatch(&mut session, &action, line).await;
        self.record(line, action.tag(), &reply);
        reply
    }

    /// Finish a clarification flow started by an under-specified draft request.
    pub async fn draft_from_answers(&self, session_id: &str, answers: ClarificationAnswers) -> Reply {
        let handle = self.sessions.get_or_create(session_id, &self.user_id);
        let mut session = handle.lock().await;

        let reply = match answers.into_context() {
            None => Reply::failure(vec!["Draft cancelled: no purpose given.".to_string()]),
            Some(context) => match self.engine.create(&mut session.draft, &context).await {
                Ok(draft) => Reply::ok_with("Draft created:", draft_lines(draft)),
                Err(e) => Reply::failure(vec![e.to_string()]),
            },
        };
        self.record("(clarified draft)", "draft_email", &reply);
        reply
    }

    /// Retry sending the draft after the user supplied recipients.
    pub async fn send_draft_to(&self, session_id: &str, recipients_line: &str) -> Reply {
        let handle = self.sessions.get_or_create(session_id, &self.user_id);
        let mut session = handle.lock().await;

        let recipients = extract_emails(recipients_line);
        let reply = if recipients.is_empty() {
            Reply::failure(vec!["No valid recipients provided.".to_string()])
        } else {
            match self.engine.send(&mut session.draft, &recipients, "", self.mailer.as_ref()).await {
                Ok(receipt) => Reply::ok(vec![receipt.message(), "Draft cleared after sending.".to_string()]),
                Err(DraftError::MissingRecipients) => Reply::failure(vec!["No valid recipients provided.".to_string()]),
                Err(e) => Reply::failure(vec![e.to_string()]),
            }
        };
        self.record(recipients_line, "send_draft", &reply);
        reply
    }

    fn record(&self, command: &str, action: &str, reply: &Reply) {
        let entry = HistoryEntry::new(&self.user_id, command, action, reply.success, &reply.lines.join("\n"));
        if let Err(e) = self.history.log(&entry) {
            warn!(error = %e, "failed to append history");
        }
    }
}
