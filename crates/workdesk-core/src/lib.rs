pub mod ai;
pub mod calendar;
pub mod config;
pub mod confirm;
pub mod constants;
pub mod docs;
pub mod draft;
pub mod entities;
pub mod mail;
pub mod models;
pub mod parser;
pub mod session;
pub mod store;
pub mod tracing_setup;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use ai::GenerativeBackend;
pub use calendar::{CalendarEvent, EventSource, LocalCalendar};
pub use config::{AgentConfig, ConfigError};
pub use confirm::{ConfirmationGate, ConfirmationOutcome};
pub use draft::{DraftEngine, DraftError};
pub use mail::{MailError, MailSender, OutgoingMail};
pub use models::{ActionRecord, DraftArtifact};
pub use parser::{CommandInterpreter, ContactResolver, ContactScope};
pub use session::{Session, SessionHandle, SessionRegistry};
