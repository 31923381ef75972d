pub mod action;
pub mod contact;
pub mod draft;
pub mod history;

pub use action::ActionRecord;
pub use contact::Contact;
pub use draft::{subject_from_body, DraftArtifact, DraftKind};
pub use history::{HistoryEntry, HistoryStats};
