use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One recognized user intent plus its extracted parameters.
///
/// Serialized with the variant name in an `action` field, which is exactly the
/// shape the classification prompt asks the model for. Every payload field is
/// optional: a missing field is something the dispatcher checks, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionRecord {
    // Files
    ListFiles,
    SearchFiles {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        keyword: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::list")]
        keywords: Option<Vec<String>>,
    },
    SendFile {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::list")]
        file_name: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        email: Option<String>,
    },
    SummarizeFile {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        file_id: Option<String>,
    },
    ShowImages,
    ShowImage {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        file_name: Option<String>,
    },
    ViewFolder {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        folder_name: Option<String>,
    },

    // Tasks
    ListTasks,
    AddTask {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        due: Option<String>,
    },
    CompleteTask {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        task_id: Option<String>,
    },
    DeleteTask {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        task_id: Option<String>,
    },

    // Notes
    ListNotes,
    CreateNote {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        content: Option<String>,
    },
    GetNote {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        note_id: Option<String>,
    },
    DeleteNote {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        note_id: Option<String>,
    },
    SearchNotes {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        keyword: Option<String>,
    },

    // Calendar
    ListEvents,
    ListToday,
    ListDate {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        date: Option<String>,
    },
    CreateEvent {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        time: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        description: Option<String>,
    },
    GetEvent {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        event_id: Option<String>,
    },
    DeleteEvent {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        event_id: Option<String>,
    },
    DeleteAllEvents,
    ConfirmDeleteAll {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::list")]
        event_ids: Option<Vec<String>>,
    },
    ConfirmYes,
    ConfirmNo,

    // Meet
    ScheduleMeet {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        title: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        time: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::list")]
        attendees: Option<Vec<String>>,
    },
    SendMeetInvite {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        email: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        event_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        event_title: Option<String>,
    },

    // Drafts
    DraftEmail {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        text: Option<String>,
    },
    DraftSummary {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        file_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        email: Option<String>,
    },
    ShowDraft,
    ClearDraft,
    RefineDraft {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::string")]
        instruction: Option<String>,
    },
    SendDraft {
        #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "lenient::list")]
        email: Option<Vec<String>>,
    },

    // Session
    Help,
    Exit,
    Unknown,

    /// A model response whose `action` tag is not part of the vocabulary.
    /// Kept so the dispatcher can report it instead of guessing.
    #[serde(skip)]
    Unsupported { action: String },
}

impl ActionRecord {
    /// The wire tag of this record, e.g. `"send_draft"`.
    pub fn tag(&self) -> &str {
        match self {
            Self::ListFiles => "list_files",
            Self::SearchFiles { .. } => "search_files",
            Self::SendFile { .. } => "send_file",
            Self::SummarizeFile { .. } => "summarize_file",
            Self::ShowImages => "show_images",
            Self::ShowImage { .. } => "show_image",
            Self::ViewFolder { .. } => "view_folder",
            Self::ListTasks => "list_tasks",
            Self::AddTask { .. } => "add_task",
            Self::CompleteTask { .. } => "complete_task",
            Self::DeleteTask { .. } => "delete_task",
            Self::ListNotes => "list_notes",
            Self::CreateNote { .. } => "create_note",
            Self::GetNote { .. } => "get_note",
            Self::DeleteNote { .. } => "delete_note",
            Self::SearchNotes { .. } => "search_notes",
            Self::ListEvents => "list_events",
            Self::ListToday => "list_today",
            Self::ListDate { .. } => "list_date",
            Self::CreateEvent { .. } => "create_event",
            Self::GetEvent { .. } => "get_event",
            Self::DeleteEvent { .. } => "delete_event",
            Self::DeleteAllEvents => "delete_all_events",
            Self::ConfirmDeleteAll { .. } => "confirm_delete_all",
            Self::ConfirmYes => "confirm_yes",
            Self::ConfirmNo => "confirm_no",
            Self::ScheduleMeet { .. } => "schedule_meet",
            Self::SendMeetInvite { .. } => "send_meet_invite",
            Self::DraftEmail { .. } => "draft_email",
            Self::DraftSummary { .. } => "draft_summary",
            Self::ShowDraft => "show_draft",
            Self::ClearDraft => "clear_draft",
            Self::RefineDraft { .. } => "refine_draft",
            Self::SendDraft { .. } => "send_draft",
            Self::Help => "help",
            Self::Exit => "exit",
            Self::Unknown => "unknown",
            Self::Unsupported { action } => action,
        }
    }

    /// Whether the record belongs to the draft engine's vocabulary.
    pub fn is_draft_action(&self) -> bool {
        matches!(
            self,
            Self::DraftEmail { .. }
                | Self::DraftSummary { .. }
                | Self::ShowDraft
                | Self::ClearDraft
                | Self::RefineDraft { .. }
                | Self::SendDraft { .. }
        )
    }

    /// Bulk-destructive records must go through a confirmation step.
    pub fn is_bulk_destructive(&self) -> bool {
        matches!(self, Self::DeleteAllEvents)
    }

    /// Decode a model response that has already been parsed as JSON.
    ///
    /// Only an object carrying a string `action` key is accepted. Known tags
    /// decode leniently; unknown tags become [`ActionRecord::Unsupported`].
    pub fn from_model_value(value: Value) -> Option<Self> {
        let tag = value.as_object()?.get("action")?.as_str()?.to_string();
        match serde_json::from_value::<ActionRecord>(value) {
            Ok(record) => Some(record),
            Err(_) => Some(Self::Unsupported { action: tag }),
        }
    }

    /// JSON form of the record, including `Unsupported` tags.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Unsupported { action } => serde_json::json!({ "action": action }),
            other => serde_json::to_value(other)
                .unwrap_or_else(|_| serde_json::json!({ "action": other.tag() })),
        }
    }

    /// One representative record per variant, in prompt order.
    ///
    /// The classification prompt is rendered from this list, so anything the
    /// prompt promises is guaranteed to deserialize back into a variant.
    pub fn catalogue() -> Vec<ActionRecord> {
        let s = |v: &str| Some(v.to_string());
        let l = |v: &[&str]| Some(v.iter().map(|x| x.to_string()).collect::<Vec<_>>());
        vec![
            Self::ListFiles,
            Self::SearchFiles { keyword: s("budget"), keywords: None },
            Self::SendFile { file_name: l(&["file1.pdf"]), email: s("user@example.com") },
            Self::SummarizeFile { file_name: s("report.pdf"), file_id: None },
            Self::SummarizeFile { file_name: None, file_id: s("123") },
            Self::ShowImages,
            Self::ShowImage { file_name: s("image.jpg") },
            Self::ViewFolder { folder_name: s("Photos") },
            Self::ListTasks,
            Self::AddTask { text: s("Buy groceries"), due: s("tomorrow") },
            Self::CompleteTask { task_id: s("123") },
            Self::DeleteTask { task_id: s("123") },
            Self::ListNotes,
            Self::CreateNote { title: s("Meeting notes"), content: s("...") },
            Self::GetNote { note_id: s("123") },
            Self::DeleteNote { note_id: s("123") },
            Self::SearchNotes { keyword: s("project") },
            Self::ListEvents,
            Self::ListToday,
            Self::ListDate { date: s("march 19") },
            Self::CreateEvent {
                title: s("Meeting"),
                date: s("tomorrow"),
                time: s("2pm"),
                description: s("Quarterly review"),
            },
            Self::GetEvent { event_id: s("123") },
            Self::DeleteEvent { event_id: s("123") },
            Self::DeleteAllEvents,
            Self::ConfirmDeleteAll { event_ids: l(&["id1", "id2"]) },
            Self::ConfirmYes,
            Self::ConfirmNo,
            Self::ScheduleMeet {
                title: s("Team sync"),
                date: s("tomorrow"),
                time: s("2pm"),
                attendees: l(&["email@example.com"]),
            },
            Self::SendMeetInvite {
                email: s("person@example.com"),
                event_id: s("123"),
                event_title: None,
            },
            Self::DraftEmail { text: s("I need to request sick leave for 2 days starting Monday") },
            Self::DraftSummary { file_name: s("report.pdf"), email: s("optional@email.com") },
            Self::ShowDraft,
            Self::ClearDraft,
            Self::RefineDraft { instruction: s("make it more formal") },
            Self::SendDraft { email: l(&["recipient@example.com"]) },
            Self::Help,
            Self::Exit,
        ]
    }
}

/// Field decoders that accept whatever shape a model plausibly returns.
mod lenient {
    use super::*;

    fn scalar(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            Value::Array(items) => items.into_iter().find_map(scalar),
            _ => None,
        }
    }

    pub(super) fn string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.and_then(scalar))
    }

    pub(super) fn list<'de, D>(deserializer: D) -> Result<Option<Vec<String>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            None | Some(Value::Null) => None,
            Some(Value::Array(items)) => Some(items.into_iter().filter_map(scalar).collect()),
            Some(other) => scalar(other).map(|s| vec![s]),
        })
    }
}
