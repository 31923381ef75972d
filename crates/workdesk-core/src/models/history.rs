use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One handled command, as appended to the history log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    pub command: String,
    /// Action tag the command was interpreted as
    pub action: String,
    pub success: bool,
    #[serde(default)]
    pub response: String,
}

impl HistoryEntry {
    pub fn new(user_id: &str, command: &str, action: &str, success: bool, response: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            user_id: user_id.to_string(),
            command: command.to_string(),
            action: action.to_string(),
            success,
            response: response.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub by_action: BTreeMap<String, usize>,
}
