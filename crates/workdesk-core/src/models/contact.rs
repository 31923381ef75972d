use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A known display name mapped to an email address, scoped to one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Contact {
    pub fn new(user_id: &str, name: &str, email: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            name: name.trim().to_string(),
            email: email.trim().to_lowercase(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn matches_name(&self, user_id: &str, name: &str) -> bool {
        self.user_id == user_id && self.name.to_lowercase() == name.trim().to_lowercase()
    }
}
