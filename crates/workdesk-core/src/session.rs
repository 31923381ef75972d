use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::confirm::ConfirmationGate;
use crate::models::DraftArtifact;

/// Mutable state for one conversation: its draft and its pending confirmation.
#[derive(Debug)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub draft: DraftArtifact,
    pub confirmations: ConfirmationGate,
}

impl Session {
    pub fn new(id: &str, user_id: &str, confirmation_ttl: Duration) -> Self {
        Self {
            id: id.to_string(),
            user_id: user_id.to_string(),
            draft: DraftArtifact::default(),
            confirmations: ConfirmationGate::new(confirmation_ttl),
        }
    }
}

pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

/// Hands out one state slot per session id.
///
/// Callers hold the session's async lock for the whole command, so at most one
/// command per session is in flight.
pub struct SessionRegistry {
    confirmation_ttl: Duration,
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new(confirmation_ttl: Duration) -> Self {
        Self {
            confirmation_ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_or_create(&self, session_id: &str, user_id: &str) -> SessionHandle {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                debug!(session_id, user_id, "new session");
                Arc::new(tokio::sync::Mutex::new(Session::new(session_id, user_id, self.confirmation_ttl)))
            })
            .clone()
    }

    pub fn get(&self, session_id: &str) -> Option<SessionHandle> {
        self.sessions.lock().get(session_id).cloned()
    }

    pub fn remove(&self, session_id: &str) -> bool {
        self.sessions.lock().remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
