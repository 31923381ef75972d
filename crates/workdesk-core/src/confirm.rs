//! Two-phase confirmation for bulk-destructive actions.
//!
//! IDLE -> AWAITING_CONFIRMATION (armed with candidate ids) -> IDLE. Only an
//! explicit `confirm_yes` inside the TTL releases the ids; any other record,
//! including `confirm_no`, discards them.

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::models::ActionRecord;

#[derive(Debug, Clone)]
struct Pending {
    ids: Vec<String>,
    armed_at: Instant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Proceed with deleting these ids
    Confirmed(Vec<String>),
    /// The user said no
    Cancelled { discarded: usize },
    /// Something other than yes/no arrived; the pending list was dropped
    Superseded { discarded: usize },
    /// The pending list outlived its TTL
    Expired,
    NothingPending,
}

/// At most one pending bulk operation per session.
#[derive(Debug, Clone)]
pub struct ConfirmationGate {
    ttl: Duration,
    pending: Option<Pending>,
}

impl ConfirmationGate {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, pending: None }
    }

    /// Start waiting for confirmation. A previous pending list is replaced.
    pub fn arm(&mut self, ids: Vec<String>) {
        info!(candidates = ids.len(), "awaiting bulk delete confirmation");
        self.pending = Some(Pending {
            ids,
            armed_at: Instant::now(),
        });
    }

    /// Whether an unexpired list is waiting.
    pub fn is_awaiting(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !self.is_expired(p))
    }

    /// Whether anything, expired or not, is held
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_ids(&self) -> Option<&[String]> {
        self.pending
            .as_ref()
            .filter(|p| !self.is_expired(p))
            .map(|p| p.ids.as_slice())
    }

    /// Feed the next interpreted record through the gate. Always leaves it idle.
    pub fn resolve(&mut self, action: &ActionRecord) -> ConfirmationOutcome {
        let Some(pending) = self.pending.take() else {
            return ConfirmationOutcome::NothingPending;
        };
        if self.is_expired(&pending) {
            debug!("pending bulk delete expired");
            return ConfirmationOutcome::Expired;
        }
        let discarded = pending.ids.len();
        match action {
            ActionRecord::ConfirmYes => ConfirmationOutcome::Confirmed(pending.ids),
            ActionRecord::ConfirmNo => ConfirmationOutcome::Cancelled { discarded },
            other => {
                debug!(action = other.tag(), "pending bulk delete superseded");
                ConfirmationOutcome::Superseded { discarded }
            }
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn is_expired(&self, pending: &Pending) -> bool {
        pending.armed_at.elapsed() >= self.ttl
    }
}

/// The question shown after arming the gate
pub fn confirmation_prompt(count: usize) -> String {
    let noun = if count == 1 { "event" } else { "events" };
    format!(
        "Found {} upcoming {}. Are you sure you want to delete all of them? Reply 'yes' to confirm or 'no' to cancel.",
        count, noun
    )
}
