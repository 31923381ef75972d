//! Calendar collaborator for listing and bulk-deleting upcoming events.
//!
//! `LocalCalendar` keeps events in one JSON file and re-reads it on every
//! call, so edits made outside the process are picked up.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Upcoming events further out than this are not listed.
pub const UPCOMING_WINDOW_DAYS: i64 = 365;
/// Cap on events returned by one `upcoming` call.
pub const MAX_UPCOMING_EVENTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub start: NaiveDateTime,
}

#[derive(Debug, thiserror::Error)]
pub enum CalendarError {
    #[error("Failed to read events: {0}")]
    Read(String),

    #[error("Failed to parse events: {0}")]
    Parse(String),

    #[error("Failed to save events: {0}")]
    Write(String),
}

#[async_trait]
pub trait EventSource: Send + Sync {
    /// A user's events starting at or after `now`, soonest first.
    async fn upcoming(&self, user_id: &str, now: NaiveDateTime) -> Result<Vec<CalendarEvent>, CalendarError>;

    /// Delete the user's events with these ids. Returns how many were removed.
    async fn delete(&self, user_id: &str, ids: &[String]) -> Result<usize, CalendarError>;

    fn name(&self) -> &str;
}

pub struct LocalCalendar {
    path: PathBuf,
}

impl LocalCalendar {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    async fn load(&self) -> Result<Vec<CalendarEvent>, CalendarError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => serde_json::from_str(&contents).map_err(|e| CalendarError::Parse(e.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(CalendarError::Read(e.to_string())),
        }
    }

    async fn save(&self, events: &[CalendarEvent]) -> Result<(), CalendarError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CalendarError::Write(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(events).map_err(|e| CalendarError::Write(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| CalendarError::Write(e.to_string()))
    }
}

#[async_trait]
impl EventSource for LocalCalendar {
    async fn upcoming(&self, user_id: &str, now: NaiveDateTime) -> Result<Vec<CalendarEvent>, CalendarError> {
        let until = now + Duration::days(UPCOMING_WINDOW_DAYS);
        let mut events: Vec<_> = self
            .load()
            .await?
            .into_iter()
            .filter(|e| e.user_id == user_id && e.start >= now && e.start <= until)
            .collect();
        events.sort_by_key(|e| e.start);
        events.truncate(MAX_UPCOMING_EVENTS);
        debug!(user_id, count = events.len(), "listed upcoming events");
        Ok(events)
    }

    async fn delete(&self, user_id: &str, ids: &[String]) -> Result<usize, CalendarError> {
        let mut events = self.load().await?;
        let before = events.len();
        events.retain(|e| !(e.user_id == user_id && ids.contains(&e.id)));
        let removed = before - events.len();
        if removed > 0 {
            self.save(&events).await?;
        }
        info!(user_id, requested = ids.len(), removed, "deleted events");
        Ok(removed)
    }

    fn name(&self) -> &str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
    }

    fn event(id: &str, user_id: &str, start: NaiveDateTime) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            user_id: user_id.to_string(),
            title: format!("Event {}", id),
            start,
        }
    }

    #[tokio::test]
    async fn test_missing_file_has_no_events() {
        let dir = tempdir().unwrap();
        let calendar = LocalCalendar::new(dir.path().join("events.json"));
        assert!(calendar.upcoming("u1", at(2, 8)).await.unwrap().is_empty());
        assert_eq!(calendar.delete("u1", &["x".to_string()]).await.unwrap(), 0);
        assert!(!calendar.path().exists());
    }

    #[tokio::test]
    async fn test_upcoming_filters_and_sorts() {
        let dir = tempdir().unwrap();
        let calendar = LocalCalendar::new(dir.path().join("events.json"));
        calendar
            .save(&[
                event("late", "u1", at(20, 9)),
                event("past", "u1", at(1, 9)),
                event("soon", "u1", at(3, 9)),
                event("other", "u2", at(4, 9)),
            ])
            .await
            .unwrap();

        let ids: Vec<_> = calendar.upcoming("u1", at(2, 8)).await.unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["soon", "late"]);
    }

    #[tokio::test]
    async fn test_delete_only_touches_the_users_events() {
        let dir = tempdir().unwrap();
        let calendar = LocalCalendar::new(dir.path().join("events.json"));
        calendar
            .save(&[event("a", "u1", at(3, 9)), event("b", "u1", at(4, 9)), event("a", "u2", at(3, 9))])
            .await
            .unwrap();

        let removed = calendar.delete("u1", &["a".to_string(), "gone".to_string()]).await.unwrap();
        assert_eq!(removed, 1);

        let left = calendar.load().await.unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().any(|e| e.id == "a" && e.user_id == "u2"));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "[{oops").unwrap();
        let calendar = LocalCalendar::new(path);
        assert!(matches!(calendar.upcoming("u1", at(2, 8)).await, Err(CalendarError::Parse(_))));
    }
}
