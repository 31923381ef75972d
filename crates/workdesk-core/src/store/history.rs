use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use tracing::warn;

use crate::models::{HistoryEntry, HistoryStats};

#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode history entry: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Append-only JSON-lines command log
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn log(&self, entry: &HistoryEntry) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let line = serde_json::to_string(entry)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Every entry in file order. Unreadable lines are skipped.
    fn read_all(&self) -> Result<Vec<HistoryEntry>, HistoryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        Ok(contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!(error = %e, "skipping malformed history line");
                    None
                }
            })
            .collect())
    }

    pub fn entries(&self, user_id: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        Ok(self.read_all()?.into_iter().filter(|e| e.user_id == user_id).collect())
    }

    /// Newest first
    pub fn recent(&self, user_id: &str, limit: usize) -> Result<Vec<HistoryEntry>, HistoryError> {
        let mut entries = self.entries(user_id)?;
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    /// Case-insensitive match on command or response, newest first
    pub fn search(&self, user_id: &str, text: &str) -> Result<Vec<HistoryEntry>, HistoryError> {
        let needle = text.to_lowercase();
        let mut hits: Vec<_> = self
            .entries(user_id)?
            .into_iter()
            .filter(|e| e.command.to_lowercase().contains(&needle) || e.response.to_lowercase().contains(&needle))
            .collect();
        hits.reverse();
        Ok(hits)
    }

    pub fn stats(&self, user_id: &str) -> Result<HistoryStats, HistoryError> {
        let mut stats = HistoryStats::default();
        for entry in self.entries(user_id)? {
            stats.total += 1;
            if entry.success {
                stats.succeeded += 1;
            } else {
                stats.failed += 1;
            }
            *stats.by_action.entry(entry.action).or_insert(0) += 1;
        }
        Ok(stats)
    }

    /// Drop a user's entries, returning how many were removed
    pub fn clear(&self, user_id: &str) -> Result<usize, HistoryError> {
        let all = self.read_all()?;
        let before = all.len();
        let kept: Vec<_> = all.into_iter().filter(|e| e.user_id != user_id).collect();
        let removed = before - kept.len();
        if removed == 0 {
            return Ok(0);
        }

        let mut out = String::new();
        for entry in &kept {
            out.push_str(&serde_json::to_string(entry)?);
            out.push('\n');
        }
        fs::write(&self.path, out)?;
        Ok(removed)
    }
}
