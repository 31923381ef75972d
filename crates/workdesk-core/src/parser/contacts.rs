//! Best-effort rewrite of known contact names into email addresses.

use std::collections::HashSet;
use std::sync::OnceLock;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, warn};

/// Maps a display name to an email address, scoped to one user.
pub trait ContactResolver: Send + Sync {
    /// Case-insensitive exact match on the display name.
    fn lookup(&self, user_id: &str, display_name: &str) -> Result<Option<String>>;
}

/// Words of the command grammar that are never treated as contact names.
const STOPWORDS: &[&str] = &[
    "a", "about", "all", "an", "and", "are", "at", "but", "by", "can", "close", "could",
    "create", "delete", "draft", "email", "event", "exit", "file", "find", "for", "friday",
    "from", "had", "has", "have", "help", "how", "i", "image", "in", "is", "list", "me",
    "meet", "monday", "my", "next", "note", "on", "or", "please", "quit", "saturday",
    "schedule", "search", "send", "should", "show", "summary", "sunday", "task", "that",
    "the", "this", "thursday", "to", "today", "tomorrow", "tuesday", "upcoming", "view",
    "was", "wednesday", "were", "what", "when", "where", "who", "why", "will", "with",
    "would", "you", "bye", "folder",
];

fn stopwords() -> &'static HashSet<&'static str> {
    static SET: OnceLock<HashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| STOPWORDS.iter().copied().collect())
}

fn re_clock() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{1,2}(?::\d{2})?\s*(?:am|pm)?").expect("clock regex must compile")
    })
}

fn is_candidate(token: &str) -> bool {
    let lower = token.to_lowercase();
    !(token.contains('@')
        || token.chars().all(|c| c.is_ascii_digit())
        || re_clock().is_match(&lower)
        || stopwords().contains(lower.as_str())
        || token.chars().count() <= 1)
}

/// Replace every token that names a known contact with that contact's email.
///
/// Tokens are split on whitespace and re-joined with single spaces. A lookup
/// error leaves the token as it was.
pub fn resolve_contact_names(utterance: &str, user_id: &str, resolver: &dyn ContactResolver) -> String {
    utterance
        .split_whitespace()
        .map(|token| {
            if !is_candidate(token) {
                return token.to_string();
            }
            match resolver.lookup(user_id, token) {
                Ok(Some(email)) => {
                    debug!(token, %email, "resolved contact name");
                    email
                }
                Ok(None) => token.to_string(),
                Err(e) => {
                    warn!(token, error = %e, "contact lookup failed, leaving token unchanged");
                    token.to_string()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MapResolver(HashMap<String, String>);

    impl ContactResolver for MapResolver {
        fn lookup(&self, user_id: &str, display_name: &str) -> Result<Option<String>> {
            if display_name.eq_ignore_ascii_case("broken") {
                anyhow::bail!("backend down");
            }
            Ok(self.0.get(&format!("{user_id}:{}", display_name.to_lowercase())).cloned())
        }
    }

    fn resolver() -> MapResolver {
        let mut map = HashMap::new();
        map.insert("u1:alice".to_string(), "alice@example.com".to_string());
        map.insert("u1:send".to_string(), "wrong@example.com".to_string());
        map.insert("u1:10am".to_string(), "wrong@example.com".to_string());
        MapResolver(map)
    }

    #[test]
    fn test_resolves_names_case_insensitively() {
        let out = resolve_contact_names("send report.pdf to ALICE", "u1", &resolver());
        assert_eq!(out, "send report.pdf to alice@example.com");
    }

    #[test]
    fn test_scoped_to_user() {
        let out = resolve_contact_names("email Alice", "u2", &resolver());
        assert_eq!(out, "email Alice");
    }

    #[test]
    fn test_skips_stopwords_times_numbers_and_emails() {
        let out = resolve_contact_names("Send it at 10am to bob@x.com 42", "u1", &resolver());
        assert_eq!(out, "Send it at 10am to bob@x.com 42");
    }

    #[test]
    fn test_lookup_error_keeps_token() {
        let out = resolve_contact_names("meet broken alice", "u1", &resolver());
        assert_eq!(out, "meet broken alice@example.com");
    }
}
