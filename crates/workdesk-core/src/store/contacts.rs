use std::fs;
use std::path::PathBuf;

use anyhow::Result as AnyResult;
use chrono::Utc;
use tracing::{debug, warn};

use crate::entities::extract_emails;
use crate::models::Contact;
use crate::parser::ContactResolver;

#[derive(Debug, thiserror::Error)]
pub enum ContactStoreError {
    #[error("Failed to read contacts: {0}")]
    Read(String),

    #[error("Failed to parse contacts: {0}")]
    Parse(String),

    #[error("Failed to save contacts: {0}")]
    Write(String),

    #[error("A contact named '{0}' already exists")]
    Duplicate(String),

    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("Contact name must not be empty")]
    EmptyName,

    #[error("No contact named '{0}'")]
    NotFound(String),
}

/// Per-user contact list persisted as one JSON file.
///
/// Mutations are transactional: when the write fails the in-memory list is
/// restored and the error returned.
pub struct ContactBook {
    path: PathBuf,
    contacts: Vec<Contact>,
}

impl ContactBook {
    /// Load from `path`. A missing file is an empty book.
    pub fn open(path: PathBuf) -> Result<Self, ContactStoreError> {
        let contacts = match fs::read_to_string(&path) {
            Ok(contents) => {
                serde_json::from_str(&contents).map_err(|e| ContactStoreError::Parse(e.to_string()))?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(ContactStoreError::Read(e.to_string())),
        };
        Ok(Self { path, contacts })
    }

    fn save_to_file(&self) -> Result<(), ContactStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ContactStoreError::Write(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(&self.contacts)
            .map_err(|e| ContactStoreError::Write(e.to_string()))?;
        fs::write(&self.path, json).map_err(|e| ContactStoreError::Write(e.to_string()))
    }

    fn position(&self, user_id: &str, name: &str) -> Option<usize> {
        self.contacts.iter().position(|c| c.matches_name(user_id, name))
    }

    fn validate_email(email: &str) -> Result<String, ContactStoreError> {
        let email = email.trim().to_lowercase();
        match extract_emails(&email).as_slice() {
            [only] if *only == email => Ok(email),
            _ => Err(ContactStoreError::InvalidEmail(email)),
        }
    }

    pub fn add(&mut self, user_id: &str, name: &str, email: &str) -> Result<&Contact, ContactStoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ContactStoreError::EmptyName);
        }
        let email = Self::validate_email(email)?;
        if self.position(user_id, name).is_some() {
            return Err(ContactStoreError::Duplicate(name.to_string()));
        }

        self.contacts.push(Contact::new(user_id, name, &email));
        if let Err(e) = self.save_to_file() {
            warn!(error = %e, "rolling back contact add");
            self.contacts.pop();
            return Err(e);
        }
        debug!(user_id, name, "contact added");
        let last = self.contacts.len() - 1;
        Ok(&self.contacts[last])
    }

    pub fn update(&mut self, user_id: &str, name: &str, email: &str) -> Result<(), ContactStoreError> {
        let email = Self::validate_email(email)?;
        let idx = self
            .position(user_id, name)
            .ok_or_else(|| ContactStoreError::NotFound(name.trim().to_string()))?;

        let original = self.contacts[idx].clone();
        self.contacts[idx].email = email;
        self.contacts[idx].updated_at = Some(Utc::now());

        if let Err(e) = self.save_to_file() {
            self.contacts[idx] = original;
            return Err(e);
        }
        Ok(())
    }

    pub fn remove(&mut self, user_id: &str, name: &str) -> Result<Contact, ContactStoreError> {
        let idx = self
            .position(user_id, name)
            .ok_or_else(|| ContactStoreError::NotFound(name.trim().to_string()))?;

        let removed = self.contacts.remove(idx);
        if let Err(e) = self.save_to_file() {
            // Rollback: re-insert at the same position
            self.contacts.insert(idx, removed);
            return Err(e);
        }
        Ok(removed)
    }

    /// A user's contacts sorted by name
    pub fn list(&self, user_id: &str) -> Vec<&Contact> {
        let mut contacts: Vec<_> = self.contacts.iter().filter(|c| c.user_id == user_id).collect();
        contacts.sort_by_key(|c| c.name.to_lowercase());
        contacts
    }

    /// Case-insensitive substring match on name or email
    pub fn search(&self, user_id: &str, query: &str) -> Vec<&Contact> {
        let query = query.trim().to_lowercase();
        self.list(user_id)
            .into_iter()
            .filter(|c| c.name.to_lowercase().contains(&query) || c.email.contains(&query))
            .collect()
    }

    pub fn get(&self, user_id: &str, name: &str) -> Option<&Contact> {
        self.position(user_id, name).map(|idx| &self.contacts[idx])
    }
}

impl ContactResolver for ContactBook {
    fn lookup(&self, user_id: &str, display_name: &str) -> AnyResult<Option<String>> {
        Ok(self.get(user_id, display_name).map(|c| c.email.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn book(dir: &tempfile::TempDir) -> ContactBook {
        ContactBook::open(dir.path().join("contacts.json")).unwrap()
    }

    #[test]
    fn test_add_normalizes_and_persists() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);

        let added = contacts.add("u1", " Alice ", " Alice@Example.COM ").unwrap();
        assert_eq!(added.name, "Alice");
        assert_eq!(added.email, "alice@example.com");

        let reopened = book(&dir);
        assert_eq!(reopened.lookup("u1", "ALICE").unwrap(), Some("alice@example.com".to_string()));
        assert_eq!(reopened.lookup("u2", "alice").unwrap(), None);
    }

    #[test]
    fn test_rejects_duplicates_and_bad_input() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);
        contacts.add("u1", "Bob", "bob@x.com").unwrap();

        assert!(matches!(contacts.add("u1", "bob", "b2@x.com"), Err(ContactStoreError::Duplicate(_))));
        assert!(matches!(contacts.add("u1", "Eve", "not-an-email"), Err(ContactStoreError::InvalidEmail(_))));
        assert!(matches!(contacts.add("u1", "Eve", "eve@x.com extra"), Err(ContactStoreError::InvalidEmail(_))));
        assert!(matches!(contacts.add("u1", "  ", "eve@x.com"), Err(ContactStoreError::EmptyName)));
        // other users may reuse a name
        assert!(contacts.add("u2", "Bob", "bob@y.com").is_ok());
    }

    #[test]
    fn test_list_search_update_remove() {
        let dir = tempdir().unwrap();
        let mut contacts = book(&dir);
        contacts.add("u1", "zed", "zed@x.com").unwrap();
        contacts.add("u1", "Amy", "amy@corp.io").unwrap();
        contacts.add("u1", "mark", "m@corp.io").unwrap();

        let names: Vec<_> = contacts.list("u1").iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Amy", "mark", "zed"]);

        let hits: Vec<_> = contacts.search("u1", "CORP").iter().map(|c| c.name.clone()).collect();
        assert_eq!(hits, vec!["Amy", "mark"]);

        contacts.update("u1", "AMY", "amy@new.io").unwrap();
        assert_eq!(contacts.get("u1", "amy").unwrap().email, "amy@new.io");
        assert!(contacts.get("u1", "amy").unwrap().updated_at.is_some());

        let removed = contacts.remove("u1", "Zed").unwrap();
        assert_eq!(removed.email, "zed@x.com");
        assert!(matches!(contacts.remove("u1", "zed"), Err(ContactStoreError::NotFound(_))));
        assert_eq!(book(&dir).list("u1").len(), 2);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        let mut contacts = ContactBook::open(sub.join("contacts.json")).unwrap();
        assert!(contacts.list("u1").is_empty());

        // Put a regular file where the directory has to be.
        std::fs::write(&sub, "a file, not a directory").unwrap();

        assert!(matches!(contacts.add("u1", "Amy", "amy@x.com"), Err(ContactStoreError::Write(_))));
        assert!(contacts.list("u1").is_empty());
    }

    #[test]
    fn test_failed_update_and_remove_roll_back() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        let mut contacts = ContactBook::open(sub.join("contacts.json")).unwrap();
        contacts.add("u1", "Amy", "amy@x.com").unwrap();

        std::fs::remove_dir_all(&sub).unwrap();
        std::fs::write(&sub, "a file, not a directory").unwrap();

        assert!(matches!(contacts.update("u1", "amy", "amy@new.io"), Err(ContactStoreError::Write(_))));
        let amy = contacts.get("u1", "amy").unwrap();
        assert_eq!(amy.email, "amy@x.com");
        assert!(amy.updated_at.is_none());

        assert!(matches!(contacts.remove("u1", "Amy"), Err(ContactStoreError::Write(_))));
        assert_eq!(contacts.list("u1").len(), 1);

        assert!(matches!(contacts.add("u1", "Bob", "bob@x.com"), Err(ContactStoreError::Write(_))));
        assert_eq!(contacts.list("u1").len(), 1);
    }

    #[test]
    fn test_corrupt_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(ContactBook::open(path), Err(ContactStoreError::Parse(_))));
    }
}
