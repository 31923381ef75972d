//! Directory-backed document store used for file listing, search and summaries.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

/// Share of printable characters below which a file is treated as binary.
const MIN_PRINTABLE_RATIO: f64 = 0.7;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp"];

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Document I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No file matching '{0}' was found")]
    NotFound(String),

    #[error("'{0}' is a binary file and cannot be read as text")]
    Binary(String),

    #[error("'{0}' is not UTF-8 text")]
    NotUtf8(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub name: String,
    /// Path relative to the store root, used as the document id
    pub id: String,
    pub path: PathBuf,
    pub size: u64,
}

impl DocumentInfo {
    pub fn is_image(&self) -> bool {
        Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
    }
}

pub struct LocalDocumentStore {
    root: PathBuf,
}

impl LocalDocumentStore {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every visible file under the root, sorted by id. A missing root is empty.
    pub fn list(&self) -> Result<Vec<DocumentInfo>, DocumentError> {
        let mut out = Vec::new();
        if self.root.is_dir() {
            self.walk(&self.root, &mut out)?;
        }
        out.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(out)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<DocumentInfo>) -> Result<(), DocumentError> {
        for entry in fs::read_dir(dir)?.flatten() {
            let name = entry.file_name().to_string_lossy().to_string();
            // Skip dotfiles
            if name.starts_with('.') {
                continue;
            }
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_symlink() {
                continue;
            }
            let path = entry.path();
            if file_type.is_dir() {
                self.walk(&path, out)?;
            } else if file_type.is_file() {
                let id = path
                    .strip_prefix(&self.root)
                    .unwrap_or(&path)
                    .to_string_lossy()
                    .replace('\\', "/");
                let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
                out.push(DocumentInfo { name, id, path, size });
            }
        }
        Ok(())
    }

    /// Files whose name contains any keyword (case-insensitive), each file once.
    pub fn search<S: AsRef<str>>(&self, keywords: &[S]) -> Result<Vec<DocumentInfo>, DocumentError> {
        let needles: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        if needles.is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut hits = Vec::new();
        let files = self.list()?;
        for needle in &needles {
            for doc in &files {
                if doc.name.to_lowercase().contains(needle) && seen.insert(doc.path.clone()) {
                    hits.push(doc.clone());
                }
            }
        }
        debug!(keywords = needles.len(), hits = hits.len(), "document search");
        Ok(hits)
    }

    /// Exact (case-insensitive) name first, then the first name containing `query`.
    pub fn best_match(&self, query: &str) -> Result<DocumentInfo, DocumentError> {
        let wanted = query.trim().to_lowercase();
        let files = self.list()?;
        files
            .iter()
            .find(|d| d.name.to_lowercase() == wanted)
            .or_else(|| files.iter().find(|d| !wanted.is_empty() && d.name.to_lowercase().contains(&wanted)))
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(query.trim().to_string()))
    }

    pub fn get_by_id(&self, id: &str) -> Result<DocumentInfo, DocumentError> {
        self.list()?
            .into_iter()
            .find(|d| d.id == id.trim())
            .ok_or_else(|| DocumentError::NotFound(id.trim().to_string()))
    }

    /// Files directly inside a top-level folder of the store.
    pub fn folder(&self, folder_name: &str) -> Result<Vec<DocumentInfo>, DocumentError> {
        let prefix = format!("{}/", folder_name.trim().trim_matches('/').to_lowercase());
        let files: Vec<_> = self
            .list()?
            .into_iter()
            .filter(|d| {
                let id = d.id.to_lowercase();
                id.strip_prefix(&prefix).is_some_and(|rest| !rest.contains('/'))
            })
            .collect();
        if files.is_empty() {
            return Err(DocumentError::NotFound(folder_name.trim().to_string()));
        }
        Ok(files)
    }

    pub fn images(&self) -> Result<Vec<DocumentInfo>, DocumentError> {
        Ok(self.list()?.into_iter().filter(DocumentInfo::is_image).collect())
    }

    pub fn read_bytes(&self, doc: &DocumentInfo) -> Result<Vec<u8>, DocumentError> {
        Ok(fs::read(&doc.path)?)
    }

    /// Load a document as text, rejecting binary content.
    pub fn load_text(&self, doc: &DocumentInfo) -> Result<String, DocumentError> {
        let bytes = self.read_bytes(doc)?;
        if bytes.contains(&0) {
            return Err(DocumentError::Binary(doc.name.clone()));
        }
        let text = String::from_utf8(bytes).map_err(|_| DocumentError::NotUtf8(doc.name.clone()))?;
        if !looks_printable(&text) {
            return Err(DocumentError::Binary(doc.name.clone()));
        }
        Ok(text)
    }
}

fn looks_printable(text: &str) -> bool {
    let total = text.chars().count();
    if total == 0 {
        return true;
    }
    let printable = text
        .chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .count();
    printable as f64 / total as f64 >= MIN_PRINTABLE_RATIO
}
