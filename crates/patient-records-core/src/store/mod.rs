//! JSON file store for patient records.
//!
//! The whole document is read on every operation and rewritten on every
//! mutation. There is no locking: concurrent writers race and the last one
//! wins.

mod patients;
mod sort;

pub use sort::*;

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::validation::{ValidationErrors, ValidationRules};

/// Store errors.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Patient record not found: {0}")]
    NotFound(String),

    #[error("Patient already exists: {0}")]
    Conflict(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Validation(#[from] ValidationErrors),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// The on-disk document: lowercase patient id to record attributes,
/// in insertion order.
pub type PatientTable = Map<String, Value>;

/// Normalize a patient id to its storage key: trimmed and lowercased.
pub fn storage_key(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Handle to a patient store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct PatientStore {
    path: PathBuf,
    rules: ValidationRules,
}

impl PatientStore {
    /// Create a handle for the document at `path`. The file need not exist.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            rules: ValidationRules::default(),
        }
    }

    /// Replace the validation rules applied on create and update.
    pub fn with_rules(mut self, rules: ValidationRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rules(&self) -> &ValidationRules {
        &self.rules
    }

    /// Read the full document. A missing file is an empty store.
    pub fn load(&self) -> RecordResult<PatientTable> {
        match fs::read(&self.path) {
            Ok(bytes) => {
                let table: PatientTable = serde_json::from_slice(&bytes)?;
                debug!(path = %self.path.display(), count = table.len(), "loaded patient table");
                Ok(table)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent, starting empty");
                Ok(PatientTable::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the document with `table`.
    pub fn save(&self, table: &PatientTable) -> RecordResult<()> {
        let mut buf = Vec::new();
        let mut ser =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
        table.serialize(&mut ser)?;
        fs::write(&self.path, buf)?;
        debug!(path = %self.path.display(), count = table.len(), "saved patient table");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn setup_store() -> (TempDir, PatientStore) {
        let dir = TempDir::new().unwrap();
        let store = PatientStore::new(dir.path().join("patients.json"));
        (dir, store)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (_dir, store) = setup_store();
        assert!(store.load().unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_save_and_load_preserves_order() {
        let (_dir, store) = setup_store();

        let mut table = PatientTable::new();
        table.insert("p003".into(), json!({"name": "C"}));
        table.insert("p001".into(), json!({"name": "A"}));
        table.insert("p002".into(), json!({"name": "B"}));
        store.save(&table).unwrap();

        let loaded = store.load().unwrap();
        let keys: Vec<_> = loaded.keys().cloned().collect();
        assert_eq!(keys, vec!["p003", "p001", "p002"]);
    }

    #[test]
    fn test_save_uses_four_space_indent() {
        let (_dir, store) = setup_store();

        let mut table = PatientTable::new();
        table.insert("p001".into(), json!({"name": "A"}));
        store.save(&table).unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        assert_eq!(text, "{\n    \"p001\": {\n        \"name\": \"A\"\n    }\n}");
    }

    #[test]
    fn test_load_truncated_file_fails() {
        let (_dir, store) = setup_store();
        fs::write(store.path(), "{\"p001\": {\"name\": ").unwrap();
        assert!(matches!(store.load(), Err(RecordError::Json(_))));
    }

    #[test]
    fn test_storage_key_normalizes() {
        assert_eq!(storage_key("P001"), "p001");
        assert_eq!(storage_key("p001"), "p001");
        assert_eq!(storage_key(" P001\t"), "p001");
        assert_eq!(storage_key("   "), "");
    }
}
