//! Key-value settings store.
//!
//! The engine treats persisted settings as opaque JSON blobs under string
//! keys. Backends only need `get` and `set`; shape validation happens in
//! [`Preferences`](super::Preferences).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::warn;

use crate::error::SettingsError;

/// Persistence port for user preferences.
pub trait SettingsStore: Send {
    /// The blob stored under `key`, if any.
    fn get(&self, key: &str) -> Option<Value>;

    /// Store `value` under `key`, replacing what was there.
    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError>;
}

/// In-memory store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }
}

/// Store backed by a single JSON object on disk.
///
/// The file is read once on open; an unreadable or malformed file is
/// treated as empty. Every `set` rewrites the whole file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), SettingsError> {
        let serialized = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, serialized).map_err(|source| SettingsError::WriteFailed {
            path: self.path.clone(),
            source,
        })
    }
}

impl SettingsStore for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.entries.insert(key.to_string(), value);
        self.persist()
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, Value> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), error = %err, "settings file unreadable, using defaults");
            }
            return BTreeMap::new();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|err| {
        warn!(path = %path.display(), error = %err, "settings file malformed, using defaults");
        BTreeMap::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert!(store.get("alarm").is_none());
        store.set("alarm", json!({"mode": "slow"})).unwrap();
        assert_eq!(store.get("alarm"), Some(json!({"mode": "slow"})));
    }

    #[test]
    fn file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut store = FileStore::open(&path);
        store.set("indicator", json!({"shape": "square"})).unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(reopened.get("indicator"), Some(json!({"shape": "square"})));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn malformed_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let mut store = FileStore::open(&path);
        assert!(store.get("alarm").is_none());

        // Writing replaces the broken file with a valid one.
        store.set("alarm", json!({"mode": "fade"})).unwrap();
        assert_eq!(FileStore::open(&path).get("alarm"), Some(json!({"mode": "fade"})));
    }

    #[test]
    fn write_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("settings.json");

        let mut store = FileStore::open(&path);
        let err = store.set("alarm", json!({"mode": "fast"})).unwrap_err();
        assert!(matches!(err, SettingsError::WriteFailed { .. }));
    }
}
