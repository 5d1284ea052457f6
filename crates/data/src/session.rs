//! Session-scoped key/value storage for the roster payload.
//!
//! The in-memory store lives exactly as long as the front end that owns it.
//! The file store keeps one JSON object on disk so that separate CLI
//! invocations can share a session.

use mafia_core::{StoredSetup, SETUP_KEY};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt session file {path}: {source}")]
    CorruptFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("corrupt payload under {key}: {source}")]
    CorruptPayload {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub trait SessionStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StoreError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let body = fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        if body.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&body).map_err(|source| StoreError::CorruptFile {
            path: self.path.clone(),
            source,
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let body = serde_json::to_string_pretty(entries)?;
        fs::write(&self.path, body).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value);
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

pub fn save_setup<S: SessionStore + ?Sized>(
    store: &mut S,
    setup: &StoredSetup,
) -> Result<(), StoreError> {
    let body = serde_json::to_string(setup)?;
    log::debug!(
        "storing {} roles under {SETUP_KEY} ({} bytes)",
        setup.roles.len(),
        body.len()
    );
    store.set(SETUP_KEY, body)
}

/// `Ok(None)` when the session has no roster yet.
pub fn load_setup<S: SessionStore + ?Sized>(store: &S) -> Result<Option<StoredSetup>, StoreError> {
    let Some(body) = store.get(SETUP_KEY)? else {
        return Ok(None);
    };
    serde_json::from_str(&body)
        .map(Some)
        .map_err(|source| StoreError::CorruptPayload {
            key: SETUP_KEY.to_string(),
            source,
        })
}

pub fn clear_setup<S: SessionStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove(SETUP_KEY)
}
