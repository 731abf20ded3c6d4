//! Key-value persistence boundary.
//!
//! The tracker persists through a minimal string get/put contract so the
//! host decides what is actually durable: shared preferences, a config
//! directory, a database column. Writes are apply-and-forget; once
//! `put_string` returns, the value must survive a process restart, but no
//! transactional guarantees exist beyond write-then-read-back.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{Result, StorageError};

pub trait KeyValueStore: Send + Sync {
    /// Read a value, falling back to `default` when the key is absent.
    fn get_string(&self, key: &str, default: &str) -> Result<String>;

    /// Write a value durably.
    fn put_string(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get_string(&self, key: &str, default: &str) -> Result<String> {
        (**self).get_string(key, default)
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        (**self).put_string(key, value)
    }
}

/// In-memory store for tests and for hosts that bring their own durability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str, default: &str) -> Result<String> {
        let values = self
            .values
            .lock()
            .map_err(|_| StorageError::Backend("store mutex poisoned".into()))?;
        Ok(values
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StorageError::Backend("store mutex poisoned".into()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Single-file store: one JSON object per file, rewritten on every put.
///
/// Reads tolerate a missing file (empty store); a corrupt file surfaces as
/// a serialization error so callers can decide how to degrade.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read_map(&self) -> Result<HashMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(text) if text.trim().is_empty() => Ok(HashMap::new()),
            Ok(text) => Ok(serde_json::from_str(&text)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStore for FileStore {
    fn get_string(&self, key: &str, default: &str) -> Result<String> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Backend("store mutex poisoned".into()))?;
        Ok(self
            .read_map()?
            .get(key)
            .cloned()
            .unwrap_or_else(|| default.to_string()))
    }

    fn put_string(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| StorageError::Backend("store mutex poisoned".into()))?;
        let mut map = self.read_map()?;
        map.insert(key.to_string(), value.to_string());
        fs::write(&self.path, serde_json::to_string(&map)?)?;
        Ok(())
    }
}
