//! String-keyed key-value store.
//!
//! The engine only needs get/set/remove over string keys and values. The
//! production store is RocksDB; tests use the in-memory implementation.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use rocksdb::{Options, DB};
use tracing::{debug, info};

use crate::error::StorageError;

/// Narrow string-keyed storage contract.
///
/// No atomicity is guaranteed across keys. Implementations must be
/// thread-safe; the engine shares one store across its caches.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. Absent keys return `Ok(None)`.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, overwriting any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// RocksDB-backed store.
pub struct RocksStore {
    db: DB,
}

impl RocksStore {
    /// Open the store at the given path, creating it if necessary.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        info!("Opening store at {:?}", path);

        let mut opts = Options::default();
        opts.create_if_missing(true);

        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }
}

impl KeyValueStore for RocksStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => {
                let value = String::from_utf8(bytes)
                    .map_err(|_| StorageError::Encoding(key.to_string()))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(key, bytes = value.len(), "Storing value");
        self.db.put(key.as_bytes(), value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.db.delete(key.as_bytes())?;
        Ok(())
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        entries.remove(key);
        Ok(())
    }
}
