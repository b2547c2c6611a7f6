//! Opaque key-value persistence.
//!
//! The gate and the refresh service only ever need string get/set/remove,
//! so persistence hides behind [`KvStore`]. Production uses the JSON file
//! implementation; tests use [`MemoryStore`].

use crate::models::StoredAccount;
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::fs;
use std::sync::Mutex;
use thiserror::Error;

/// Store key holding the serialized account list.
pub const ACCOUNTS_KEY: &str = "accounts";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// String key-value persistence boundary.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// File-backed store keeping the whole map as one JSON document.
///
/// Every mutation rewrites the file; the data volume (a handful of keys,
/// one of them the account list) makes that the simplest correct option.
#[derive(Debug)]
pub struct JsonFileStore {
    path: Utf8PathBuf,
    cache: Mutex<IndexMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating parent directories and loading
    /// any existing content.
    pub fn open<P: AsRef<Utf8Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let cache = if path.exists() {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            IndexMap::new()
        };

        Ok(Self {
            path,
            cache: Mutex::new(cache),
        })
    }

    fn persist(&self, cache: &IndexMap<String, String>) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KvStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let cache = self.cache.lock().unwrap();
        Ok(cache.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.lock().unwrap();
        cache.insert(key.to_string(), value.to_string());
        self.persist(&cache)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let mut cache = self.cache.lock().unwrap();
        if cache.shift_remove(key).is_some() {
            self.persist(&cache)?;
        }
        Ok(())
    }
}

/// In-memory store for tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<IndexMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.lock().unwrap().shift_remove(key);
        Ok(())
    }
}

/// Load the persisted account list, empty when nothing was saved yet.
pub fn load_accounts(store: &dyn KvStore) -> Result<Vec<StoredAccount>, StoreError> {
    match store.get(ACCOUNTS_KEY)? {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(Vec::new()),
    }
}

/// Persist the full account list.
pub fn save_accounts(store: &dyn KvStore, accounts: &[StoredAccount]) -> Result<(), StoreError> {
    let json = serde_json::to_string(accounts)?;
    store.set(ACCOUNTS_KEY, &json)
}
