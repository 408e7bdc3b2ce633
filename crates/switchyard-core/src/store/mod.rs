//! Session-lifetime key/value storage.
//!
//! [`SessionStore`] is the process-wide register the rest of the crate reads
//! selections and credentials from. Two instances are normally alive at once:
//! a *session* store (cleared when the process exits unless persisted) and a
//! *local* store holding long-lived values such as `auth_data` or `language`.
//!
//! Writes are last-writer-wins; there is no transactional coupling between
//! keys.

pub mod selection_cache;

pub use selection_cache::{CachedSelection, SelectionCache};
pub(crate) use selection_cache::now_ms;

use dashmap::DashMap;
use std::{collections::BTreeMap, path::Path};
use thiserror::Error;

/// Session key holding the chosen API base URL as a plain string.
pub const API_AVAILABLE_URL_KEY: &str = "api_available_url";

/// Session key holding the time-boxed `{url, timestamp}` JSON blob.
pub const API_CACHE_DATA_KEY: &str = "api_cache_data";

/// Local key holding the primary auth token.
pub const AUTH_DATA_KEY: &str = "auth_data";

/// Local key holding the site-scoped backup copy of the auth cookie.
pub const COOKIE_AUTH_BACKUP_KEY: &str = "cookie_auth_data";

/// Local key holding the user's language preference.
pub const LANGUAGE_KEY: &str = "language";

/// Errors raised while loading or persisting a store snapshot.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store snapshot is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Concurrent string key/value store.
///
/// Backed by a [`DashMap`], so reads never block each other and a write only
/// contends with readers of the same shard.
#[derive(Debug, Default)]
pub struct SessionStore {
    entries: DashMap<String, String>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Removes `key`, returning the previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.entries.remove(key).map(|(_, value)| value)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns a sorted snapshot of every entry.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.entries.iter().map(|entry| (entry.key().clone(), entry.value().clone())).collect()
    }

    /// Loads a store from a JSON object file. A missing file yields an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file exists but cannot be read, or
    /// [`StoreError::Serde`] if it is not a JSON object of strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no session snapshot, starting empty");
            return Ok(Self::new());
        }

        let raw = std::fs::read_to_string(path)?;
        let entries: BTreeMap<String, String> = serde_json::from_str(&raw)?;
        let store = Self::new();
        for (key, value) in entries {
            store.set(key, value);
        }

        tracing::debug!(path = %path.display(), entries = store.len(), "session snapshot loaded");
        Ok(store)
    }

    /// Writes the current entries to `path` as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file or its parent directory cannot be written.
    pub fn persist(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let raw = serde_json::to_string_pretty(&self.snapshot())?;
        std::fs::write(path, raw)?;
        tracing::debug!(path = %path.display(), entries = self.len(), "session snapshot written");
        Ok(())
    }
}
