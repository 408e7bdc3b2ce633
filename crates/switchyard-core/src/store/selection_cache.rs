use serde::{Deserialize, Serialize};
use std::{sync::Arc, time::Duration};

use super::SessionStore;

/// A committed selection as stored in the session store.
///
/// Serialized as `{"url": "...", "timestamp": <epoch ms>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSelection {
    pub url: String,
    /// Unix epoch milliseconds at commit time.
    pub timestamp: i64,
}

impl CachedSelection {
    #[must_use]
    pub fn new(url: impl Into<String>, timestamp: i64) -> Self {
        Self { url: url.into(), timestamp }
    }

    /// Age of the entry relative to `now_ms`. Entries stamped in the future count as age zero.
    #[must_use]
    pub fn age(&self, now_ms: i64) -> Duration {
        let age_ms = now_ms.saturating_sub(self.timestamp).max(0);
        Duration::from_millis(u64::try_from(age_ms).unwrap_or(0))
    }
}

/// Time-boxed view over one key of a [`SessionStore`].
///
/// The cache owns its validity window explicitly: `ttl = Some(window)` expires
/// entries once their age reaches the window, `ttl = None` keeps them for the
/// whole session. Expired entries are removed on read.
#[derive(Debug, Clone)]
pub struct SelectionCache {
    store: Arc<SessionStore>,
    key: String,
    ttl: Option<Duration>,
}

impl SelectionCache {
    #[must_use]
    pub fn new(store: Arc<SessionStore>, key: impl Into<String>, ttl: Option<Duration>) -> Self {
        Self { store, key: key.into(), ttl }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }

    #[must_use]
    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Returns the cached selection if present and still inside the validity window.
    #[must_use]
    pub fn read(&self) -> Option<CachedSelection> {
        self.read_at(now_ms())
    }

    /// Same as [`read`](Self::read) against an explicit clock reading.
    #[must_use]
    pub fn read_at(&self, now_ms: i64) -> Option<CachedSelection> {
        let raw = self.store.get(&self.key)?;

        let selection: CachedSelection = match serde_json::from_str(&raw) {
            Ok(selection) => selection,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "discarding malformed cached selection");
                self.store.remove(&self.key);
                return None;
            }
        };

        if let Some(ttl) = self.ttl {
            let age = selection.age(now_ms);
            if age >= ttl {
                tracing::debug!(
                    key = %self.key,
                    url = %selection.url,
                    age_ms = age.as_millis(),
                    ttl_ms = ttl.as_millis(),
                    "cached selection expired"
                );
                self.store.remove(&self.key);
                return None;
            }
        }

        Some(selection)
    }

    /// Writes `url` as the current selection, stamped with the current time.
    pub fn commit(&self, url: &str) -> CachedSelection {
        self.commit_at(url, now_ms())
    }

    pub fn commit_at(&self, url: &str, now_ms: i64) -> CachedSelection {
        let selection = CachedSelection::new(url, now_ms);
        match serde_json::to_string(&selection) {
            Ok(raw) => {
                self.store.set(self.key.clone(), raw);
                tracing::debug!(key = %self.key, url = %url, "selection committed");
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "failed to serialize selection");
            }
        }
        selection
    }

    /// Drops the cached selection so the next read misses.
    pub fn invalidate(&self) {
        if self.store.remove(&self.key).is_some() {
            tracing::debug!(key = %self.key, "cached selection invalidated");
        }
    }
}

pub(crate) fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
