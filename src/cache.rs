//! In-memory translation cache with a time-to-live.
//!
//! Entries are keyed by `all-<language>` (whole bundles) or
//! `<language>/<namespace>` (single namespaces). An entry is fresh while
//! `now - timestamp <= ttl`; stale entries are evicted lazily on lookup.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Source of the current time in epoch milliseconds.
pub trait Clock: Send + Sync + Debug {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Cache key for a language's whole bundle.
pub fn bundle_key(language: &str) -> String {
    format!("all-{language}")
}

/// Cache key for one namespace of a language.
pub fn namespace_key(language: &str, namespace: &str) -> String {
    format!("{language}/{namespace}")
}

/// Whether `key` belongs to `language`: the bare code, its bundle key, or one
/// of its namespace keys. `en-US/common` does not belong to `en`.
pub fn key_belongs_to(key: &str, language: &str) -> bool {
    key == language
        || key == bundle_key(language)
        || key
            .strip_prefix(language)
            .is_some_and(|rest| rest.starts_with('/'))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Value,

    /// Capture time, epoch milliseconds
    pub timestamp: i64,
}

#[derive(Debug)]
pub struct TranslationCache {
    entries: HashMap<String, CacheEntry>,
    ttl_ms: i64,
    clock: Arc<dyn Clock>,
}

impl TranslationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: HashMap::new(),
            ttl_ms: i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }

    fn is_fresh(&self, entry: &CacheEntry, now: i64) -> bool {
        now.saturating_sub(entry.timestamp) <= self.ttl_ms
    }

    /// Fresh data for `key`. A stale entry is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<Value> {
        let now = self.clock.now_millis();
        let entry = self.entries.get(key)?;
        if self.is_fresh(entry, now) {
            return Some(entry.data.clone());
        }

        debug!("Cache entry {} expired", key);
        self.entries.remove(key);
        None
    }

    /// Store `data` under `key`, stamped with the current time.
    pub fn insert(&mut self, key: String, data: Value) {
        let timestamp = self.clock.now_millis();
        self.entries.insert(key, CacheEntry { data, timestamp });
    }

    /// Remove every entry belonging to `language`. Returns how many went.
    pub fn evict_language(&mut self, language: &str) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, _| !key_belongs_to(key, language));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys currently held, fresh or not, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Serialize the whole map as `{<key>: {data, timestamp}}`.
    pub fn to_blob(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.entries)
    }

    /// Load entries from a persisted blob, keeping only those still fresh.
    /// Returns how many were restored.
    pub fn restore(&mut self, blob: &str) -> serde_json::Result<usize> {
        let persisted: HashMap<String, CacheEntry> = serde_json::from_str(blob)?;
        let now = self.clock.now_millis();

        let mut restored = 0;
        for (key, entry) in persisted {
            if self.is_fresh(&entry, now) {
                self.entries.insert(key, entry);
                restored += 1;
            }
        }
        Ok(restored)
    }
}
