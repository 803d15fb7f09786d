//! Typed cache with a time-to-live over a durable key-value store.
//!
//! One cache instance owns one key. Values are stored as JSON with a
//! `cachedAt` timestamp flattened alongside them. Reads treat unreadable,
//! unparsable and expired entries as misses without deleting them; writes
//! overwrite unconditionally. Storage errors are logged, never returned.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error_handling::CacheError;

/// Durable string storage addressed by key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Writes to a sibling temp file and renames it over the entry, so a
    /// concurrent reader sees either the old or the new content.
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;
        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{key}.json.{}.{seq}.tmp", std::process::id()));
        if let Err(e) = std::fs::write(&tmp, value) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        if let Err(e) = std::fs::rename(&tmp, self.path_for(key)) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }
}

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// In-process store, used by tests and embedders without a writable disk.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        ManualClock {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(|p| p.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(|p| p.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CachedEntry<T> {
    #[serde(flatten)]
    value: T,
    cached_at: DateTime<Utc>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CachedEntryRef<'a, T> {
    #[serde(flatten)]
    value: &'a T,
    cached_at: DateTime<Utc>,
}

/// A single typed value cached under a fixed key for `ttl`.
pub struct TtlCache<T> {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: String,
    ttl: Duration,
    _value: PhantomData<fn() -> T>,
}

impl<T> TtlCache<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        TtlCache {
            store,
            clock,
            key: key.into(),
            ttl,
            _value: PhantomData,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the cached value if present, parsable and not older than the TTL.
    pub fn read(&self) -> Option<T> {
        match self.load() {
            Ok(Some(entry)) if self.is_fresh(entry.cached_at) => Some(entry.value),
            Ok(Some(entry)) => {
                log::debug!(
                    "Cache entry '{}' from {} has expired",
                    self.key,
                    entry.cached_at.to_rfc3339()
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                log::warn!("Error retrieving cache entry '{}': {}", self.key, e);
                None
            }
        }
    }

    /// Stores `value` stamped with the current time, replacing any prior entry.
    pub fn write(&self, value: &T) {
        if let Err(e) = self.store_entry(value) {
            log::warn!("Error caching entry '{}': {}", self.key, e);
        }
    }

    fn load(&self) -> Result<Option<CachedEntry<T>>, CacheError> {
        let Some(raw) = self.store.get(&self.key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    fn store_entry(&self, value: &T) -> Result<(), CacheError> {
        let entry = CachedEntryRef {
            value,
            cached_at: self.clock.now(),
        };
        let raw = serde_json::to_string(&entry)?;
        self.store.set(&self.key, &raw)
    }

    fn is_fresh(&self, cached_at: DateTime<Utc>) -> bool {
        // A timestamp in the future (clock skew) converts to Err and counts as fresh
        match (self.clock.now() - cached_at).to_std() {
            Ok(age) => age <= self.ttl,
            Err(_) => true,
        }
    }
}
