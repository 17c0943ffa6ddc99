//! Last-known-good result cache.
//!
//! Caching is an optimisation, never a correctness requirement: every backend
//! failure is logged and turned into a miss (reads) or dropped (writes).
//! Expiry is advisory; stale entries are still returned and callers ask
//! [`is_fresh`] whether to trust them.

mod backend;
mod error;

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::outcome::FetchOutcome;

pub use backend::{CacheBackend, FileBackend, MemoryBackend};
pub use error::CacheError;

/// A cached payload and the wall-clock moment it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub payload: FetchOutcome<T>,
    /// Milliseconds since the UNIX epoch.
    pub timestamp: u64,
}

impl<T> CacheEntry<T> {
    /// Age of the entry relative to `now_ms`; zero if the clock went backwards.
    pub fn age_at(&self, now_ms: u64) -> Duration {
        Duration::from_millis(now_ms.saturating_sub(self.timestamp))
    }
}

#[derive(Serialize)]
struct EntryRef<'a, T> {
    payload: &'a FetchOutcome<T>,
    timestamp: u64,
}

/// Current wall-clock time in milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// `now - entry.timestamp < expiry`.
pub fn is_fresh<T>(entry: &CacheEntry<T>, expiry: Duration) -> bool {
    is_fresh_at(entry, expiry, now_ms())
}

pub fn is_fresh_at<T>(entry: &CacheEntry<T>, expiry: Duration, now_ms: u64) -> bool {
    entry.age_at(now_ms) < expiry
}

/// An encoded entry waiting to be handed to the backend.
///
/// `commit` may block on file I/O; async callers run it via
/// `tokio::task::spawn_blocking`.
pub struct PendingWrite {
    backend: Arc<dyn CacheBackend>,
    key: String,
    bytes: Vec<u8>,
}

impl PendingWrite {
    pub fn commit(self) {
        let key = self.key.as_str();
        match self.backend.write(key, &self.bytes) {
            Ok(()) => tracing::debug!(key, bytes = self.bytes.len(), "cache entry written"),
            Err(e) => tracing::warn!(key, error = %e, "cache write failed"),
        }
    }
}

/// Typed JSON cache over a [`CacheBackend`]. Cheap to clone.
#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn CacheBackend>,
}

impl std::fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

impl CacheStore {
    pub fn new(backend: impl CacheBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// File-backed store under the XDG cache directory.
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(FileBackend::new(FileBackend::default_dir()?)))
    }

    /// File-backed store in the configured directory, or the default one.
    pub fn from_config(cfg: &crate::config::CacheConfig) -> anyhow::Result<Self> {
        match &cfg.dir {
            Some(dir) => Ok(Self::new(FileBackend::new(dir.clone()))),
            None => Self::open_default(),
        }
    }

    /// Read the entry for `key`. Missing, unreadable and undecodable entries
    /// are all reported as `None`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CacheEntry<T>> {
        let bytes = match self.backend.read(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(key, error = %e, "cache read failed, treating as miss");
                return None;
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key, error = %e, "corrupt cache entry, treating as miss");
                None
            }
        }
    }

    /// Replace the entry for `key` with `payload`, timestamped now.
    pub fn write<T: Serialize>(&self, key: &str, payload: &FetchOutcome<T>) {
        self.write_at(key, payload, now_ms());
    }

    pub(crate) fn write_at<T: Serialize>(&self, key: &str, payload: &FetchOutcome<T>, timestamp: u64) {
        if let Some(write) = self.prepare_write(key, payload, timestamp) {
            write.commit();
        }
    }

    /// Encode the entry for `key` without touching the backend. `None` when
    /// the payload does not serialize.
    pub fn prepare_write<T: Serialize>(
        &self,
        key: &str,
        payload: &FetchOutcome<T>,
        timestamp: u64,
    ) -> Option<PendingWrite> {
        match serde_json::to_vec(&EntryRef { payload, timestamp }) {
            Ok(bytes) => Some(PendingWrite {
                backend: Arc::clone(&self.backend),
                key: key.to_string(),
                bytes,
            }),
            Err(e) => {
                let e = CacheError::from(e);
                tracing::warn!(key, error = %e, "cache write skipped");
                None
            }
        }
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove(key) {
            tracing::warn!(key, error = %e, "cache remove failed");
        }
    }
}
