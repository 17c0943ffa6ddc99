//! Cache binding for the keyed scheduler variant.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{now_ms, CacheEntry, CacheStore, PendingWrite};
use crate::outcome::FetchOutcome;

/// Type-erased view of a `CacheStore` bound to one key, so the scheduler
/// itself does not require `T: Serialize + DeserializeOwned`.
pub(super) trait OutcomeCache<T>: Send + Sync {
    fn key(&self) -> &str;
    fn load(&self) -> Option<CacheEntry<T>>;
    /// Serialize `outcome` now; the returned write is committed off the runtime.
    fn prepare(&self, outcome: &FetchOutcome<T>) -> Option<PendingWrite>;
}

pub(super) struct KeyedCache {
    pub(super) store: CacheStore,
    pub(super) key: String,
}

impl<T: Serialize + DeserializeOwned> OutcomeCache<T> for KeyedCache {
    fn key(&self) -> &str {
        &self.key
    }

    fn load(&self) -> Option<CacheEntry<T>> {
        self.store.read(&self.key)
    }

    fn prepare(&self, outcome: &FetchOutcome<T>) -> Option<PendingWrite> {
        self.store.prepare_write(&self.key, outcome, now_ms())
    }
}
