//! Scheduler handle and builder: lifecycle (`start`, `dispose`), manual
//! refresh, and access to the observable state.

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::auto::auto_refresh_loop;
use super::fetcher::Fetcher;
use super::keyed::{KeyedCache, OutcomeCache};
use super::options::SyncOptions;
use super::shared::{spawn_fetch, Shared};
use super::state::SyncState;
use super::visibility::Visibility;
use crate::cache::CacheStore;

/// Configures and starts a [`SyncScheduler`].
pub struct SyncSchedulerBuilder<T> {
    fetcher: Arc<dyn Fetcher<T>>,
    options: SyncOptions,
    visibility: Option<watch::Receiver<bool>>,
    cache: Option<Arc<dyn OutcomeCache<T>>>,
}

impl<T: Send + Sync + 'static> SyncSchedulerBuilder<T> {
    pub fn options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Gate the auto-refresh timer on `visibility`.
    pub fn visibility(mut self, visibility: &Visibility) -> Self {
        self.visibility = Some(visibility.subscribe());
        self
    }

    /// Start the scheduler: seed from the cache if one is bound, kick off the
    /// first fetch and, when enabled, the auto-refresh timer.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(self) -> SyncScheduler<T> {
        let shared = Arc::new(Shared::new(self.options, self.fetcher, self.cache));
        shared.seed_from_cache();
        spawn_fetch(&shared);
        let timer = if shared.options.enable_auto_refresh {
            Some(tokio::spawn(auto_refresh_loop(
                Arc::clone(&shared),
                self.visibility,
            )))
        } else {
            None
        };
        tracing::info!(
            auto_refresh = shared.options.enable_auto_refresh,
            interval = ?shared.options.refresh_interval,
            "sync scheduler started"
        );
        SyncScheduler {
            shared,
            timer: Mutex::new(timer),
        }
    }
}

impl<T> SyncSchedulerBuilder<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Bind a cache key: `start` seeds state from the cached entry (fresh or
    /// not) and every successful fetch writes through.
    pub fn cache(mut self, store: CacheStore, key: impl Into<String>) -> Self {
        self.cache = Some(Arc::new(KeyedCache {
            store,
            key: key.into(),
        }));
        self
    }
}

/// Keeps a `SyncState<T>` fresh by fetching through a caller-supplied
/// [`Fetcher`], retrying transient failures and refreshing on a timer.
///
/// Dropping the scheduler disposes it.
pub struct SyncScheduler<T: Send + Sync + 'static> {
    shared: Arc<Shared<T>>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + Sync + 'static> SyncScheduler<T> {
    pub fn builder(fetcher: impl Fetcher<T>) -> SyncSchedulerBuilder<T> {
        SyncSchedulerBuilder {
            fetcher: Arc::new(fetcher),
            options: SyncOptions::default(),
            visibility: None,
            cache: None,
        }
    }

    /// Start with `options` and no cache or visibility signal.
    pub fn start(fetcher: impl Fetcher<T>, options: SyncOptions) -> Self {
        Self::builder(fetcher).options(options).start()
    }

    pub fn options(&self) -> &SyncOptions {
        &self.shared.options
    }

    /// Fetch now and wait until this fetch settles (or is superseded).
    /// No-op after `dispose`.
    pub async fn refresh(&self) {
        if let Some(generation) = self.shared.begin_fetch() {
            self.shared.run_fetch(generation).await;
        }
    }

    /// Fire-and-forget variant of [`refresh`](Self::refresh).
    pub fn trigger_refresh(&self) -> Option<JoinHandle<()>> {
        spawn_fetch(&self.shared)
    }

    /// Derived on every call from `last_updated` and the refresh interval.
    pub fn is_stale(&self) -> bool {
        self.shared.is_stale()
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncState<T>> {
        self.shared.state().subscribe()
    }

    /// Cancel the timer and stop any in-flight fetch from touching state.
    pub fn dispose(&self) {
        if !self.shared.is_alive() {
            return;
        }
        self.shared.kill();
        let timer = self
            .timer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(timer) = timer {
            timer.abort();
        }
        tracing::info!("sync scheduler disposed");
    }

    pub fn is_disposed(&self) -> bool {
        !self.shared.is_alive()
    }
}

impl<T: Clone + Send + Sync + 'static> SyncScheduler<T> {
    /// Snapshot of the current state.
    pub fn state(&self) -> SyncState<T> {
        self.shared.state().borrow().clone()
    }
}

impl<T: Send + Sync + 'static> Drop for SyncScheduler<T> {
    fn drop(&mut self) {
        self.dispose();
    }
}
