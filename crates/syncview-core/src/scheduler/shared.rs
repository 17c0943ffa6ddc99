//! State shared between the scheduler handle, its timer task and in-flight fetches.
//!
//! Every mutation is gated on the liveness flag and, for fetch results, on the
//! generation token the fetch was started with. A result whose generation is
//! no longer current was superseded by a newer fetch and is dropped.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::fetcher::Fetcher;
use super::keyed::OutcomeCache;
use super::options::SyncOptions;
use super::state::{SyncPhase, SyncState};
use crate::outcome::FetchOutcome;
use crate::retry::{is_retryable, FetchError, RetryEvent};

pub(super) struct Shared<T> {
    pub(super) options: SyncOptions,
    fetcher: Arc<dyn Fetcher<T>>,
    state: watch::Sender<SyncState<T>>,
    generation: AtomicU64,
    alive: AtomicBool,
    cache: Option<Arc<dyn OutcomeCache<T>>>,
}

impl<T: Send + Sync + 'static> Shared<T> {
    pub(super) fn new(
        options: SyncOptions,
        fetcher: Arc<dyn Fetcher<T>>,
        cache: Option<Arc<dyn OutcomeCache<T>>>,
    ) -> Self {
        let (state, _rx) = watch::channel(SyncState::default());
        Self {
            options,
            fetcher,
            state,
            generation: AtomicU64::new(0),
            alive: AtomicBool::new(true),
            cache,
        }
    }

    pub(super) fn state(&self) -> &watch::Sender<SyncState<T>> {
        &self.state
    }

    pub(super) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    pub(super) fn kill(&self) {
        self.alive.store(false, Ordering::SeqCst);
    }

    fn is_current(&self, generation: u64) -> bool {
        self.is_alive() && self.generation.load(Ordering::SeqCst) == generation
    }

    pub(super) fn is_stale(&self) -> bool {
        self.state.borrow().is_stale(self.options.refresh_interval)
    }

    pub(super) fn last_updated(&self) -> Option<Instant> {
        self.state.borrow().last_updated
    }

    /// Seed items from the cache before the first network result arrives.
    pub(super) fn seed_from_cache(&self) {
        let Some(cache) = &self.cache else {
            return;
        };
        let Some(entry) = cache.load() else {
            tracing::debug!(key = cache.key(), "no cached entry");
            return;
        };
        let fresh = crate::cache::is_fresh(&entry, self.options.cache_expiry);
        tracing::debug!(
            key = cache.key(),
            fresh,
            items = entry.payload.items.len(),
            "seeding state from cache"
        );
        self.state.send_if_modified(|s| {
            if !self.is_alive() {
                return false;
            }
            s.items = entry.payload.items;
            s.total_count = entry.payload.total_count;
            true
        });
    }

    /// Idle/Settled → Fetching. Returns the new generation, or `None` once disposed.
    pub(super) fn begin_fetch(&self) -> Option<u64> {
        if !self.is_alive() {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = self.state.send_if_modified(|s| {
            if !self.is_current(generation) {
                return false;
            }
            s.loading = true;
            s.retry_count = 0;
            s.phase = SyncPhase::Fetching;
            true
        });
        if started {
            tracing::debug!(generation, "fetch started");
        }
        Some(generation)
    }

    /// Fetching → Retrying before a backoff wait, Retrying → Fetching once the
    /// delayed re-attempt starts. `retry_count` is the in-flight retry number.
    fn track_retry(&self, generation: u64, event: RetryEvent) {
        let (attempt, phase) = match event {
            RetryEvent::Backoff { retry, .. } => (retry, SyncPhase::Retrying),
            RetryEvent::Attempt { retry } => (retry, SyncPhase::Fetching),
        };
        self.state.send_if_modified(|s| {
            if !self.is_current(generation) {
                return false;
            }
            s.retry_count = attempt;
            s.phase = phase;
            true
        });
    }

    fn apply_success(&self, generation: u64, outcome: FetchOutcome<T>) -> bool {
        self.state.send_if_modified(|s| {
            if !self.is_current(generation) {
                return false;
            }
            s.items = outcome.items;
            s.total_count = outcome.total_count;
            s.last_updated = Some(Instant::now());
            s.retry_count = 0;
            s.error = None;
            s.loading = false;
            s.phase = SyncPhase::Ready;
            true
        })
    }

    /// Settle as Failed. A retryable final error means the budget ran out, so
    /// `retry_count` is pinned at `max_retries`; a non-retryable one resets it
    /// to 0 even if earlier attempts in the same fetch were retried.
    fn apply_failure(&self, generation: u64, err: &FetchError) -> bool {
        let retry_count = if is_retryable(err) {
            self.options.max_retries
        } else {
            0
        };
        self.state.send_if_modified(|s| {
            if !self.is_current(generation) {
                return false;
            }
            s.error = Some(if err.message.is_empty() {
                "fetch failed".to_string()
            } else {
                err.message.clone()
            });
            s.retry_count = retry_count;
            s.loading = false;
            s.phase = SyncPhase::Failed;
            true
        })
    }

    /// Run one logical fetch (with retries) for `generation` and settle it.
    ///
    /// Retrying stops as soon as the scheduler is disposed or a newer fetch
    /// takes over.
    pub(super) async fn run_fetch(&self, generation: u64) {
        let executor = self.options.executor();
        let result = executor
            .execute_while(
                || self.fetcher.fetch(),
                |event| self.track_retry(generation, event),
                || self.is_current(generation),
            )
            .await;

        if !self.is_current(generation) {
            tracing::debug!(generation, "discarding superseded or late fetch result");
            return;
        }

        match result {
            Ok(outcome) => {
                if let Some(write) = self.cache.as_ref().and_then(|c| c.prepare(&outcome)) {
                    // File backends do blocking I/O.
                    if let Err(e) = tokio::task::spawn_blocking(move || write.commit()).await {
                        tracing::warn!(generation, error = %e, "cache write task failed");
                    }
                }
                let count = outcome.items.len();
                if self.apply_success(generation, outcome) {
                    tracing::debug!(generation, items = count, "fetch settled");
                }
            }
            Err(e) => {
                if self.apply_failure(generation, &e) {
                    tracing::warn!(generation, error = %e, "fetch failed terminally");
                }
            }
        }
    }
}

/// Begin a fetch synchronously and run it on a spawned task.
pub(super) fn spawn_fetch<T: Send + Sync + 'static>(shared: &Arc<Shared<T>>) -> Option<JoinHandle<()>> {
    let generation = shared.begin_fetch()?;
    let shared = Arc::clone(shared);
    Some(tokio::spawn(async move {
        shared.run_fetch(generation).await;
    }))
}
