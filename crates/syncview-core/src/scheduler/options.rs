//! Scheduler options and their mapping from the config file.

use std::time::Duration;

use crate::config::SyncviewConfig;
use crate::retry::{BackoffPolicy, RetryExecutor};

/// Options for a [`SyncScheduler`](super::SyncScheduler).
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOptions {
    /// Auto-refresh period and staleness threshold.
    pub refresh_interval: Duration,
    /// Run the periodic refresh timer.
    pub enable_auto_refresh: bool,
    /// Consecutive failed attempts before a fetch settles in error.
    pub max_retries: u32,
    /// Backoff base delay.
    pub retry_delay: Duration,
    /// Backoff cap.
    pub max_retry_delay: Duration,
    pub backoff_factor: f64,
    /// Age after which a cached entry no longer counts as fresh.
    pub cache_expiry: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_millis(30_000),
            enable_auto_refresh: false,
            max_retries: 3,
            retry_delay: Duration::from_millis(2_000),
            max_retry_delay: Duration::from_millis(30_000),
            backoff_factor: 2.0,
            cache_expiry: Duration::from_millis(300_000),
        }
    }
}

impl SyncOptions {
    pub fn from_config(cfg: &SyncviewConfig) -> Self {
        let retry = cfg.retry_or_default();
        let cache = cfg.cache_or_default();
        Self {
            refresh_interval: Duration::from_millis(cfg.refresh.interval_ms),
            enable_auto_refresh: cfg.refresh.auto_refresh,
            max_retries: retry.max_retries,
            retry_delay: Duration::from_millis(retry.base_delay_ms),
            max_retry_delay: Duration::from_millis(retry.max_delay_ms),
            backoff_factor: retry.factor,
            cache_expiry: Duration::from_millis(cache.expiry_ms),
        }
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::new(self.retry_delay, self.max_retry_delay, self.backoff_factor)
    }

    /// Executor running at most `max_retries` attempts (at least one).
    pub fn executor(&self) -> RetryExecutor {
        RetryExecutor::new(self.backoff(), self.max_retries)
    }
}
