//! Observable synchronization state.

use std::time::Duration;

use tokio::time::Instant;

/// Position in the scheduler's state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncPhase {
    /// Constructed, nothing requested yet.
    #[default]
    Idle,
    /// A fetch attempt is in flight.
    Fetching,
    /// Waiting out a backoff delay before the next attempt.
    Retrying,
    /// Last fetch succeeded.
    Ready,
    /// Last fetch failed terminally; `error` is set.
    Failed,
}

/// Snapshot of what consumers render: data, loading flag, error and retry progress.
#[derive(Debug, Clone)]
pub struct SyncState<T> {
    pub items: Vec<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub total_count: usize,
    /// Completion time of the last successful fetch.
    pub last_updated: Option<Instant>,
    pub retry_count: u32,
    pub phase: SyncPhase,
}

impl<T> Default for SyncState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            total_count: 0,
            last_updated: None,
            retry_count: 0,
            phase: SyncPhase::Idle,
        }
    }
}

impl<T> SyncState<T> {
    /// True when there has been no successful fetch yet or the last one is at
    /// least `refresh_interval` old.
    pub fn is_stale(&self, refresh_interval: Duration) -> bool {
        self.is_stale_at(refresh_interval, Instant::now())
    }

    pub fn is_stale_at(&self, refresh_interval: Duration, now: Instant) -> bool {
        match self.last_updated {
            None => true,
            Some(at) => now.saturating_duration_since(at) >= refresh_interval,
        }
    }
}
