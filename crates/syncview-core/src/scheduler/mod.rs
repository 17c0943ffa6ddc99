//! Polling / retry / cache scheduler.
//!
//! Decides when to call the caller-supplied fetch operation (start-up, manual
//! refresh, timer tick, visibility restore), recovers from transient failures
//! through [`RetryExecutor`](crate::retry::RetryExecutor), writes results
//! through to an optional [`CacheStore`](crate::cache::CacheStore), and
//! publishes a [`SyncState`] over a `tokio::sync::watch` channel.
//!
//! State machine: `Idle → Fetching → (Retrying → Fetching)* → Ready | Failed`,
//! and any settled state goes back to `Fetching` on the next trigger. A failed
//! fetch keeps the previous items so consumers can show last-known-good data
//! next to the error.

mod auto;
mod fetcher;
mod handle;
mod keyed;
mod options;
mod shared;
mod state;
mod visibility;

pub use fetcher::{FetchFuture, Fetcher};
pub use handle::{SyncScheduler, SyncSchedulerBuilder};
pub use options::SyncOptions;
pub use state::{SyncPhase, SyncState};
pub use visibility::Visibility;
