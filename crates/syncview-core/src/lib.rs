pub mod cache;
pub mod config;
pub mod filter;
pub mod logging;
pub mod outcome;
pub mod retry;
pub mod scheduler;
pub mod source;

pub use cache::{CacheEntry, CacheStore};
pub use filter::{FilterEngine, FilterState, Record};
pub use outcome::FetchOutcome;
pub use retry::{BackoffPolicy, FetchError, RetryEvent, RetryExecutor};
pub use scheduler::{SyncOptions, SyncPhase, SyncScheduler, SyncState, Visibility};
