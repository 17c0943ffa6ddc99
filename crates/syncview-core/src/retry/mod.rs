//! Retry and backoff policy.
//!
//! This module encapsulates failure classification (auth, permission,
//! malformed request versus transient timeouts, throttling and server errors)
//! and exponential backoff so that the scheduler and any direct callers share
//! a consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_code, classify_http_status, is_retryable};
pub use error::FetchError;
pub use policy::{delay_for, BackoffPolicy, ErrorKind, RetryDecision};
pub use run::{run_with_retry, RetryEvent, RetryExecutor};
