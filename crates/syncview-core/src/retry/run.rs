//! Retry loop: run an async operation until success or the policy says stop.

use std::future::Future;
use std::time::Duration;

use super::classify;
use super::error::FetchError;
use super::policy::{BackoffPolicy, RetryDecision};

/// Retry progress reported to the `on_event` callback of [`RetryExecutor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryEvent {
    /// Retry number `retry` (1 = first retry) will start after `delay`.
    Backoff { retry: u32, delay: Duration },
    /// The wait is over and retry number `retry` is starting now.
    Attempt { retry: u32 },
}

/// Drives repeated invocation of a fallible async operation.
///
/// Waiting between attempts uses `tokio::time::sleep`, so only the calling
/// task is suspended.
#[derive(Debug, Clone, Copy)]
pub struct RetryExecutor {
    policy: BackoffPolicy,
    max_attempts: u32,
}

impl RetryExecutor {
    /// `max_attempts` counts every invocation, the first one included. Values
    /// below 1 are raised to 1.
    pub fn new(policy: BackoffPolicy, max_attempts: u32) -> Self {
        Self {
            policy,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn policy(&self) -> &BackoffPolicy {
        &self.policy
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, fails with a non-retryable error, or
    /// `max_attempts` consecutive failures have occurred.
    ///
    /// `on_event` sees a [`RetryEvent::Backoff`] right before each backoff
    /// wait and a [`RetryEvent::Attempt`] right before each delayed
    /// re-invocation.
    pub async fn execute<F, Fut, T, R>(&self, operation: F, on_event: R) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
        R: FnMut(RetryEvent),
    {
        self.execute_while(operation, on_event, || true).await
    }

    /// Like [`execute`](Self::execute), but `keep_going` is consulted before
    /// every backoff wait and again before every re-invocation. Once it
    /// returns false the loop stops and hands back the last error without
    /// invoking `operation` or `on_event` again.
    pub async fn execute_while<F, Fut, T, R, C>(
        &self,
        mut operation: F,
        mut on_event: R,
        keep_going: C,
    ) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
        R: FnMut(RetryEvent),
        C: Fn() -> bool,
    {
        let mut failures = 0u32;
        loop {
            let e = match operation().await {
                Ok(value) => {
                    if failures > 0 {
                        tracing::info!(retries = failures, "fetch succeeded after retrying");
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };
            failures += 1;
            let kind = classify::classify(&e);
            let delay = match self.policy.decide(failures, self.max_attempts, kind) {
                RetryDecision::NoRetry => {
                    tracing::debug!(attempts = failures, ?kind, error = %e, "giving up on fetch");
                    return Err(e);
                }
                RetryDecision::RetryAfter(delay) => delay,
            };
            if !keep_going() {
                tracing::debug!(attempts = failures, "retry abandoned before backoff");
                return Err(e);
            }
            tracing::warn!(
                attempt = failures,
                max_attempts = self.max_attempts,
                ?delay,
                error = %e,
                "fetch failed, retrying"
            );
            on_event(RetryEvent::Backoff {
                retry: failures,
                delay,
            });
            tokio::time::sleep(delay).await;
            if !keep_going() {
                tracing::debug!(attempts = failures, "retry abandoned after backoff");
                return Err(e);
            }
            on_event(RetryEvent::Attempt { retry: failures });
        }
    }
}

/// Convenience wrapper for callers that do not observe retry progress.
pub async fn run_with_retry<F, Fut, T>(
    policy: &BackoffPolicy,
    max_attempts: u32,
    operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    RetryExecutor::new(*policy, max_attempts)
        .execute(operation, |_| {})
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    fn fast_policy() -> BackoffPolicy {
        BackoffPolicy::new(Duration::from_millis(1000), Duration::from_millis(8000), 2.0)
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try_without_retry_callbacks() {
        let retries = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&retries);
        let result = RetryExecutor::new(fast_policy(), 3)
            .execute(|| async { Ok::<_, FetchError>(42) }, |ev| seen.lock().unwrap().push(ev))
            .await;
        assert_eq!(result.unwrap(), 42);
        assert!(retries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let retries = Arc::new(Mutex::new(Vec::new()));
        let c = Arc::clone(&calls);
        let seen = Arc::clone(&retries);
        let start = tokio::time::Instant::now();
        let result = RetryExecutor::new(fast_policy(), 5)
            .execute(
                || {
                    let c = Arc::clone(&c);
                    async move {
                        let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                        if n < 3 {
                            Err(FetchError::http(503, "unavailable"))
                        } else {
                            Ok(n)
                        }
                    }
                },
                |ev| seen.lock().unwrap().push(ev),
            )
            .await;
        assert_eq!(result.unwrap(), 3);
        assert_eq!(
            *retries.lock().unwrap(),
            vec![
                RetryEvent::Backoff {
                    retry: 1,
                    delay: Duration::from_millis(1000)
                },
                RetryEvent::Attempt { retry: 1 },
                RetryEvent::Backoff {
                    retry: 2,
                    delay: Duration::from_millis(2000)
                },
                RetryEvent::Attempt { retry: 2 },
            ]
        );
        // 1000ms + 2000ms of backoff
        assert!(start.elapsed() >= Duration::from_millis(3000));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_stops_after_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = run_with_retry(&fast_policy(), 10, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(FetchError::with_code("permission_denied", "no access"))
            }
        })
        .await;
        assert_eq!(result.unwrap_err().message, "no access");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = run_with_retry(&fast_policy(), 3, || {
            let c = Arc::clone(&c);
            async move {
                let n = c.fetch_add(1, Ordering::SeqCst) + 1;
                Err(FetchError::timeout(format!("timeout #{n}")))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(result.unwrap_err().message, "timeout #3");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_caller_loses_interest_during_backoff() {
        let calls = Arc::new(AtomicU32::new(0));
        let wanted = Arc::new(AtomicBool::new(true));
        let c = Arc::clone(&calls);
        let w = Arc::clone(&wanted);
        let events = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&events);
        let result: Result<(), _> = RetryExecutor::new(fast_policy(), 5)
            .execute_while(
                || {
                    let c = Arc::clone(&c);
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err(FetchError::http(503, "unavailable"))
                    }
                },
                |ev| {
                    seen.lock().unwrap().push(ev);
                    // Caller goes away while the first backoff is pending.
                    w.store(false, Ordering::SeqCst);
                },
                || wanted.load(Ordering::SeqCst),
            )
            .await;
        assert_eq!(result.unwrap_err().message, "unavailable");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(events.lock().unwrap().len(), 1, "no Attempt event after abandoning");
    }

    #[tokio::test(start_paused = true)]
    async fn stops_before_backoff_when_already_unwanted() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let start = tokio::time::Instant::now();
        let result: Result<(), _> = RetryExecutor::new(fast_policy(), 5)
            .execute_while(
                || {
                    let c = Arc::clone(&c);
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err(FetchError::timeout("timeout"))
                    }
                },
                |_| panic!("no retry events expected"),
                || false,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[test]
    fn zero_max_attempts_is_raised_to_one() {
        assert_eq!(RetryExecutor::new(fast_policy(), 0).max_attempts(), 1);
    }
}
