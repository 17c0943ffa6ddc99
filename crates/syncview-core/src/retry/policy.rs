use std::time::Duration;

/// High-level classification of a fetch failure for retry purposes.
///
/// Callers map HTTP statuses, backend error codes and transport errors into
/// these kinds; see [`classify`](super::classify).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read or backend statement timeout).
    Timeout,
    /// Server asked us to slow down (e.g. 429).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// Server-side failure (5xx).
    Server(u16),
    /// Missing or invalid credentials.
    Unauthenticated,
    /// Authenticated but not allowed (permission denied, 403).
    PermissionDenied,
    /// Malformed request or schema mismatch; retrying cannot help.
    InvalidRequest,
    /// Anything unrecognised. Retried.
    Other,
}

impl ErrorKind {
    pub fn is_retryable(self) -> bool {
        !matches!(
            self,
            ErrorKind::Unauthenticated | ErrorKind::PermissionDenied | ErrorKind::InvalidRequest
        )
    }
}

/// Decision returned by the backoff policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff: `min(base * factor^(attempt-1), cap)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single delay.
    pub max_delay: Duration,
    /// Growth factor between consecutive retries.
    pub factor: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(2000),
            max_delay: Duration::from_secs(30),
            factor: 2.0,
        }
    }
}

/// Backoff delay before retry number `attempt`.
///
/// `attempt` is the retry index: 1 = first retry. Attempt 0 is the initial try
/// and is never delayed.
pub fn delay_for(attempt: u32, base: Duration, cap: Duration, factor: f64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }
    let exp = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
    let scale = factor.powi(exp);
    if !scale.is_finite() || scale < 0.0 || base.as_secs_f64() * scale >= cap.as_secs_f64() {
        return cap;
    }
    base.mul_f64(scale)
}

impl BackoffPolicy {
    pub fn new(base_delay: Duration, max_delay: Duration, factor: f64) -> Self {
        Self {
            base_delay,
            max_delay,
            factor,
        }
    }

    pub fn delay_for(&self, attempt: u32) -> Duration {
        delay_for(attempt, self.base_delay, self.max_delay, self.factor)
    }

    /// Decide what to do after `failures` consecutive failed attempts.
    ///
    /// Returns `NoRetry` for non-retryable kinds or once `failures` reaches
    /// `max_attempts`; otherwise the delay before retry number `failures`.
    pub fn decide(&self, failures: u32, max_attempts: u32, kind: ErrorKind) -> RetryDecision {
        if !kind.is_retryable() || failures >= max_attempts {
            return RetryDecision::NoRetry;
        }
        RetryDecision::RetryAfter(self.delay_for(failures))
    }
}
