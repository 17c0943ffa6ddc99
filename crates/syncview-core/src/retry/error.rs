//! Structured fetch failure used for retry classification.

/// Error returned by a single fetch attempt.
///
/// Carries optional machine-readable metadata (`code`, HTTP `status`) next to
/// the human-readable message so the retry layer can classify the failure
/// without inspecting its origin.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FetchError {
    /// Backend or transport error code (e.g. "permission_denied", "42501", "timeout").
    pub code: Option<String>,
    /// HTTP status when the failure came from an HTTP response.
    pub status: Option<u16>,
    /// Human-readable message, surfaced as `SyncState::error`.
    pub message: String,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_code(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            status: None,
            message: message.into(),
        }
    }

    /// Failure derived from a non-2xx HTTP response.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self {
            code: None,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::with_code("timeout", message)
    }

    /// The response arrived but could not be decoded into the expected shape.
    pub fn schema(message: impl Into<String>) -> Self {
        Self::with_code("schema_error", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_the_message() {
        let e = FetchError::http(503, "service unavailable");
        assert_eq!(e.to_string(), "service unavailable");
        assert_eq!(e.status, Some(503));
        assert!(e.code.is_none());
    }
}
