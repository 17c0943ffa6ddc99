//! Classify fetch failures (HTTP status, backend codes, messages) into retry kinds.

use crate::retry::error::FetchError;
use crate::retry::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(status: u16) -> ErrorKind {
    match status {
        401 => ErrorKind::Unauthenticated,
        403 => ErrorKind::PermissionDenied,
        400 | 405 | 406 | 415 | 422 => ErrorKind::InvalidRequest,
        408 | 504 => ErrorKind::Timeout,
        429 => ErrorKind::Throttled,
        500..=599 => ErrorKind::Server(status),
        _ => ErrorKind::Other,
    }
}

/// Classify a backend/transport error code. Matching is case-insensitive.
///
/// Postgres SQLSTATE codes are recognised because score backends commonly sit
/// behind a Postgres RPC layer: `42501` insufficient privilege, `28xxx`
/// invalid authorization, `22xxx` data exceptions and `42xxx` syntax or
/// undefined-object errors.
pub fn classify_code(code: &str) -> Option<ErrorKind> {
    let code = code.trim().to_ascii_lowercase();
    let kind = match code.as_str() {
        "unauthenticated" | "unauthorized" | "invalid_token" | "token_expired"
        | "jwt_expired" | "auth_required" => ErrorKind::Unauthenticated,
        "permission_denied" | "forbidden" | "access_denied" | "42501" => {
            ErrorKind::PermissionDenied
        }
        "invalid_request" | "bad_request" | "schema_error" | "invalid_argument" => {
            ErrorKind::InvalidRequest
        }
        "timeout" | "deadline_exceeded" | "57014" => ErrorKind::Timeout,
        "throttled" | "rate_limited" | "resource_exhausted" => ErrorKind::Throttled,
        "connection" | "unavailable" | "network" | "io" => ErrorKind::Connection,
        c if c.starts_with("28") && c.len() == 5 => ErrorKind::Unauthenticated,
        c if (c.starts_with("22") || c.starts_with("42")) && c.len() == 5 => {
            ErrorKind::InvalidRequest
        }
        _ => return None,
    };
    Some(kind)
}

/// Last-resort classification from the message text.
fn classify_message(message: &str) -> ErrorKind {
    let m = message.to_ascii_lowercase();
    if m.contains("permission denied") || m.contains("forbidden") || m.contains("not authorized")
    {
        ErrorKind::PermissionDenied
    } else if m.contains("unauthorized")
        || m.contains("unauthenticated")
        || m.contains("jwt expired")
        || m.contains("invalid token")
    {
        ErrorKind::Unauthenticated
    } else if m.contains("invalid input syntax")
        || m.contains("malformed")
        || m.contains("schema")
        || m.contains("does not exist")
    {
        ErrorKind::InvalidRequest
    } else if m.contains("timed out") || m.contains("timeout") {
        ErrorKind::Timeout
    } else if m.contains("connection") || m.contains("network") {
        ErrorKind::Connection
    } else {
        ErrorKind::Other
    }
}

/// Classify a fetch failure into an ErrorKind.
///
/// The code wins over the status, the status wins over the message.
pub fn classify(e: &FetchError) -> ErrorKind {
    if let Some(kind) = e.code.as_deref().and_then(classify_code) {
        return kind;
    }
    if let Some(status) = e.status {
        return classify_http_status(status);
    }
    classify_message(&e.message)
}

/// True unless the failure signals an auth, permission or malformed-request problem.
pub fn is_retryable(e: &FetchError) -> bool {
    classify(e).is_retryable()
}
