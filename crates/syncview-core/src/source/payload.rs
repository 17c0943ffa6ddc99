//! Decoding of fetched bodies into a `FetchOutcome`.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::outcome::FetchOutcome;
use crate::retry::FetchError;

/// Accepts a bare JSON array (total = length) or an object
/// `{"items": [...], "totalCount": n}` (missing total = length).
///
/// Anything else is a non-retryable `schema_error`.
pub fn decode_outcome<T: DeserializeOwned>(bytes: &[u8]) -> Result<FetchOutcome<T>, FetchError> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| FetchError::schema(format!("response is not valid JSON: {e}")))?;
    match value {
        Value::Array(_) => {
            let items: Vec<T> = serde_json::from_value(value)
                .map_err(|e| FetchError::schema(format!("unexpected record shape: {e}")))?;
            Ok(FetchOutcome::from_items(items))
        }
        Value::Object(mut map) => {
            let items = map
                .remove("items")
                .ok_or_else(|| FetchError::schema("response object has no \"items\" array"))?;
            let items: Vec<T> = serde_json::from_value(items)
                .map_err(|e| FetchError::schema(format!("unexpected record shape: {e}")))?;
            let total_count = match map.get("totalCount") {
                None | Some(Value::Null) => items.len(),
                Some(v) => v
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| FetchError::schema(format!("invalid totalCount: {v}")))?,
            };
            Ok(FetchOutcome::new(items, total_count))
        }
        other => Err(FetchError::schema(format!(
            "expected a JSON array or object, got {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
