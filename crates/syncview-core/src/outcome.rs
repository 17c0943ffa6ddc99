//! The unit of data produced by one successful fetch.

use serde::{Deserialize, Serialize};

/// Records returned by a fetch plus the server-side total (which may exceed
/// `items.len()` when the source pages its results).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchOutcome<T> {
    pub items: Vec<T>,
    pub total_count: usize,
}

impl<T> FetchOutcome<T> {
    pub fn new(items: Vec<T>, total_count: usize) -> Self {
        Self { items, total_count }
    }

    /// Outcome whose total is simply the number of items.
    pub fn from_items(items: Vec<T>) -> Self {
        let total_count = items.len();
        Self { items, total_count }
    }
}

impl<T> Default for FetchOutcome<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}
