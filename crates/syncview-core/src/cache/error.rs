//! Cache backend failures. Never leave the cache layer: `CacheStore` logs them
//! and degrades to a miss (reads) or a no-op (writes).

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io ({path}): {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cache codec: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}
