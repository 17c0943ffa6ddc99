use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use super::payload::decode_outcome;
use crate::outcome::FetchOutcome;
use crate::retry::FetchError;
use crate::scheduler::{FetchFuture, Fetcher};

/// Fetches records from a local JSON file.
///
/// An unreadable file is a retryable `io` failure (the file may be mid-write
/// or not created yet); an undecodable one is a `schema_error`.
pub struct FileSource<T> {
    path: PathBuf,
    _records: PhantomData<fn() -> T>,
}

impl<T> FileSource<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _records: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<T> Clone for FileSource<T> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<T> std::fmt::Debug for FileSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSource").field("path", &self.path).finish()
    }
}

impl<T: DeserializeOwned> FileSource<T> {
    pub async fn load(&self) -> Result<FetchOutcome<T>, FetchError> {
        load_path(&self.path).await
    }
}

async fn load_path<T: DeserializeOwned>(path: &Path) -> Result<FetchOutcome<T>, FetchError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        FetchError::with_code("io", format!("failed to read {}: {e}", path.display()))
    })?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "file source read");
    decode_outcome(&bytes)
}

impl<T: DeserializeOwned + Send + 'static> Fetcher<T> for FileSource<T> {
    fn fetch(&self) -> FetchFuture<T> {
        let path = self.path.clone();
        Box::pin(async move { load_path(&path).await })
    }
}
