//! Ready-made fetch operations: local JSON files and HTTP endpoints.

mod file;
mod http;
mod payload;

use anyhow::Result;
use serde::de::DeserializeOwned;

pub use file::FileSource;
pub use http::HttpSource;
pub use payload::decode_outcome;

use crate::scheduler::{FetchFuture, Fetcher};

/// A file path or an http(s) URL, picked from a single string.
#[derive(Debug, Clone)]
pub enum Source<T> {
    File(FileSource<T>),
    Http(HttpSource<T>),
}

impl<T> Source<T> {
    /// `http://` and `https://` locations become [`HttpSource`]s, anything else
    /// is treated as a file path.
    pub fn parse(location: &str) -> Result<Self> {
        let lower = location.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Source::Http(HttpSource::new(location)?))
        } else {
            Ok(Source::File(FileSource::new(location)))
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Source::File(f) => f.path().display().to_string(),
            Source::Http(h) => h.url().to_string(),
        }
    }
}

impl<T: DeserializeOwned + Send + 'static> Fetcher<T> for Source<T> {
    fn fetch(&self) -> FetchFuture<T> {
        match self {
            Source::File(f) => f.fetch(),
            Source::Http(h) => h.fetch(),
        }
    }
}
