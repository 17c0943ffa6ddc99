//! HTTP GET source.
//!
//! Uses the curl crate (libcurl) on a blocking thread. Non-2xx responses map to
//! `FetchError::status`; transport failures map to `timeout` / `connection`
//! codes so the retry layer can classify them.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use url::Url;

use super::payload::decode_outcome;
use crate::outcome::FetchOutcome;
use crate::retry::FetchError;
use crate::scheduler::{FetchFuture, Fetcher};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
struct Request {
    url: Url,
    headers: Vec<(String, String)>,
    connect_timeout: Duration,
    timeout: Duration,
}

/// Fetches records with an HTTP GET against a fixed URL.
pub struct HttpSource<T> {
    request: Arc<Request>,
    _records: PhantomData<fn() -> T>,
}

impl<T> HttpSource<T> {
    /// Only `http` and `https` URLs are accepted.
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).with_context(|| format!("invalid URL: {url}"))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("unsupported URL scheme: {}", url.scheme());
        }
        Ok(Self {
            request: Arc::new(Request {
                url,
                headers: Vec::new(),
                connect_timeout: DEFAULT_CONNECT_TIMEOUT,
                timeout: DEFAULT_TIMEOUT,
            }),
            _records: PhantomData,
        })
    }

    fn request_mut(&mut self) -> &mut Request {
        Arc::make_mut(&mut self.request)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request_mut().headers.push((name.into(), value.into()));
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.request_mut().connect_timeout = timeout;
        self
    }

    /// Whole-request timeout enforced by curl.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request_mut().timeout = timeout;
        self
    }

    pub fn url(&self) -> &Url {
        &self.request.url
    }
}

impl<T> Clone for HttpSource<T> {
    fn clone(&self) -> Self {
        Self {
            request: Arc::clone(&self.request),
            _records: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for HttpSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSource")
            .field("url", &self.request.url.as_str())
            .finish()
    }
}

fn transport_error(e: &curl::Error) -> FetchError {
    let message = e.to_string();
    if e.is_operation_timedout() {
        FetchError::timeout(message)
    } else if e.is_couldnt_connect()
        || e.is_couldnt_resolve_host()
        || e.is_couldnt_resolve_proxy()
        || e.is_recv_error()
        || e.is_send_error()
        || e.is_got_nothing()
        || e.is_partial_file()
    {
        FetchError::with_code("connection", message)
    } else {
        FetchError::new(message)
    }
}

/// Message for a non-2xx response: the body's `message`/`error` field when it
/// is JSON, otherwise the status line.
fn http_error(status: u16, body: &[u8]) -> FetchError {
    let from_body = serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            ["message", "error"]
                .iter()
                .find_map(|k| v.get(k).and_then(|m| m.as_str()).map(str::to_string))
        });
    FetchError::http(status, from_body.unwrap_or_else(|| format!("HTTP {status}")))
}

/// Runs in the current thread; call from `spawn_blocking` in async code.
fn get_blocking(request: &Request) -> Result<(u16, Vec<u8>), FetchError> {
    let mut body = Vec::new();
    let mut easy = curl::easy::Easy::new();
    let setup = |easy: &mut curl::easy::Easy| -> Result<(), curl::Error> {
        easy.url(request.url.as_str())?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.connect_timeout(request.connect_timeout)?;
        easy.timeout(request.timeout)?;
        let mut list = curl::easy::List::new();
        list.append("Accept: application/json")?;
        for (k, v) in &request.headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)
    };
    setup(&mut easy).map_err(|e| FetchError::new(format!("invalid request: {e}")))?;
    {
        let mut transfer = easy.transfer();
        transfer
            .write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })
            .map_err(|e| transport_error(&e))?;
        transfer.perform().map_err(|e| transport_error(&e))?;
    }
    let status = easy.response_code().map_err(|e| transport_error(&e))?;
    let status = u16::try_from(status).unwrap_or(0);
    Ok((status, body))
}

async fn get<T: DeserializeOwned>(request: Arc<Request>) -> Result<FetchOutcome<T>, FetchError> {
    let url = request.url.to_string();
    let (status, body) = tokio::task::spawn_blocking(move || get_blocking(&request))
        .await
        .map_err(|e| FetchError::new(format!("fetch task failed: {e}")))??;
    tracing::debug!(%url, status, bytes = body.len(), "http source response");
    if !(200..300).contains(&status) {
        return Err(http_error(status, &body));
    }
    decode_outcome(&body)
}

impl<T: DeserializeOwned> HttpSource<T> {
    pub async fn load(&self) -> Result<FetchOutcome<T>, FetchError> {
        get(Arc::clone(&self.request)).await
    }
}

impl<T: DeserializeOwned + Send + 'static> Fetcher<T> for HttpSource<T> {
    fn fetch(&self) -> FetchFuture<T> {
        Box::pin(get(Arc::clone(&self.request)))
    }
}
