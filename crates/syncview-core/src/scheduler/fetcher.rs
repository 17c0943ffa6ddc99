use std::future::Future;
use std::pin::Pin;

use crate::outcome::FetchOutcome;
use crate::retry::FetchError;

pub type FetchFuture<T> = Pin<Box<dyn Future<Output = Result<FetchOutcome<T>, FetchError>> + Send>>;

/// The caller-supplied, argument-less fetch operation.
///
/// Implemented for any `Fn() -> impl Future<Output = Result<FetchOutcome<T>, FetchError>>`,
/// so plain async closures can be handed to the scheduler directly.
pub trait Fetcher<T>: Send + Sync + 'static {
    fn fetch(&self) -> FetchFuture<T>;
}

impl<T, F, Fut> Fetcher<T> for F
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<FetchOutcome<T>, FetchError>> + Send + 'static,
{
    fn fetch(&self) -> FetchFuture<T> {
        Box::pin(self())
    }
}
