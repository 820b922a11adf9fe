//! Time-limited resolution.

use reqmux_core::{Applier, BoxError, Reply, Resolver};
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Returned when the inner resolver misses its deadline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("resolver did not finish within {0:?}")]
pub struct TimeoutError(pub Duration);

/// Fails with [`TimeoutError`] when the inner resolver takes longer than
/// `duration`.
///
/// Listeners that never complete otherwise leave a request pending forever.
pub struct TimeoutResolver<R> {
    inner: R,
    duration: Duration,
}

impl<R> TimeoutResolver<R> {
    /// Limits `inner` to `duration` per request.
    pub const fn new(inner: R, duration: Duration) -> Self {
        Self { inner, duration }
    }
}

impl<R: Resolver> Resolver for TimeoutResolver<R> {
    async fn resolve(&self, appliers: Vec<Applier>) -> Result<Reply, BoxError> {
        match timeout(self.duration, self.inner.resolve(appliers)).await {
            Ok(result) => result,
            Err(_) => Err(Box::new(TimeoutError(self.duration))),
        }
    }
}
