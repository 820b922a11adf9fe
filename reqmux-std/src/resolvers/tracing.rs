//! Resolver instrumentation.

use reqmux_core::{Applier, BoxError, EventKind, Reply, Resolver};
use tracing::Instrument;

/// Runs the inner resolver inside a `resolve` span carrying the event kind
/// and the number of matched listeners.
///
/// Failures are logged at `warn` level inside the span and returned as-is.
pub struct TracingResolver<R> {
    inner: R,
    kind: EventKind,
}

impl<R> TracingResolver<R> {
    /// Instruments `inner` with a span tagged with `kind`.
    pub const fn new(kind: EventKind, inner: R) -> Self {
        Self { inner, kind }
    }

    /// Unwraps the inner resolver.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Clone> Clone for TracingResolver<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            kind: self.kind,
        }
    }
}

impl<R: Resolver> Resolver for TracingResolver<R> {
    async fn resolve(&self, appliers: Vec<Applier>) -> Result<Reply, BoxError> {
        let span = tracing::info_span!("resolve", kind = %self.kind, appliers = appliers.len());

        async move {
            let result = self.inner.resolve(appliers).await;
            match &result {
                Ok(reply) => tracing::debug!(neutral = reply.is_neutral(), "resolved"),
                Err(err) => tracing::warn!(error = %err, "resolver failed"),
            }
            result
        }
        .instrument(span)
        .await
    }
}
