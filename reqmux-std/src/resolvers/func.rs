//! Closure-backed resolvers.

use reqmux_core::{Applier, BoxError, Reply, Resolver};
use std::future::Future;

/// A [`Resolver`] backed by an async closure.
///
/// # Example
///
/// ```rust,ignore
/// // Run every listener, first cancel wins.
/// let resolver = resolver_fn(|appliers: Vec<Applier>| async move {
///     let replies = futures::future::join_all(appliers.into_iter().map(Applier::apply)).await;
///     Ok::<_, BoxError>(replies.into_iter().flatten().find(|r| r.cancel).unwrap_or_default())
/// });
/// ```
#[derive(Clone)]
pub struct FnResolver<F> {
    f: F,
}

impl<F> FnResolver<F> {
    /// Wraps `f`.
    pub const fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F, Fut> Resolver for FnResolver<F>
where
    F: Fn(Vec<Applier>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, BoxError>> + Send,
{
    fn resolve(
        &self,
        appliers: Vec<Applier>,
    ) -> impl Future<Output = Result<Reply, BoxError>> + Send {
        (self.f)(appliers)
    }
}

/// Shorthand for [`FnResolver::new`].
pub const fn resolver_fn<F, Fut>(f: F) -> FnResolver<F>
where
    F: Fn(Vec<Applier>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, BoxError>> + Send,
{
    FnResolver::new(f)
}
