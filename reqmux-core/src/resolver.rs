//! # Conflict Resolution Layer (Resolver)
//!
//! When several listeners match a reply-bearing request, exactly one reply
//! still has to reach the host. A [`Resolver`] receives every matched
//! listener as a lazy [`Applier`] (in registration order) and decides which
//! of them run, in which order, and how their outputs become the reply.
//!
//! The dispatch engine holds no conflict policy of its own; everything
//! happens here.

use crate::{applier::Applier, error::BoxError, message::Reply};
use std::{future::Future, pin::Pin};

/// Reconciles the matched listeners of one request into one reply.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Resolver`",
    label = "missing `Resolver` implementation",
    note = "Resolvers must implement `resolve(Vec<Applier>) -> Result<Reply, BoxError>`."
)]
pub trait Resolver: Send + Sync + 'static {
    /// Produces the reply for one request.
    ///
    /// `appliers` are ordered by ascending registration order. Appliers that
    /// are dropped without being applied never run.
    fn resolve(
        &self,
        appliers: Vec<Applier>,
    ) -> impl Future<Output = Result<Reply, BoxError>> + Send;
}

/// Dynamic object-safe version of [`Resolver`].
///
/// Use this trait when resolvers are stored per event kind.
pub trait DynResolver: Send + Sync + 'static {
    /// Boxed form of [`Resolver::resolve`].
    fn resolve_dyn<'a>(
        &'a self,
        appliers: Vec<Applier>,
    ) -> Pin<Box<dyn Future<Output = Result<Reply, BoxError>> + Send + 'a>>;
}

impl<R: Resolver> DynResolver for R {
    fn resolve_dyn<'a>(
        &'a self,
        appliers: Vec<Applier>,
    ) -> Pin<Box<dyn Future<Output = Result<Reply, BoxError>> + Send + 'a>> {
        Box::pin(self.resolve(appliers))
    }
}

// Both impls dispatch through the trait object. `self.resolve_dyn` would
// pick the blanket impl for the smart pointer itself and recurse.
impl Resolver for Box<dyn DynResolver> {
    async fn resolve(&self, appliers: Vec<Applier>) -> Result<Reply, BoxError> {
        (**self).resolve_dyn(appliers).await
    }
}

impl Resolver for std::sync::Arc<dyn DynResolver> {
    async fn resolve(&self, appliers: Vec<Applier>) -> Result<Reply, BoxError> {
        (**self).resolve_dyn(appliers).await
    }
}
