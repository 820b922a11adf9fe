//! # Host Boundary
//!
//! The host platform exposes one hook per [`EventKind`], and each hook holds
//! at most one callback: registering again replaces the previous callback.
//! [`HostHook`] is that contract seen from reqmux.

use crate::{
    error::DispatchError,
    filter::FilterSet,
    kind::EventKind,
    message::{Reply, RequestDetails},
};
use futures::future::BoxFuture;
use std::sync::Arc;

/// One-shot reply sink the host passes along with a reply-bearing request.
pub type ReplyFn = Box<dyn FnOnce(Reply) + Send>;

/// The function reqmux binds to a host hook.
///
/// The host calls it once per intercepted request of the bound kind. For
/// reply-bearing kinds it passes a [`ReplyFn`], which reqmux calls exactly
/// once.
pub type HookCallback = Arc<
    dyn Fn(RequestDetails, Option<ReplyFn>) -> BoxFuture<'static, Result<(), DispatchError>>
        + Send
        + Sync,
>;

/// A host platform's request lifecycle hooks.
pub trait HostHook: Send + Sync + 'static {
    /// Binds `callback` to `kind` for every URL matched by `filter`,
    /// replacing any previous binding for `kind`.
    fn register(&self, kind: EventKind, filter: &FilterSet, callback: HookCallback);

    /// Removes the binding for `kind`, if any.
    fn unregister(&self, kind: EventKind);
}

impl<H: HostHook> HostHook for Arc<H> {
    fn register(&self, kind: EventKind, filter: &FilterSet, callback: HookCallback) {
        (**self).register(kind, filter, callback)
    }

    fn unregister(&self, kind: EventKind) {
        (**self).unregister(kind)
    }
}
