//! # Listener Layer
//!
//! A listener is one subscriber to a lifecycle hook. Its [`Action`] receives
//! the request details and a [`Completion`], and answers by completing with a
//! [`Reply`] fragment, now or later.
//!
//! Listeners never talk to the host directly: their completions feed an
//! [`Applier`], and the resolver decides which of them reach the host.
//!
//! [`Applier`]: crate::Applier

use crate::{
    error::BoxError,
    kind::EventKind,
    message::{Reply, RequestDetails},
};
use futures::channel::oneshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Registry-wide unique listener identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ListenerId(Uuid);

impl ListenerId {
    /// A fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Ordering and provenance of a registered listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerContext {
    /// Registration order, assigned by the registry. Strictly increasing
    /// across every kind.
    pub order: u64,
    /// Explicit priority; higher wins under the default resolver.
    pub priority: Option<i32>,
    /// Free-form label naming who registered the listener.
    pub origin: Option<String>,
}

/// Caller-supplied part of a [`ListenerContext`].
///
/// There is no way to set `order` here; the registry always assigns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextOptions {
    /// See [`ListenerContext::priority`].
    pub priority: Option<i32>,
    /// See [`ListenerContext::origin`].
    pub origin: Option<String>,
}

impl ContextOptions {
    /// No priority, no origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an explicit priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Labels who registered the listener.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    /// Completes the context with a registry-assigned order.
    pub fn into_context(self, order: u64) -> ListenerContext {
        ListenerContext {
            order,
            priority: self.priority,
            origin: self.origin,
        }
    }
}

/// What a caller gets back for a registered listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerHandle {
    /// Pass this back to remove the listener.
    pub id: ListenerId,
    /// The hook the listener is registered on.
    pub kind: EventKind,
    /// The listener's patterns, as given.
    pub urls: Vec<String>,
    /// Assigned order plus the caller's options.
    pub context: ListenerContext,
}

/// One-shot sink a listener completes with its reply fragment.
///
/// Dropping a `Completion` without calling [`done`](Self::done) rejects the
/// listener's applier with [`ListenerError::Abandoned`].
///
/// [`ListenerError::Abandoned`]: crate::ListenerError::Abandoned
#[derive(Debug)]
pub struct Completion {
    tx: oneshot::Sender<Reply>,
}

impl Completion {
    /// Creates a completion and the receiver its reply arrives on.
    pub fn channel() -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Completes with `reply`.
    pub fn done(self, reply: Reply) {
        // The receiver is gone when nobody awaits this listener.
        let _ = self.tx.send(reply);
    }

    /// Completes with the neutral reply.
    pub fn pass(self) {
        self.done(Reply::neutral());
    }
}

/// Conversion of an action's return value into success or failure.
///
/// # Default Implementations
///
/// - `()` → success
/// - `Result<(), E>` → failure carries `E`
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot be returned from a listener action",
    label = "actions must return `()` or `Result<(), E>`"
)]
pub trait IntoOutcome {
    /// Converts the return value.
    fn into_outcome(self) -> Result<(), BoxError>;
}

impl IntoOutcome for () {
    fn into_outcome(self) -> Result<(), BoxError> {
        Ok(())
    }
}

impl<E> IntoOutcome for Result<(), E>
where
    E: Into<BoxError>,
{
    fn into_outcome(self) -> Result<(), BoxError> {
        self.map_err(Into::into)
    }
}

/// The callable part of a listener.
///
/// Implemented for every `Fn(&RequestDetails, Completion)` closure returning
/// `()` or `Result<(), E>`. Returning an error, or panicking, rejects the
/// listener's applier without affecting the others.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a listener `Action`",
    label = "missing `Action` implementation",
    note = "Actions take `(&RequestDetails, Completion)` and return `()` or `Result<(), E>`."
)]
pub trait Action: Send + Sync + 'static {
    /// Runs the action for one request.
    fn call(&self, details: &RequestDetails, done: Completion) -> Result<(), BoxError>;
}

impl<F, R> Action for F
where
    F: Fn(&RequestDetails, Completion) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    fn call(&self, details: &RequestDetails, done: Completion) -> Result<(), BoxError> {
        (self)(details, done).into_outcome()
    }
}

/// Builds an [`Action`] from a closure, pinning its argument types.
pub fn action<F, R>(f: F) -> F
where
    F: Fn(&RequestDetails, Completion) -> R + Send + Sync + 'static,
    R: IntoOutcome,
{
    f
}
