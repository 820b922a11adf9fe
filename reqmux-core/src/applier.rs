//! Deferred, request-scoped listener invocations.

use crate::{
    error::ListenerError,
    listener::{Action, Completion, ListenerContext},
    message::{Reply, RequestDetails},
};
use futures::{
    FutureExt,
    future::{self, BoxFuture},
};
use std::{
    any::Any,
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

type Task = Box<dyn FnOnce() -> BoxFuture<'static, Result<Reply, ListenerError>> + Send>;

/// One matched listener, ready to run against one request.
///
/// Nothing happens until [`apply`](Self::apply) is called: a resolver that
/// never applies an `Applier` never runs the listener's action. `apply`
/// consumes the applier, so a listener runs at most once per request.
pub struct Applier {
    context: ListenerContext,
    task: Task,
}

impl Applier {
    /// Wraps `action` for the request described by `details`.
    pub fn new(
        context: ListenerContext,
        action: Arc<dyn Action>,
        details: Arc<RequestDetails>,
    ) -> Self {
        Self::from_fn(context, move || invoke(action.as_ref(), &details))
    }

    /// Builds an applier from an arbitrary deferred task.
    pub fn from_fn<F>(context: ListenerContext, task: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'static, Result<Reply, ListenerError>> + Send + 'static,
    {
        Self {
            context,
            task: Box::new(task),
        }
    }

    /// The listener's context, for ordering decisions.
    pub fn context(&self) -> &ListenerContext {
        &self.context
    }

    /// Runs the listener's action now and returns its pending reply.
    ///
    /// The action itself is invoked synchronously inside this call; the
    /// returned future resolves once the listener completes. A failing or
    /// panicking action yields an already-rejected future.
    pub fn apply(self) -> BoxFuture<'static, Result<Reply, ListenerError>> {
        (self.task)()
    }
}

impl fmt::Debug for Applier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Applier")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

fn invoke(
    action: &dyn Action,
    details: &RequestDetails,
) -> BoxFuture<'static, Result<Reply, ListenerError>> {
    let (done, rx) = Completion::channel();

    match panic::catch_unwind(AssertUnwindSafe(|| action.call(details, done))) {
        Ok(Ok(())) => rx.map(|res| res.map_err(|_| ListenerError::Abandoned)).boxed(),
        Ok(Err(err)) => future::ready(Err(ListenerError::Failed(err))).boxed(),
        Err(payload) => future::ready(Err(ListenerError::Panicked(panic_message(payload)))).boxed(),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
