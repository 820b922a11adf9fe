//! Testing utilities for reqmux.
//!
//! - [`MockHost`]: an in-memory [`HostHook`] that records bindings and can
//!   fire requests at them
//! - [`RecordingAction`]: a listener action that records what it sees and
//!   answers in a fixed way

use parking_lot::Mutex;
use reqmux_core::{
    Action, BoxError, Completion, DispatchError, EventKind, FilterSet, HookCallback, HostHook,
    Reply, ReplyFn, RequestDetails,
};
use std::{collections::HashMap, sync::Arc};

// ============================================================================
// Mock Host
// ============================================================================

/// A call the engine made on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    /// [`HostHook::register`].
    Register {
        /// Hook being bound.
        kind: EventKind,
        /// Filter it was bound with.
        filter: FilterSet,
    },
    /// [`HostHook::unregister`].
    Unregister {
        /// Hook being detached.
        kind: EventKind,
    },
}

#[derive(Default)]
struct HostState {
    calls: Vec<HostCall>,
    bindings: HashMap<EventKind, (FilterSet, HookCallback)>,
}

/// An in-memory host with one binding slot per event kind.
///
/// Clones share state, so a test can keep one clone while the engine owns
/// another.
///
/// # Example
///
/// ```rust,ignore
/// let host = MockHost::new();
/// let web = WebRequest::new(host.clone());
/// web.on_before_request(Subscription::new(action).filter(["*://test.com/"]))?;
///
/// let fired = host.fire(EventKind::BeforeRequest, RequestDetails::new("http://test.com")).await;
/// assert!(fired.reply().is_some());
/// ```
#[derive(Clone, Default)]
pub struct MockHost {
    state: Arc<Mutex<HostState>>,
}

/// Outcome of [`MockHost::fire`].
#[derive(Debug)]
pub struct Fired {
    /// Whether a callback was bound for the kind.
    pub bound: bool,
    /// What the callback returned; `Ok` when nothing was bound.
    pub result: Result<(), DispatchError>,
    /// Every value passed to the reply callback.
    pub replies: Vec<Reply>,
}

impl Fired {
    /// The first reply, if any.
    pub fn reply(&self) -> Option<&Reply> {
        self.replies.first()
    }
}

impl MockHost {
    /// A host with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every register/unregister call so far, oldest first.
    pub fn calls(&self) -> Vec<HostCall> {
        self.state.lock().calls.clone()
    }

    /// Forgets the recorded calls; bindings are kept.
    pub fn clear_calls(&self) {
        self.state.lock().calls.clear();
    }

    /// Whether a callback is bound for `kind`.
    pub fn is_bound(&self, kind: EventKind) -> bool {
        self.state.lock().bindings.contains_key(&kind)
    }

    /// The filter currently bound for `kind`.
    pub fn filter(&self, kind: EventKind) -> Option<FilterSet> {
        self.state
            .lock()
            .bindings
            .get(&kind)
            .map(|(filter, _)| filter.clone())
    }

    /// The callback currently bound for `kind`.
    pub fn callback(&self, kind: EventKind) -> Option<HookCallback> {
        self.state
            .lock()
            .bindings
            .get(&kind)
            .map(|(_, callback)| Arc::clone(callback))
    }

    /// Fires a request at the callback bound for `kind`, the way a host
    /// would: a reply sink is passed only for reply-bearing kinds.
    ///
    /// The bound filter is not consulted.
    pub async fn fire(&self, kind: EventKind, details: RequestDetails) -> Fired {
        self.fire_inner(kind, details, kind.has_callback()).await
    }

    /// Like [`fire`](Self::fire) but always passes a reply sink.
    pub async fn fire_with_reply(&self, kind: EventKind, details: RequestDetails) -> Fired {
        self.fire_inner(kind, details, true).await
    }

    async fn fire_inner(&self, kind: EventKind, details: RequestDetails, reply: bool) -> Fired {
        let Some(callback) = self.callback(kind) else {
            return Fired {
                bound: false,
                result: Ok(()),
                replies: Vec::new(),
            };
        };

        let replies = Arc::new(Mutex::new(Vec::new()));
        let sink: Option<ReplyFn> = reply.then(|| {
            let replies = Arc::clone(&replies);
            Box::new(move |reply: Reply| replies.lock().push(reply)) as ReplyFn
        });

        let result = callback(details, sink).await;
        let replies = std::mem::take(&mut *replies.lock());
        Fired {
            bound: true,
            result,
            replies,
        }
    }
}

impl HostHook for MockHost {
    fn register(&self, kind: EventKind, filter: &FilterSet, callback: HookCallback) {
        let mut state = self.state.lock();
        state.calls.push(HostCall::Register {
            kind,
            filter: filter.clone(),
        });
        state.bindings.insert(kind, (filter.clone(), callback));
    }

    fn unregister(&self, kind: EventKind) {
        let mut state = self.state.lock();
        state.calls.push(HostCall::Unregister { kind });
        state.bindings.remove(&kind);
    }
}

// ============================================================================
// Recording Action
// ============================================================================

#[derive(Clone)]
enum Behavior {
    Reply(Reply),
    Silent,
    Fail(String),
}

/// A listener action that records every request it is invoked with.
///
/// Clones share the record.
#[derive(Clone)]
pub struct RecordingAction {
    calls: Arc<Mutex<Vec<RequestDetails>>>,
    behavior: Behavior,
}

impl RecordingAction {
    fn with_behavior(behavior: Behavior) -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            behavior,
        }
    }

    /// Completes every request with `reply`.
    pub fn replying(reply: Reply) -> Self {
        Self::with_behavior(Behavior::Reply(reply))
    }

    /// Completes every request with the neutral reply.
    pub fn passing() -> Self {
        Self::replying(Reply::neutral())
    }

    /// Drops its completion without answering.
    pub fn silent() -> Self {
        Self::with_behavior(Behavior::Silent)
    }

    /// Fails synchronously with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Fail(message.into()))
    }

    /// How many times the action ran.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Details of every invocation, oldest first.
    pub fn calls(&self) -> Vec<RequestDetails> {
        self.calls.lock().clone()
    }

    /// URLs of every invocation, oldest first.
    pub fn urls(&self) -> Vec<String> {
        self.calls.lock().iter().map(|d| d.url.clone()).collect()
    }
}

impl Action for RecordingAction {
    fn call(&self, details: &RequestDetails, done: Completion) -> Result<(), BoxError> {
        self.calls.lock().push(details.clone());
        match &self.behavior {
            Behavior::Reply(reply) => {
                done.done(reply.clone());
                Ok(())
            }
            Behavior::Silent => Ok(()),
            Behavior::Fail(message) => Err(message.clone().into()),
        }
    }
}
