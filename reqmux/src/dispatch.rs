//! The dispatch engine.
//!
//! [`WebRequest`] owns the listener registry for one host and keeps exactly
//! one callback bound per event kind that has listeners. When the host fires
//! that callback, the engine matches the request against the listeners,
//! wraps the matches in [`Applier`]s and either hands them to the kind's
//! resolver (reply-bearing kinds) or applies them all (fire-and-forget
//! kinds).

use crate::{
    builder::WebRequestBuilder,
    subscription::{Subscribe, Subscription},
};
use futures::FutureExt;
use parking_lot::{Mutex, RwLock};
use reqmux_core::{
    Action, Applier, ContextOptions, DispatchError, DynResolver, EventKind, FilterSet,
    HookCallback, HostHook, ListenerHandle, ListenerId, Reply, ReplyFn, RequestDetails, Resolver,
    SubscribeError,
};
use reqmux_std::{ListenerRegistry, MatchPattern, Rebind, TracingResolver};
use std::{
    any::Any,
    collections::{BTreeMap, HashMap},
    fmt,
    panic::AssertUnwindSafe,
    sync::{Arc, Weak},
};

struct Shared<H> {
    host: H,
    registry: RwLock<ListenerRegistry>,
    resolvers: RwLock<HashMap<EventKind, Arc<dyn DynResolver>>>,
    default_resolver: Arc<dyn DynResolver>,
    instrument: bool,
    // Serializes registry mutations together with the host call they cause.
    rebind: Mutex<()>,
}

/// Many listeners multiplexed onto one host's request hooks.
///
/// Cloning is cheap; clones share the same registry. The callbacks bound on
/// the host only hold a weak reference, so dropping the last clone turns them
/// into neutral replies.
pub struct WebRequest<H: HostHook> {
    shared: Arc<Shared<H>>,
}

impl<H: HostHook> Clone for WebRequest<H> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<H: HostHook> fmt::Debug for WebRequest<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebRequest")
            .field("listeners", &self.shared.registry.read().len())
            .finish_non_exhaustive()
    }
}

macro_rules! on_methods {
    ($($(#[$meta:meta])* $name:ident => $kind:ident;)*) => {
        $(
            $(#[$meta])*
            pub fn $name(
                &self,
                subscription: Subscription,
            ) -> Result<Option<ListenerHandle>, SubscribeError> {
                self.subscribe(EventKind::$kind, subscription)
            }
        )*
    };
}

impl<H: HostHook> WebRequest<H> {
    /// An engine with the default configuration.
    pub fn new(host: H) -> Self {
        WebRequestBuilder::new(host).build()
    }

    /// Starts a [`WebRequestBuilder`] for engines that need non-default
    /// resolvers or no instrumentation.
    pub fn builder(host: H) -> WebRequestBuilder<H> {
        WebRequestBuilder::new(host)
    }

    pub(crate) fn from_parts(
        host: H,
        default_resolver: Arc<dyn DynResolver>,
        resolvers: HashMap<EventKind, Arc<dyn DynResolver>>,
        instrument: bool,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                host,
                registry: RwLock::new(ListenerRegistry::new()),
                resolvers: RwLock::new(resolvers),
                default_resolver,
                instrument,
                rebind: Mutex::new(()),
            }),
        }
    }

    /// The host this engine binds hooks on.
    pub fn host(&self) -> &H {
        &self.shared.host
    }

    on_methods! {
        /// Subscribes to `onBeforeRequest`. Listeners may cancel or redirect.
        on_before_request => BeforeRequest;
        /// Subscribes to `onBeforeSendHeaders`. Listeners may rewrite request headers.
        on_before_send_headers => BeforeSendHeaders;
        /// Subscribes to `onHeadersReceived`. Listeners may rewrite response headers.
        on_headers_received => HeadersReceived;
        /// Subscribes to `onSendHeaders`.
        on_send_headers => SendHeaders;
        /// Subscribes to `onResponseStarted`.
        on_response_started => ResponseStarted;
        /// Subscribes to `onBeforeRedirect`.
        on_before_redirect => BeforeRedirect;
        /// Subscribes to `onCompleted`.
        on_completed => Completed;
        /// Subscribes to `onErrorOccurred`.
        on_error_occurred => ErrorOccurred;
    }

    /// Applies a [`Subscription`] to `kind`.
    ///
    /// Returns the new listener's handle, or `None` when the subscription
    /// detached the kind.
    pub fn subscribe(
        &self,
        kind: EventKind,
        subscription: Subscription,
    ) -> Result<Option<ListenerHandle>, SubscribeError> {
        match subscription.normalize(kind)? {
            Subscribe::Add {
                urls,
                action,
                context,
            } => self.insert(kind, urls, action, context).map(Some),
            Subscribe::Clear => {
                self.clear_listeners(kind);
                Ok(None)
            }
        }
    }

    /// Registers `action` for requests of `kind` matching any of `urls`.
    ///
    /// Every pattern is validated before anything is registered.
    pub fn add_listener<I, S>(
        &self,
        kind: EventKind,
        urls: I,
        action: impl Action,
        context: ContextOptions,
    ) -> Result<ListenerHandle, SubscribeError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let urls = urls.into_iter().map(Into::into).collect();
        self.insert(kind, urls, Arc::new(action), context)
    }

    fn insert(
        &self,
        kind: EventKind,
        urls: Vec<String>,
        action: Arc<dyn Action>,
        context: ContextOptions,
    ) -> Result<ListenerHandle, SubscribeError> {
        let patterns = urls
            .iter()
            .map(|url| MatchPattern::parse(url))
            .collect::<Result<Vec<_>, _>>()?;

        let _guard = self.shared.rebind.lock();
        let (handle, rebind) = self
            .shared
            .registry
            .write()
            .add(kind, patterns, action, context)?;
        self.rebind(kind, rebind);
        Ok(handle)
    }

    /// Removes listener `id` from `kind`. Unknown ids are ignored.
    pub fn remove_listener(&self, kind: EventKind, id: ListenerId) {
        let _guard = self.shared.rebind.lock();
        let rebind = self.shared.registry.write().remove(kind, id);
        self.rebind(kind, rebind);
    }

    /// Removes every listener of `kind` and detaches its hook. Returns how
    /// many listeners were removed.
    pub fn clear_listeners(&self, kind: EventKind) -> usize {
        let _guard = self.shared.rebind.lock();
        let removed = self.shared.registry.write().clear(kind);
        self.shared.host.unregister(kind);
        tracing::debug!(%kind, removed, "hook detached");
        removed
    }

    /// Sets the resolver for `kind`.
    ///
    /// Returns `false`, and logs a warning, for fire-and-forget kinds.
    pub fn set_resolver<R: Resolver>(&self, kind: EventKind, resolver: R) -> bool {
        if !kind.has_callback() {
            tracing::warn!(%kind, "event does not carry a reply; resolver ignored");
            return false;
        }
        let previous = self
            .shared
            .resolvers
            .write()
            .insert(kind, Arc::new(resolver));
        if previous.is_some() {
            tracing::warn!(%kind, "replacing previously set resolver");
        }
        true
    }

    /// Goes back to the default resolver for `kind`. Returns whether a
    /// resolver had been set.
    pub fn clear_resolver(&self, kind: EventKind) -> bool {
        self.shared.resolvers.write().remove(&kind).is_some()
    }

    /// Whether the host expects a reply for `kind`.
    pub fn has_callback(&self, kind: EventKind) -> bool {
        kind.has_callback()
    }

    /// Every listener, per kind, in registration order.
    pub fn listeners(&self) -> BTreeMap<EventKind, Vec<ListenerHandle>> {
        self.shared.registry.read().all_listeners()
    }

    /// Listeners for `kind`, in registration order.
    pub fn listeners_for(&self, kind: EventKind) -> Vec<ListenerHandle> {
        self.shared
            .registry
            .read()
            .listeners_for(kind)
            .iter()
            .map(|listener| listener.handle())
            .collect()
    }

    /// Every aggregated filter, per kind.
    pub fn filters(&self) -> BTreeMap<EventKind, FilterSet> {
        self.shared.registry.read().all_filters()
    }

    /// The filter bound for `kind`; empty when the kind has no listeners.
    pub fn filters_for(&self, kind: EventKind) -> FilterSet {
        self.shared
            .registry
            .read()
            .filters_for(kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Listeners of `kind` that would receive a request for `url`.
    pub fn match_listeners(&self, kind: EventKind, url: &str) -> Vec<ListenerHandle> {
        self.shared
            .registry
            .read()
            .match_listeners(kind, url)
            .iter()
            .map(|listener| listener.handle())
            .collect()
    }

    /// Handles one intercepted request of `kind`.
    ///
    /// For reply-bearing kinds `reply` is called exactly once, with the
    /// neutral reply when nothing matched or the resolver failed. For
    /// fire-and-forget kinds it is never called.
    pub async fn dispatch(
        &self,
        kind: EventKind,
        details: RequestDetails,
        reply: Option<ReplyFn>,
    ) -> Result<(), DispatchError> {
        let (bound, matched) = {
            let registry = self.shared.registry.read();
            (
                registry.has_listeners(kind),
                registry.match_listeners(kind, &details.url),
            )
        };

        if !bound {
            self.detach_if_unused(kind);
            if kind.has_callback() {
                respond(reply, Reply::neutral());
            }
            return Ok(());
        }

        tracing::trace!(%kind, url = %details.url, matched = matched.len(), "dispatching");

        let details = Arc::new(details);
        let appliers: Vec<Applier> = matched
            .iter()
            .map(|listener| listener.applier(&details))
            .collect();

        if !kind.has_callback() {
            for applier in appliers {
                // Actions run inside `apply`; nobody waits for completion.
                drop(applier.apply());
            }
            return Ok(());
        }

        if appliers.is_empty() {
            respond(reply, Reply::neutral());
            return Ok(());
        }

        let resolver = self.resolver_for(kind);
        let instrument = self.shared.instrument;
        let resolution = async move {
            if instrument {
                DynResolver::resolve_dyn(&TracingResolver::new(kind, resolver), appliers).await
            } else {
                resolver.resolve_dyn(appliers).await
            }
        };
        // A panicking resolver must still leave the host with a reply.
        let result = match AssertUnwindSafe(resolution).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(format!("resolver panicked: {}", panic_message(&*payload)).into()),
        };

        match result {
            Ok(value) => {
                respond(reply, value);
                Ok(())
            }
            Err(source) => {
                tracing::warn!(%kind, url = %details.url, error = %source, "resolver failed; replying neutral");
                respond(reply, Reply::neutral());
                Err(DispatchError::Resolver { kind, source })
            }
        }
    }

    fn resolver_for(&self, kind: EventKind) -> Arc<dyn DynResolver> {
        self.shared
            .resolvers
            .read()
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.shared.default_resolver))
    }

    // The host fired a kind we hold no listeners for.
    fn detach_if_unused(&self, kind: EventKind) {
        let _guard = self.shared.rebind.lock();
        if self.shared.registry.read().has_listeners(kind) {
            return;
        }
        tracing::warn!(%kind, "hook fired without listeners; detaching");
        self.shared.host.unregister(kind);
    }

    // Caller holds the rebind guard.
    fn rebind(&self, kind: EventKind, rebind: Rebind) {
        match rebind {
            Rebind::Register(filter) => {
                tracing::debug!(%kind, filters = filter.len(), "hook bound");
                self.shared
                    .host
                    .register(kind, &filter, callback(Arc::downgrade(&self.shared), kind));
            }
            Rebind::Unregister => {
                tracing::debug!(%kind, "hook detached");
                self.shared.host.unregister(kind);
            }
            Rebind::Unchanged => {}
        }
    }
}

fn callback<H: HostHook>(shared: Weak<Shared<H>>, kind: EventKind) -> HookCallback {
    Arc::new(move |details: RequestDetails, reply: Option<ReplyFn>| {
        let shared = shared.upgrade();
        async move {
            match shared {
                Some(shared) => {
                    let engine = WebRequest { shared };
                    engine.dispatch(kind, details, reply).await
                }
                None => {
                    tracing::debug!(%kind, "engine dropped; replying neutral");
                    if kind.has_callback() {
                        respond(reply, Reply::neutral());
                    }
                    Ok(())
                }
            }
        }
        .boxed()
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}

fn respond(reply: Option<ReplyFn>, value: Reply) {
    if let Some(reply) = reply {
        reply(value);
    }
}
