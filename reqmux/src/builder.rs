//! Engine configuration.

use crate::dispatch::WebRequest;
use reqmux_core::{DynResolver, EventKind, HostHook, Resolver};
use reqmux_std::LatestWins;
use std::{collections::HashMap, sync::Arc};

/// Configures a [`WebRequest`] before it is shared.
pub struct WebRequestBuilder<H> {
    host: H,
    default_resolver: Arc<dyn DynResolver>,
    resolvers: HashMap<EventKind, Arc<dyn DynResolver>>,
    instrument: bool,
}

impl<H: HostHook> WebRequestBuilder<H> {
    /// Starts from [`LatestWins`] with resolution tracing on.
    pub fn new(host: H) -> Self {
        Self {
            host,
            default_resolver: Arc::new(LatestWins),
            resolvers: HashMap::new(),
            instrument: true,
        }
    }

    /// Replaces the resolver used for kinds without their own.
    pub fn default_resolver<R: Resolver>(mut self, resolver: R) -> Self {
        self.default_resolver = Arc::new(resolver);
        self
    }

    /// Sets the resolver for `kind`. Fire-and-forget kinds are ignored with
    /// a warning.
    pub fn resolver<R: Resolver>(mut self, kind: EventKind, resolver: R) -> Self {
        if !kind.has_callback() {
            tracing::warn!(%kind, "event does not carry a reply; resolver ignored");
            return self;
        }
        self.resolvers.insert(kind, Arc::new(resolver));
        self
    }

    /// Whether each resolution runs inside a `resolve` span.
    pub fn instrument(mut self, enabled: bool) -> Self {
        self.instrument = enabled;
        self
    }

    /// Build the engine.
    pub fn build(self) -> WebRequest<H> {
        WebRequest::from_parts(
            self.host,
            self.default_resolver,
            self.resolvers,
            self.instrument,
        )
    }
}
