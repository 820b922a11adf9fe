//! # reqmux - Request Hook Multiplexer
//!
//! Host platforms expose request lifecycle hooks that accept a single
//! callback each, and the reply-bearing ones expect a single answer. `reqmux`
//! lets any number of independent listeners share those hooks: it keeps one
//! callback bound per event kind with the union of every listener's URL
//! patterns, fans each request out to the listeners that match, and lets a
//! pluggable [`Resolver`] decide the single reply.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use reqmux::prelude::*;
//!
//! let web = WebRequest::new(host);
//!
//! web.on_before_request(
//!     Subscription::new(action(|details, done| {
//!         done.done(Reply::redirect(details.url.replace("http:", "https:")));
//!     }))
//!     .filter(["http://*/*"]),
//! )?;
//!
//! // Highest priority, then last registered, decides.
//! web.set_resolver(EventKind::BeforeRequest, LatestWins);
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod builder;
mod dispatch;
mod session;
mod subscription;

pub use builder::WebRequestBuilder;
pub use dispatch::WebRequest;
pub use session::Sessions;
pub use subscription::{Subscribe, Subscription};

// Listener
pub use reqmux_core::{
    Action, Completion, ContextOptions, IntoOutcome, ListenerContext, ListenerHandle, ListenerId,
    action,
};

// Resolution
pub use reqmux_core::{Applier, DynResolver, Resolver};

// Events and messages
pub use reqmux_core::{EventKind, Reply, RequestDetails};

// Host boundary
pub use reqmux_core::{FilterSet, HookCallback, HostHook, ReplyFn};

// Error types
pub use reqmux_core::{
    BoxError, DispatchError, ListenerError, PatternError, ReqmuxError, SubscribeError,
    UnknownEventKind,
};

pub use reqmux_std::{ALL_URLS, MatchPattern, match_listeners, matches};

/// Standard resolver implementations.
pub mod resolvers {
    #![allow(clippy::wildcard_imports)]
    pub use reqmux_std::resolvers::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use reqmux_std::testing::*;
}

/// Prelude module - common imports for reqmux.
///
/// # Usage
///
/// ```rust,ignore
/// use reqmux::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Action, BoxError, Completion, ContextOptions, DispatchError, EventKind, HostHook,
        ListenerHandle, Reply, ReqmuxError, RequestDetails, Resolver, SubscribeError,
        Subscription, WebRequest, action,
        resolvers::{FnResolver, LatestWins, resolver_fn},
    };
}
