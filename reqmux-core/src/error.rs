//! Error types for reqmux.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`ReqmuxError`] - Top-level error type
//! - [`SubscribeError`] - Rejected subscriptions
//! - [`PatternError`] - Malformed match patterns
//! - [`ListenerError`] - Failures of a single listener's action
//! - [`DispatchError`] - Failures while producing a reply

use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all reqmux operations.
#[derive(Error, Debug)]
pub enum ReqmuxError {
    /// A subscription was rejected.
    #[error("subscribe error: {0}")]
    Subscribe(#[from] SubscribeError),

    /// Dispatching a request failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A listener failed.
    #[error("listener error: {0}")]
    Listener(#[from] ListenerError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// A subscription that was refused at the call site.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubscribeError {
    /// The URL filter holds no pattern.
    #[error("url filter must contain at least one pattern")]
    EmptyFilter,

    /// One of the patterns is malformed.
    #[error(transparent)]
    InvalidPattern(#[from] PatternError),

    /// A filter or context was given without an action.
    #[error("subscription for {kind} has a filter but no action")]
    MissingAction {
        /// The hook the subscription targeted.
        kind: crate::EventKind,
    },
}

/// Reasons a match pattern fails to parse.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// Nothing to parse.
    #[error("match pattern is empty")]
    Empty,

    /// No `://` between scheme and host.
    #[error("match pattern `{0}` is missing `://`")]
    MissingSeparator(String),

    /// The scheme is neither `*` nor a well-formed scheme name.
    #[error("match pattern `{pattern}` has an invalid scheme `{scheme}`")]
    InvalidScheme {
        /// The offending pattern.
        pattern: String,
        /// The scheme as written.
        scheme: String,
    },

    /// The host is empty (outside `file`), a bare `*.`, or holds `?`, `#` or `@`.
    #[error("match pattern `{pattern}` has an invalid host `{host}`")]
    InvalidHost {
        /// The offending pattern.
        pattern: String,
        /// The host as written.
        host: String,
    },

    /// The pattern contains whitespace.
    #[error("match pattern `{0}` contains whitespace")]
    Whitespace(String),

    /// The glob did not translate to a valid regular expression.
    #[error("match pattern `{pattern}` could not be compiled: {reason}")]
    Compile {
        /// The offending pattern.
        pattern: String,
        /// The regex engine's message.
        reason: String,
    },
}

/// Failure of one listener's action for one request.
#[derive(Error, Debug)]
pub enum ListenerError {
    /// The action returned an error before completing.
    #[error("listener action failed: {0}")]
    Failed(#[source] BoxError),

    /// The action panicked.
    #[error("listener action panicked: {0}")]
    Panicked(String),

    /// The completion was dropped without a reply.
    #[error("listener dropped its completion without replying")]
    Abandoned,
}

/// Failure while producing the reply for a request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The resolver for the event kind failed.
    #[error("resolver for {kind} failed")]
    Resolver {
        /// The hook being dispatched.
        kind: crate::EventKind,
        #[source]
        source: BoxError,
    },
}

impl From<BoxError> for ReqmuxError {
    fn from(err: BoxError) -> Self {
        ReqmuxError::Custom(err)
    }
}

impl From<BoxError> for ListenerError {
    fn from(err: BoxError) -> Self {
        ListenerError::Failed(err)
    }
}

impl From<PatternError> for ReqmuxError {
    fn from(err: PatternError) -> Self {
        ReqmuxError::Subscribe(err.into())
    }
}
