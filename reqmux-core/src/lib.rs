//! # reqmux-core
//!
//! Core types for the reqmux request-hook multiplexer.
//!
//! A host platform gives each request lifecycle point a hook that accepts a
//! single callback and, for some points, expects a single reply. reqmux puts
//! many independent listeners behind each hook. This crate holds the pieces
//! every layer shares and has no opinion on matching or conflict policy.
//!
//! # Layers
//!
//! ## Host boundary ([`HostHook`])
//!
//! Where the single callback per [`EventKind`] is registered and removed.
//!
//! ## Listener ([`Action`], [`Completion`])
//!
//! A subscriber's code. It receives [`RequestDetails`] and completes with a
//! [`Reply`] fragment, possibly after its own asynchronous work.
//!
//! ## Applier ([`Applier`])
//!
//! A matched listener bound to one request but not yet run. Appliers let a
//! resolver skip listeners for free.
//!
//! ## Resolver ([`Resolver`])
//!
//! Turns the appliers of one request into the one reply the host receives.
//!
//! # Error Types
//!
//! - [`ReqmuxError`] - Top-level error type
//! - [`SubscribeError`] / [`PatternError`] - Rejected subscriptions
//! - [`ListenerError`] - A single listener's failure
//! - [`DispatchError`] - Resolver failures

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod applier;
mod error;
mod filter;
mod host;
mod kind;
mod listener;
mod message;
mod resolver;

// Re-exports
pub use applier::Applier;
pub use error::{
    BoxError, DispatchError, ListenerError, PatternError, ReqmuxError, SubscribeError,
};
pub use filter::FilterSet;
pub use host::{HookCallback, HostHook, ReplyFn};
pub use kind::{EventKind, UnknownEventKind};
pub use listener::{
    Action, Completion, ContextOptions, IntoOutcome, ListenerContext, ListenerHandle, ListenerId,
    action,
};
pub use message::{Reply, RequestDetails};
pub use resolver::{DynResolver, Resolver};
