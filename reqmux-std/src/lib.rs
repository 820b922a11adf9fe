//! # reqmux-std
//!
//! Standard implementations for the reqmux request-hook multiplexer.
//!
//! This crate provides:
//! - **Pattern matching**: [`MatchPattern`], [`matches`]
//! - **Listener registry**: [`ListenerRegistry`], [`match_listeners`]
//! - **Filter aggregation**: [`aggregate`]
//! - **Standard resolvers**: [`LatestWins`], [`FnResolver`], [`TracingResolver`],
//!   and `TimeoutResolver` with the `timeout` feature
//! - **Testing**: [`testing::MockHost`], [`testing::RecordingAction`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use reqmux_core;

// Modules
pub mod filter;
pub mod pattern;
pub mod registry;
pub mod resolvers;
pub mod testing;

pub use filter::aggregate;
pub use pattern::{ALL_URLS, MatchPattern, matches};
pub use registry::{Listener, ListenerRegistry, Rebind, match_listeners};
pub use resolvers::{FnResolver, LatestWins, TracingResolver, resolver_fn};

#[cfg(feature = "timeout")]
pub use resolvers::{TimeoutError, TimeoutResolver};
