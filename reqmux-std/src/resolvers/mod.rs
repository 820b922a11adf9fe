//! Standard resolvers.
//!
//! - [`LatestWins`]: the default policy, one listener decides.
//! - [`FnResolver`]: any async closure over the appliers.
//! - [`TracingResolver`]: wraps a resolver in a `tracing` span.
//! - `TimeoutResolver`: bounds a resolver's running time (`timeout` feature).

mod func;
mod latest;
mod tracing;

#[cfg(feature = "timeout")]
mod timeout;

pub use self::tracing::TracingResolver;
pub use func::{FnResolver, resolver_fn};
pub use latest::LatestWins;

#[cfg(feature = "timeout")]
pub use timeout::{TimeoutError, TimeoutResolver};
