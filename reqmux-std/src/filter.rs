//! Filter aggregation.

use crate::registry::Listener;
use reqmux_core::FilterSet;

/// The union of the patterns of `listeners`, in the order they appear.
///
/// Always computed from scratch: a pattern stays exactly as long as at least
/// one listener still needs it.
pub fn aggregate<'a, I>(listeners: I) -> FilterSet
where
    I: IntoIterator<Item = &'a Listener>,
{
    listeners
        .into_iter()
        .flat_map(|listener| listener.patterns().iter().map(|p| p.as_str()))
        .collect()
}
