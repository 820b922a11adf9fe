//! Listener registry.
//!
//! Owns every [`Listener`] per [`EventKind`], assigns registration order and
//! keeps each kind's aggregated [`FilterSet`] current. Every mutation reports
//! the [`Rebind`] the host hook needs; the registry itself never talks to
//! the host.

use crate::{filter::aggregate, pattern::MatchPattern};
use reqmux_core::{
    Action, Applier, ContextOptions, EventKind, FilterSet, ListenerContext, ListenerHandle,
    ListenerId, RequestDetails, SubscribeError,
};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use url::Url;

static NEXT_ORDER: AtomicU64 = AtomicU64::new(1);

/// Next registration order. Shared by every kind and every registry in the
/// process; never returns the same value twice.
pub fn next_order() -> u64 {
    NEXT_ORDER.fetch_add(1, Ordering::Relaxed)
}

/// A registered subscriber.
pub struct Listener {
    id: ListenerId,
    kind: EventKind,
    patterns: Vec<MatchPattern>,
    action: Arc<dyn Action>,
    context: ListenerContext,
}

impl Listener {
    /// Stable identifier, used for removal.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// The event kind this listener was registered for.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Parsed URL patterns, deduplicated.
    pub fn patterns(&self) -> &[MatchPattern] {
        &self.patterns
    }

    /// Registration order and caller-supplied options.
    pub fn context(&self) -> &ListenerContext {
        &self.context
    }

    /// Whether any of the listener's patterns matches `url`.
    pub fn matches(&self, url: &Url) -> bool {
        self.patterns.iter().any(|p| p.matches_url(url))
    }

    /// Binds the listener to one request without running it.
    pub fn applier(&self, details: &Arc<RequestDetails>) -> Applier {
        Applier::new(
            self.context.clone(),
            Arc::clone(&self.action),
            Arc::clone(details),
        )
    }

    /// The caller-facing view of this listener.
    pub fn handle(&self) -> ListenerHandle {
        ListenerHandle {
            id: self.id,
            kind: self.kind,
            urls: self.patterns.iter().map(|p| p.as_str().to_string()).collect(),
            context: self.context.clone(),
        }
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("patterns", &self.patterns)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

/// What the host hook needs after a registry mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rebind {
    /// Bind (or re-bind) the hook with this filter.
    Register(FilterSet),
    /// The kind has no listeners left; detach the hook.
    Unregister,
    /// The hook's filter did not change.
    Unchanged,
}

#[derive(Default)]
struct KindEntry {
    // Keyed by registration order, so iteration is registration order.
    listeners: BTreeMap<u64, Arc<Listener>>,
    filters: FilterSet,
}

impl KindEntry {
    /// Recomputes the filter and reports whether it changed.
    fn refresh(&mut self) -> Rebind {
        let filters = aggregate(self.listeners.values().map(Arc::as_ref));
        if filters == self.filters {
            return Rebind::Unchanged;
        }
        self.filters = filters.clone();
        Rebind::Register(filters)
    }
}

/// Every listener, grouped by event kind.
#[derive(Default)]
pub struct ListenerRegistry {
    kinds: BTreeMap<EventKind, KindEntry>,
    index: HashMap<ListenerId, (EventKind, u64)>,
}

impl ListenerRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a listener for `kind`.
    ///
    /// Duplicate patterns are collapsed. `options` cannot influence the
    /// assigned order.
    pub fn add(
        &mut self,
        kind: EventKind,
        patterns: Vec<MatchPattern>,
        action: Arc<dyn Action>,
        options: ContextOptions,
    ) -> Result<(ListenerHandle, Rebind), SubscribeError> {
        if patterns.is_empty() {
            return Err(SubscribeError::EmptyFilter);
        }
        let mut unique: Vec<MatchPattern> = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            if !unique.contains(&pattern) {
                unique.push(pattern);
            }
        }

        let order = next_order();
        let listener = Arc::new(Listener {
            id: ListenerId::new(),
            kind,
            patterns: unique,
            action,
            context: options.into_context(order),
        });
        let handle = listener.handle();

        let entry = self.kinds.entry(kind).or_default();
        entry.listeners.insert(order, listener);
        self.index.insert(handle.id, (kind, order));
        // A new kind starts from an empty filter, so its first listener
        // always registers.
        let rebind = entry.refresh();

        tracing::debug!(
            %kind,
            id = %handle.id,
            order,
            origin = handle.context.origin.as_deref().unwrap_or(""),
            "listener added"
        );
        Ok((handle, rebind))
    }

    /// Removes listener `id` from `kind`.
    ///
    /// Unknown ids, ids registered under another kind and unknown kinds are
    /// ignored.
    pub fn remove(&mut self, kind: EventKind, id: ListenerId) -> Rebind {
        let Some(&(registered, order)) = self.index.get(&id) else {
            return Rebind::Unchanged;
        };
        if registered != kind {
            return Rebind::Unchanged;
        }
        let Some(entry) = self.kinds.get_mut(&kind) else {
            return Rebind::Unchanged;
        };

        entry.listeners.remove(&order);
        self.index.remove(&id);
        tracing::debug!(%kind, %id, "listener removed");

        if entry.listeners.is_empty() {
            self.kinds.remove(&kind);
            return Rebind::Unregister;
        }
        entry.refresh()
    }

    /// Drops every listener of `kind`, returning how many there were.
    pub fn clear(&mut self, kind: EventKind) -> usize {
        let Some(entry) = self.kinds.remove(&kind) else {
            return 0;
        };
        for listener in entry.listeners.values() {
            self.index.remove(&listener.id);
        }
        tracing::debug!(%kind, count = entry.listeners.len(), "listeners cleared");
        entry.listeners.len()
    }

    /// Whether `kind` has at least one listener.
    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.kinds.contains_key(&kind)
    }

    /// Listeners of `kind`, in registration order.
    pub fn listeners_for(&self, kind: EventKind) -> Vec<Arc<Listener>> {
        self.kinds
            .get(&kind)
            .map(|entry| entry.listeners.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Aggregated filter of `kind`; `None` once the kind has no listeners.
    pub fn filters_for(&self, kind: EventKind) -> Option<&FilterSet> {
        self.kinds.get(&kind).map(|entry| &entry.filters)
    }

    /// Snapshot of every listener, per kind, in registration order.
    pub fn all_listeners(&self) -> BTreeMap<EventKind, Vec<ListenerHandle>> {
        self.kinds
            .iter()
            .map(|(kind, entry)| {
                let handles = entry.listeners.values().map(|l| l.handle()).collect();
                (*kind, handles)
            })
            .collect()
    }

    /// Snapshot of every aggregated filter.
    pub fn all_filters(&self) -> BTreeMap<EventKind, FilterSet> {
        self.kinds
            .iter()
            .map(|(kind, entry)| (*kind, entry.filters.clone()))
            .collect()
    }

    /// Listeners of `kind` interested in `url`, in registration order.
    pub fn match_listeners(&self, kind: EventKind, url: &str) -> Vec<Arc<Listener>> {
        match self.kinds.get(&kind) {
            Some(entry) => match_listeners(url, entry.listeners.values()),
            None => Vec::new(),
        }
    }

    /// Total number of listeners across all kinds.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether no kind has a listener.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// The subset of `listeners` with at least one pattern matching `url`,
/// sorted by ascending registration order.
///
/// A URL that does not parse matches nothing.
pub fn match_listeners<'a, I>(url: &str, listeners: I) -> Vec<Arc<Listener>>
where
    I: IntoIterator<Item = &'a Arc<Listener>>,
{
    let Ok(url) = Url::parse(url) else {
        return Vec::new();
    };
    let mut matched: Vec<Arc<Listener>> = listeners
        .into_iter()
        .filter(|listener| listener.matches(&url))
        .cloned()
        .collect();
    matched.sort_by_key(|listener| listener.context.order);
    matched
}
