//! Per-session engines.

use crate::dispatch::WebRequest;
use parking_lot::RwLock;
use reqmux_core::HostHook;
use std::{collections::HashMap, hash::Hash};

/// One [`WebRequest`] per session key.
///
/// A plain value owned by the caller; there is no process-wide instance.
pub struct Sessions<K, H: HostHook> {
    engines: RwLock<HashMap<K, WebRequest<H>>>,
}

impl<K, H> Sessions<K, H>
where
    K: Eq + Hash,
    H: HostHook,
{
    /// No sessions yet.
    pub fn new() -> Self {
        Self {
            engines: RwLock::new(HashMap::new()),
        }
    }

    /// The engine for `key`, created with a host from `make_host` on first
    /// use.
    pub fn attach<F>(&self, key: K, make_host: F) -> WebRequest<H>
    where
        F: FnOnce() -> H,
    {
        if let Some(engine) = self.engines.read().get(&key) {
            return engine.clone();
        }
        self.engines
            .write()
            .entry(key)
            .or_insert_with(|| WebRequest::new(make_host()))
            .clone()
    }

    /// The engine for `key`, if one was attached.
    pub fn get(&self, key: &K) -> Option<WebRequest<H>> {
        self.engines.read().get(key).cloned()
    }

    /// Forgets the engine for `key`.
    ///
    /// Hooks stay bound on the host; once every clone of the engine is
    /// dropped they answer with the neutral reply.
    pub fn detach(&self, key: &K) -> Option<WebRequest<H>> {
        self.engines.write().remove(key)
    }

    /// Number of attached sessions.
    pub fn len(&self) -> usize {
        self.engines.read().len()
    }

    /// Whether no session is attached.
    pub fn is_empty(&self) -> bool {
        self.engines.read().is_empty()
    }
}

impl<K, H> Default for Sessions<K, H>
where
    K: Eq + Hash,
    H: HostHook,
{
    fn default() -> Self {
        Self::new()
    }
}
