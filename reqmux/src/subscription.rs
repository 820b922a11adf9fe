//! Call-shape normalization for the `on_*` convenience methods.

use reqmux_core::{Action, ContextOptions, EventKind, SubscribeError};
use reqmux_std::ALL_URLS;
use std::{fmt, sync::Arc};

/// What a caller passes to one of the `on_*` methods.
///
/// ```rust,ignore
/// // Every URL.
/// web.on_completed(Subscription::new(log_it))?;
/// // Only some URLs, with a priority.
/// web.on_before_request(
///     Subscription::new(block)
///         .filter(["*://ads.example/*"])
///         .context(ContextOptions::new().with_priority(10)),
/// )?;
/// // Detach everything.
/// web.on_before_request(Subscription::unbind())?;
/// ```
#[derive(Default)]
pub struct Subscription {
    unbind: bool,
    filter: Option<Vec<String>>,
    action: Option<Arc<dyn Action>>,
    context: Option<ContextOptions>,
}

/// The canonical request a [`Subscription`] normalizes to.
pub enum Subscribe {
    /// Register one listener.
    Add {
        /// Patterns as given; `<all_urls>` when none were.
        urls: Vec<String>,
        /// What runs for matching requests.
        action: Arc<dyn Action>,
        /// Priority and origin.
        context: ContextOptions,
    },
    /// Remove every listener of the kind.
    Clear,
}

impl Subscription {
    /// Subscribes `action` to every URL.
    pub fn new(action: impl Action) -> Self {
        Self {
            action: Some(Arc::new(action)),
            ..Self::default()
        }
    }

    /// A subscription that detaches all listeners of the kind.
    pub fn unbind() -> Self {
        Self {
            unbind: true,
            ..Self::default()
        }
    }

    /// Restricts the subscription to URLs matching any of `urls`.
    pub fn filter<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = Some(urls.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the action, replacing any earlier one.
    pub fn action(mut self, action: impl Action) -> Self {
        self.action = Some(Arc::new(action));
        self
    }

    /// Sets priority and origin.
    pub fn context(mut self, context: ContextOptions) -> Self {
        self.context = Some(context);
        self
    }

    /// Resolves the call shape for `kind`.
    ///
    /// - explicit unbind, or nothing at all: [`Subscribe::Clear`]
    /// - an action: [`Subscribe::Add`], with `<all_urls>` when no filter was given
    /// - a filter or context without an action: [`SubscribeError::MissingAction`]
    pub fn normalize(self, kind: EventKind) -> Result<Subscribe, SubscribeError> {
        if self.unbind {
            return Ok(Subscribe::Clear);
        }
        match self.action {
            Some(action) => Ok(Subscribe::Add {
                urls: self.filter.unwrap_or_else(|| vec![ALL_URLS.to_string()]),
                action,
                context: self.context.unwrap_or_default(),
            }),
            None if self.filter.is_none() && self.context.is_none() => Ok(Subscribe::Clear),
            None => Err(SubscribeError::MissingAction { kind }),
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("unbind", &self.unbind)
            .field("filter", &self.filter)
            .field("action", &self.action.is_some())
            .field("context", &self.context)
            .finish()
    }
}
