//! The aggregated URL filter handed to the host.

use std::slice;

/// A duplicate-free set of match patterns.
///
/// Iteration follows first insertion, so the same listeners always produce
/// the same filter for the host. Equality ignores that order: two sets are
/// equal when they hold the same patterns.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    urls: Vec<String>,
}

impl FilterSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `url`; returns `false` if it was already present.
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.contains(&url) {
            return false;
        }
        self.urls.push(url);
        true
    }

    /// Whether `url` is already in the set.
    pub fn contains(&self, url: &str) -> bool {
        self.urls.iter().any(|u| u == url)
    }

    /// Number of distinct patterns.
    pub fn len(&self) -> usize {
        self.urls.len()
    }

    /// Whether the set holds no patterns.
    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    /// Patterns in first-insertion order.
    pub fn iter(&self) -> slice::Iter<'_, String> {
        self.urls.iter()
    }

    /// Patterns in first-insertion order.
    pub fn as_slice(&self) -> &[String] {
        &self.urls
    }

    /// The patterns, in the order the host receives them.
    pub fn into_vec(self) -> Vec<String> {
        self.urls
    }
}

impl PartialEq for FilterSet {
    fn eq(&self, other: &Self) -> bool {
        // Both sides are duplicate-free.
        self.len() == other.len() && self.urls.iter().all(|url| other.contains(url))
    }
}

impl Eq for FilterSet {}

impl<S: Into<String>> FromIterator<S> for FilterSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = FilterSet::new();
        set.extend(iter);
        set
    }
}

impl<S: Into<String>> Extend<S> for FilterSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for url in iter {
            self.insert(url);
        }
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a String;
    type IntoIter = slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.urls.iter()
    }
}
