use crate::url::PageUrl;
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Pages already claimed for extraction during this run
///
/// Claiming is a single insert under the lock, so two workers racing for the
/// same URL cannot both win. The set only grows.
#[derive(Debug, Default)]
pub struct VisitedSet {
    inner: Mutex<HashSet<PageUrl>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a URL as visited
    ///
    /// Returns true if the caller now owns the URL, false if another caller
    /// claimed it first.
    pub fn claim(&self, url: &PageUrl) -> bool {
        let mut visited = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        visited.insert(url.clone())
    }

    pub fn contains(&self, url: &PageUrl) -> bool {
        let visited = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        visited.contains(url)
    }

    pub fn len(&self) -> usize {
        let visited = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
