use crate::url::PageUrl;
use std::collections::HashSet;

/// Pages discovered from the seed, in first-seen order
///
/// A membership index sits beside the ordered list so duplicate checks stay
/// O(1) while visitation order remains reproducible.
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    urls: Vec<PageUrl>,
    index: HashSet<PageUrl>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL unless already present
    ///
    /// Returns true if the URL was new.
    pub fn push(&mut self, url: PageUrl) -> bool {
        if self.index.contains(&url) {
            return false;
        }
        self.index.insert(url.clone());
        self.urls.push(url);
        true
    }

    pub fn contains(&self, url: &PageUrl) -> bool {
        self.index.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PageUrl> {
        self.urls.iter()
    }

    /// Consumes the frontier, keeping discovery order
    pub fn into_vec(self) -> Vec<PageUrl> {
        self.urls
    }
}

impl FromIterator<PageUrl> for Frontier {
    fn from_iter<I: IntoIterator<Item = PageUrl>>(iter: I) -> Self {
        let mut frontier = Self::new();
        for url in iter {
            frontier.push(url);
        }
        frontier
    }
}
