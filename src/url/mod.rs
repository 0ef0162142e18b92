//! URL handling module for Page-Harvest
//!
//! This module provides same-origin href normalization, keyword-based topic
//! classification, and sink key derivation.

mod classify;
mod key;
mod normalize;

use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

// Re-export main functions
pub use classify::{classify, SourceClassifier, DEFAULT_TOPICS};
pub use key::{sink_key, MAX_KEY_LEN};
pub use normalize::{normalize, resolve};

/// A normalized absolute URL string
///
/// Page URLs are compared as plain strings; two hrefs that resolve to the
/// same text are the same page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageUrl(String);

impl PageUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PageUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PageUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The base URL that defines same-site membership
///
/// Membership is a substring test against the configured text, so the raw
/// string is kept exactly as given. It is still parsed once to reject
/// non-HTTP schemes and host-less values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    raw: String,
}

impl Origin {
    /// Validates and wraps an origin string
    ///
    /// # Examples
    ///
    /// ```
    /// use page_harvest::url::Origin;
    ///
    /// let origin = Origin::parse("https://example.org/").unwrap();
    /// assert_eq!(origin.trimmed(), "https://example.org");
    /// assert!(Origin::parse("ftp://example.org/").is_err());
    /// ```
    pub fn parse(raw: &str) -> UrlResult<Self> {
        let raw = raw.trim();
        let url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP and HTTPS schemes are supported, got: {}",
                url.scheme()
            )));
        }

        if url.host_str().is_none() {
            return Err(UrlError::MissingDomain);
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The origin with any trailing slashes removed
    pub fn trimmed(&self) -> &str {
        self.raw.trim_end_matches('/')
    }

    /// Returns true if `url` belongs to this site
    pub fn contains(&self, url: &str) -> bool {
        url.contains(self.raw.as_str())
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
