//! HTML helpers shared by discovery and extraction
//!
//! This module handles parsing rendered HTML to extract:
//! - Same-origin links to follow (from `<a href>` tags)
//! - Page title
//! - Visible element text

use crate::url::{normalize, Origin, PageUrl};
use crate::ParseError;
use scraper::{ElementRef, Html, Selector};

/// Title used when a page has no usable `<title>`
pub const UNTITLED_PAGE: &str = "Untitled Page";

/// Compiles a CSS selector, reporting failures against `url`
pub(crate) fn selector(css: &str, url: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError {
        url: url.to_string(),
        message: format!("invalid selector '{}': {:?}", css, e),
    })
}

/// Extracts every same-origin link from rendered HTML
///
/// Links are returned in document order. Duplicates are kept; callers decide
/// how to merge them.
///
/// # Example
///
/// ```
/// use page_harvest::crawler::extract_page_links;
/// use page_harvest::url::Origin;
///
/// let origin = Origin::parse("https://example.org/").unwrap();
/// let html = r#"<a href="/a">A</a><a href="https://other.example/b">B</a>"#;
/// let links = extract_page_links(html, &origin, "https://example.org/").unwrap();
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].as_str(), "https://example.org/a");
/// ```
pub fn extract_page_links(
    html: &str,
    origin: &Origin,
    page_url: &str,
) -> Result<Vec<PageUrl>, ParseError> {
    let document = Html::parse_document(html);
    let anchors = selector("a[href]", page_url)?;

    Ok(document
        .select(&anchors)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| normalize(href, origin))
        .collect())
}

/// Extracts the page title from the HTML document
pub(crate) fn extract_title(document: &Html, page_url: &str) -> Result<String, ParseError> {
    let title_selector = selector("title", page_url)?;

    Ok(document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNTITLED_PAGE.to_string()))
}

/// Returns an element's visible text with whitespace runs collapsed
pub(crate) fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
