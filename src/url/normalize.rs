use crate::url::{Origin, PageUrl};

/// Normalizes an href into a same-origin page URL
///
/// # Normalization Steps
///
/// 1. Accept only hrefs that start with "/" or already contain the origin
/// 2. Resolve: hrefs containing "http" are taken as absolute; anything else
///    is joined onto the origin (trailing slash of the origin and leading
///    slashes of the href are trimmed, one "/" joins them)
/// 3. Drop everything from the first "#" onward
/// 4. Reject the result unless it still contains the origin
///
/// # Arguments
///
/// * `href` - The raw href attribute value
/// * `origin` - The site origin
///
/// # Returns
///
/// * `Some(PageUrl)` - The normalized same-origin URL
/// * `None` - The href points off-site or is not origin-relative
///
/// # Examples
///
/// ```
/// use page_harvest::url::{normalize, Origin};
///
/// let origin = Origin::parse("https://example.org/").unwrap();
/// let url = normalize("/forecast/today#map", &origin).unwrap();
/// assert_eq!(url.as_str(), "https://example.org/forecast/today");
/// assert!(normalize("https://other.example/x", &origin).is_none());
/// ```
pub fn normalize(href: &str, origin: &Origin) -> Option<PageUrl> {
    let href = href.trim();

    if !href.starts_with('/') && !origin.contains(href) {
        return None;
    }

    let resolved = resolve(href, origin).into_string();
    let without_fragment = match resolved.find('#') {
        Some(idx) => &resolved[..idx],
        None => resolved.as_str(),
    };

    if !origin.contains(without_fragment) {
        return None;
    }

    Some(PageUrl::new(without_fragment))
}

/// Resolves an href to an absolute URL without any same-origin filtering
///
/// Used for document and image references, which may live off-site.
pub fn resolve(href: &str, origin: &Origin) -> PageUrl {
    let href = href.trim();

    if href.contains("http") {
        PageUrl::new(href)
    } else {
        PageUrl::new(format!(
            "{}/{}",
            origin.trimmed(),
            href.trim_start_matches('/')
        ))
    }
}
