use crate::url::Origin;

/// Maximum length of a sink key, in characters
pub const MAX_KEY_LEN: usize = 50;

/// Derives a filesystem-safe key for a page's record set
///
/// Every occurrence of the origin is removed, slashes are trimmed from both
/// ends, every character outside `[A-Za-z0-9_-]` becomes `_`, and the result
/// is cut to [`MAX_KEY_LEN`] characters. An empty result becomes `homepage`.
///
/// # Examples
///
/// ```
/// use page_harvest::url::{sink_key, Origin};
///
/// let origin = Origin::parse("https://example.org/").unwrap();
/// assert_eq!(sink_key("https://example.org/reports/2023/summary", &origin), "reports_2023_summary");
/// assert_eq!(sink_key("https://example.org/", &origin), "homepage");
/// ```
pub fn sink_key(url: &str, origin: &Origin) -> String {
    let stripped = url.replace(origin.as_str(), "");

    let key: String = stripped
        .trim_matches('/')
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .take(MAX_KEY_LEN)
        .collect();

    if key.is_empty() {
        "homepage".to_string()
    } else {
        key
    }
}
