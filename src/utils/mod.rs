//! Utility functions and helpers.

pub mod http;

use scraper::ElementRef;
use url::Url;

/// Resolve a potentially relative URL against a base URL.
pub fn resolve_url(base: &Url, href: &str) -> String {
    base.join(href)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Visible text of an element with whitespace collapsed.
///
/// Text nodes are space-joined, so `<h3>Leitura<br>da Bíblia</h3>` reads as
/// "Leitura da Bíblia".
pub fn element_text(element: &ElementRef<'_>) -> String {
    let joined = element.text().collect::<Vec<_>>().join(" ");
    normalize_whitespace(&joined)
}

/// Last non-empty path segment of a URL, used as a short label in logs.
pub fn url_label(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(url)
        .to_string()
}
