//! Link discovery
//!
//! Pulls anchor targets off a page, makes them absolute and keeps only the
//! ones whose URL hints at an outreach page.

use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// URL fragments that make a link worth crawling
pub const CRAWL_KEYWORDS: &[&str] = &["contact", "write", "guest", "submit"];

/// [`CRAWL_KEYWORDS`] plus about and editor pages
pub const EXTENDED_CRAWL_KEYWORDS: &[&str] =
    &["contact", "write", "guest", "submit", "about", "editor"];

const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:"];

static LINK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Resolve an `href` against the page's directory, falling back to the
/// site base when the page URL does not parse.
///
/// Dot segments are collapsed and the fragment dropped, so equivalent
/// spellings of one page resolve to one URL. Returns `None` for empty,
/// fragment-only and non-navigational links.
pub fn resolve_link(href: &str, base: &str, page_path: &str) -> Option<String> {
    let link = href.trim();
    if link.is_empty() || link.starts_with('#') {
        return None;
    }

    let lower = link.to_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    let anchor = Url::parse(page_path)
        .or_else(|_| Url::parse(&format!("{}/", base.trim_end_matches('/'))))
        .ok()?;
    let mut resolved = anchor.join(link).ok()?;

    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    resolved.set_fragment(None);

    Some(resolved.to_string())
}

/// Discover crawl-relevant links using [`CRAWL_KEYWORDS`]
pub fn discover_links(html: &str, base: &str, page_path: &str) -> Vec<String> {
    discover_links_with(html, base, page_path, CRAWL_KEYWORDS)
}

/// Discover links whose lowercased URL contains one of `keywords`.
///
/// Output is in document order with duplicates removed.
pub fn discover_links_with(
    html: &str,
    base: &str,
    page_path: &str,
    keywords: &[&str],
) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Some(url) = resolve_link(href, base, page_path) else {
            continue;
        };

        let lower = url.to_lowercase();
        if !keywords.iter().any(|kw| lower.contains(kw)) {
            continue;
        }

        if seen.insert(url.clone()) {
            links.push(url);
        }
    }

    links
}
