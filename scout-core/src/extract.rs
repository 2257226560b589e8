//! Email extraction from page markup
//!
//! Addresses are pulled from four places and merged into one set:
//! the raw markup, the visible text, the `<footer>` subtree and
//! `mailto:` anchors. Every source goes through [`normalize`] first.

use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::normalize;

/// Address-shaped pattern, applied to normalized (lowercase) text
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}").unwrap());

static FOOTER_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("footer").unwrap());

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());

/// Extract every candidate address from an HTML document.
///
/// The result is unvalidated; run it through [`crate::filter_emails`]
/// before trusting it.
pub fn extract_emails(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);

    let mut found = find_addresses(html);
    found.extend(find_addresses(&visible_text(&document)));
    found.extend(footer_emails(&document));
    found.extend(mailto_emails(&document));
    found
}

/// Collect all non-overlapping address matches from `text`.
///
/// Matches over the normalized text are merged with matches over the
/// merely lowercased text, so a literal address survives even when a
/// rewrite around it changes its neighbourhood.
pub fn find_addresses(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    let cleaned = normalize(&lowered);

    let mut found: BTreeSet<String> = EMAIL_REGEX
        .find_iter(&cleaned)
        .map(|m| m.as_str().to_string())
        .collect();
    found.extend(EMAIL_REGEX.find_iter(&lowered).map(|m| m.as_str().to_string()));
    found
}

/// Addresses inside the first `<footer>` element, if any.
pub fn footer_emails(document: &Html) -> BTreeSet<String> {
    match document.select(&FOOTER_SELECTOR).next() {
        Some(footer) => {
            let mut found = find_addresses(&footer.html());
            found.extend(find_addresses(&element_text(footer)));
            found
        }
        None => BTreeSet::new(),
    }
}

/// Addresses named by `mailto:` anchors, with any query stripped.
pub fn mailto_emails(document: &Html) -> BTreeSet<String> {
    let mut found = BTreeSet::new();

    for anchor in document.select(&ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let href = href.trim();

        let Some(rest) = href
            .get(..7)
            .filter(|scheme| scheme.eq_ignore_ascii_case("mailto:"))
            .map(|_| &href[7..])
        else {
            continue;
        };

        let target = rest.split('?').next().unwrap_or_default();
        let decoded = urlencoding::decode(target)
            .map(|d| d.into_owned())
            .unwrap_or_else(|_| target.to_string());

        found.extend(find_addresses(&decoded));
    }

    found
}

/// Visible text of the document body, text nodes joined by single spaces
fn visible_text(document: &Html) -> String {
    element_text(document.root_element())
}

fn element_text(root: ElementRef<'_>) -> String {
    let mut text_parts = Vec::new();

    for node_ref in root.descendants() {
        if let Node::Text(text_node) = node_ref.value() {
            let in_excluded = node_ref.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .map(|el| matches!(el.name(), "script" | "style" | "noscript"))
                    .unwrap_or(false)
            });

            if !in_excluded {
                let trimmed = text_node.trim();
                if !trimmed.is_empty() {
                    text_parts.push(trimmed);
                }
            }
        }
    }

    text_parts.join(" ")
}
