//! Contact-form detection
//!
//! Only a fallback signal: it matters when a crawl ends without a single
//! validated address.

use scraper::{Html, Selector};
use std::sync::LazyLock;

/// Words that mark a `<form>` as an outreach form
pub const FORM_KEYWORDS: &[&str] = &[
    "contact", "write", "submit", "reach", "message", "enquiry", "feedback", "support", "join",
];

static FORM_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("form").unwrap());

/// True if any `<form>` element's own markup carries an outreach keyword
pub fn has_contact_form(html: &str) -> bool {
    let document = Html::parse_document(html);

    document.select(&FORM_SELECTOR).any(|form| {
        let markup = form.html().to_lowercase();
        FORM_KEYWORDS.iter().any(|kw| markup.contains(kw))
    })
}
