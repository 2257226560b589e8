//! Outreach prioritization
//!
//! Splits validated addresses into ones that look like they welcome external
//! contact and the rest. Nothing is discarded.

/// Local-part fragments that mark an outreach address
pub const OUTREACH_KEYWORDS: &[&str] = &[
    "editor", "contact", "info", "submit", "guest", "write", "pitch", "tip", "team",
];

/// Whether the local part of `email` carries an outreach keyword
pub fn is_outreach_address(email: &str) -> bool {
    let local = email.split('@').next().unwrap_or_default().to_lowercase();
    OUTREACH_KEYWORDS.iter().any(|kw| local.contains(kw))
}

/// Partition addresses into `(priority, others)`.
///
/// Both lists are sorted so the first element of either is a reproducible
/// "best" pick.
pub fn prioritize<'a, I>(emails: I) -> (Vec<String>, Vec<String>)
where
    I: IntoIterator<Item = &'a String>,
{
    let (mut priority, mut others): (Vec<String>, Vec<String>) = emails
        .into_iter()
        .cloned()
        .partition(|email| is_outreach_address(email));

    priority.sort();
    priority.dedup();
    others.sort();
    others.dedup();

    (priority, others)
}
