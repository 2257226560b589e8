//! Page signals
//!
//! What a single fetched page contributes to a crawl: validated addresses
//! and whether it carries a contact form.

use std::collections::BTreeSet;

use crate::{extract_emails, filter_emails, has_contact_form};

/// Contact evidence found on one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageSignals {
    /// Addresses that passed validation
    pub emails: BTreeSet<String>,
    /// Whether an outreach form was present
    pub contact_form: bool,
}

impl PageSignals {
    /// Run extraction, validation and form detection over `html`
    pub fn from_html(html: &str) -> Self {
        Self {
            emails: filter_emails(&extract_emails(html)),
            contact_form: has_contact_form(html),
        }
    }

    /// Whether the page yielded anything usable
    pub fn is_useful(&self) -> bool {
        !self.emails.is_empty() || self.contact_form
    }
}
