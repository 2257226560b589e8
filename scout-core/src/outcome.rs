//! Crawl results
//!
//! `Outcome` is the typed terminal state of a crawl; `DiscoveryReport` is the
//! JSON shape handed back to callers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::prioritize;

/// Reported in place of an address when only a contact form was found
pub const CONTACT_FORM_LABEL: &str = "Contact Form";

/// Reported when neither an address nor a form was found
pub const NO_EMAIL_LABEL: &str = "No Email";

/// How a page's HTML was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderedVia {
    Static,
    Headless,
}

/// The result of one fetch attempt
#[derive(Debug, Clone)]
pub struct PageContent {
    pub url: String,
    pub html: String,
    pub rendered_via: RenderedVia,
}

impl PageContent {
    pub fn new(url: &str, html: String, rendered_via: RenderedVia) -> Self {
        Self {
            url: url.to_string(),
            html,
            rendered_via,
        }
    }
}

/// Terminal result of a crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// At least one address survived validation; both lists are sorted
    EmailsFound {
        priority: Vec<String>,
        others: Vec<String>,
    },
    /// No address, but an outreach form was seen
    ContactFormFound,
    NoneFound,
}

impl Outcome {
    /// Build the outcome from a crawl's accumulators
    pub fn from_accumulators(emails: &BTreeSet<String>, contact_form: bool) -> Self {
        if !emails.is_empty() {
            let (priority, others) = prioritize(emails);
            Outcome::EmailsFound { priority, others }
        } else if contact_form {
            Outcome::ContactFormFound
        } else {
            Outcome::NoneFound
        }
    }

    /// The single reproducible pick: smallest priority address, else smallest other
    pub fn best_email(&self) -> Option<&str> {
        match self {
            Outcome::EmailsFound { priority, others } => priority
                .first()
                .or_else(|| others.first())
                .map(String::as_str),
            _ => None,
        }
    }

    /// Every validated address, priority ones first
    pub fn all_emails(&self) -> Vec<String> {
        match self {
            Outcome::EmailsFound { priority, others } => {
                priority.iter().chain(others.iter()).cloned().collect()
            }
            _ => Vec::new(),
        }
    }
}

/// Per-URL response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiscoveryReport {
    Contact { email: String, emails: Vec<String> },
    Error { error: String },
}

impl DiscoveryReport {
    pub fn error(message: impl Into<String>) -> Self {
        DiscoveryReport::Error {
            error: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DiscoveryReport::Error { .. })
    }
}

impl From<&Outcome> for DiscoveryReport {
    fn from(outcome: &Outcome) -> Self {
        let email = match outcome {
            Outcome::EmailsFound { .. } => outcome.best_email().unwrap_or(NO_EMAIL_LABEL),
            Outcome::ContactFormFound => CONTACT_FORM_LABEL,
            Outcome::NoneFound => NO_EMAIL_LABEL,
        };

        DiscoveryReport::Contact {
            email: email.to_string(),
            emails: outcome.all_emails(),
        }
    }
}
