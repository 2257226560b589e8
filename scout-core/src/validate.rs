//! Address validation
//!
//! Static HTML and ad/analytics snippets are full of strings that look like
//! addresses but are useless for outreach: asset names with an `@2x`
//! suffix, tracker domains, noreply mailboxes. The policy here rejects
//! those. It errs toward rejecting: a missed address is cheaper than a
//! bogus one.

use std::collections::BTreeSet;
use std::sync::LazyLock;

/// Top-level domains accepted by default
pub const DEFAULT_ACCEPTED_TLDS: &[&str] = &["com", "org", "net", "edu", "co", "io"];

/// File extensions that mark a match as an asset reference
pub const ASSET_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "svg", "css", "js", "webp", "html"];

/// Substrings of known non-outreach infrastructure (case-insensitive)
pub const DEFAULT_DENYLIST: &[&str] = &[
    "sentry",
    "wixpress",
    "cloudflare",
    "gravatar",
    "@e.com",
    "@aset.",
    "@ar.com",
    "noreply@",
    "no-reply@",
    "amazonaws",
    "akamai",
    "doubleclick",
    "pagead2.",
    "googlemail",
    "wh@sapp.com",
    "buyth@hotel.com",
    "example.org",
];

static DEFAULT_POLICY: LazyLock<AddressPolicy> = LazyLock::new(AddressPolicy::default);

/// Acceptance rules for candidate addresses
#[derive(Debug, Clone)]
pub struct AddressPolicy {
    /// Accepted final domain labels
    pub accepted_tlds: Vec<String>,
    /// Lowercase substrings that reject an address outright
    pub denylist: Vec<String>,
}

impl Default for AddressPolicy {
    fn default() -> Self {
        Self {
            accepted_tlds: DEFAULT_ACCEPTED_TLDS.iter().map(|s| s.to_string()).collect(),
            denylist: DEFAULT_DENYLIST.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AddressPolicy {
    pub fn with_tld(mut self, tld: &str) -> Self {
        self.accepted_tlds.push(tld.trim_start_matches('.').to_lowercase());
        self
    }

    pub fn with_denied(mut self, fragment: &str) -> Self {
        self.denylist.push(fragment.to_lowercase());
        self
    }

    /// Check a single candidate against every rule
    pub fn accepts(&self, candidate: &str) -> bool {
        let email = candidate.trim().to_lowercase();

        let mut parts = email.split('@');
        let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
            return false;
        };

        if local.len() < 3 || local.starts_with('.') || local.ends_with('.') {
            return false;
        }

        if local.starts_with("www.") {
            return false;
        }

        let first_label = domain.split('.').next().unwrap_or_default();
        if first_label.len() < 3 {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == '_')
        {
            return false;
        }

        let Some((_, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        if !self.accepted_tlds.iter().any(|accepted| accepted == tld) {
            return false;
        }

        if ASSET_EXTENSIONS
            .iter()
            .any(|ext| email.ends_with(&format!(".{ext}")))
        {
            return false;
        }

        if self.denylist.iter().any(|bad| email.contains(bad.as_str())) {
            return false;
        }

        if email.contains("http%3") || email.contains("https%3") {
            return false;
        }

        true
    }

    /// Keep only accepted candidates
    pub fn filter<'a, I>(&self, candidates: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a String>,
    {
        candidates
            .into_iter()
            .filter(|c| self.accepts(c))
            .map(|c| c.trim().to_lowercase())
            .collect()
    }
}

/// Check a candidate against the default policy
pub fn is_valid(candidate: &str) -> bool {
    DEFAULT_POLICY.accepts(candidate)
}

/// Filter a candidate set with the default policy
pub fn filter_emails(candidates: &BTreeSet<String>) -> BTreeSet<String> {
    DEFAULT_POLICY.filter(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_address() {
        assert!(is_valid("info@example.com"));
        assert!(is_valid("Editor@Magazine.IO"));
    }

    #[test]
    fn test_short_parts_rejected() {
        assert!(!is_valid("ab@xy.com"));
        assert!(!is_valid("abc@xy.com"));
    }

    #[test]
    fn test_denylist() {
        assert!(!is_valid("tracker@doubleclick.net"));
        assert!(!is_valid("noreply@company.com"));
        assert!(!is_valid("abc123@sentry.wixpress.com"));
    }

    #[test]
    fn test_asset_like_strings_rejected() {
        assert!(!is_valid("a@b.com/logo.png"));
        assert!(!is_valid("logo@site.com.png"));
        assert!(!is_valid("icon@2x.webp"));
    }

    #[test]
    fn test_tld_allow_list() {
        assert!(!is_valid("hello@company.de"));
        assert!(AddressPolicy::default().with_tld("de").accepts("hello@company.de"));
    }

    #[test]
    fn test_url_shaped_rejected() {
        assert!(!is_valid("www.site@company.com"));
        assert!(!is_valid("https%3a%2f%2fsite@company.com"));
        assert!(!is_valid("one@two@three.com"));
        assert!(!is_valid(".dotted@company.com"));
    }

    #[test]
    fn test_extended_denylist() {
        let policy = AddressPolicy::default().with_denied("Mailchimp");
        assert!(!policy.accepts("bounce@mailchimp.com"));
        assert!(policy.accepts("bounce@mailer.com"));
    }

    #[test]
    fn test_filter_set() {
        let candidates: BTreeSet<String> = ["info@example.com", "ab@xy.com", "team@news.io"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let kept = filter_emails(&candidates);
        assert_eq!(kept.len(), 2);
        assert!(kept.contains("team@news.io"));
    }
}
