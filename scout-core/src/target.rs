//! Crawl targets and URL helpers

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Conventional paths where outreach pages live, visited before anything else
pub const PRIORITY_PATHS: &[&str] = &[
    "/contact",
    "/contact-us",
    "/write-for-us",
    "/guest-post",
    "/contribute",
    "/submit-guest-post",
    "/become-a-contributor",
    "/submit-post",
    "/editorial-guidelines",
];

/// Seeded after [`PRIORITY_PATHS`] when about pages are enabled
pub const ABOUT_PATH: &str = "/about";

/// Errors from turning caller input into a crawl target
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// A start URL plus the scheme+host it resolves against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlTarget {
    /// The start URL, scheme included and host lowercased
    pub url: String,
    /// `scheme://host[:port]`, no trailing slash
    pub base: String,
    host: String,
}

impl CrawlTarget {
    /// Parse caller input; a missing scheme defaults to `https://`
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(TargetError::InvalidUrl(input.to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();
        let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
            trimmed.to_string()
        } else {
            format!("https://{}", trimmed)
        };

        let parsed =
            Url::parse(&with_scheme).map_err(|e| TargetError::InvalidUrl(format!("{trimmed}: {e}")))?;

        let host = parsed
            .host_str()
            .ok_or_else(|| TargetError::InvalidUrl(trimmed.to_string()))?
            .to_lowercase();

        let base = match parsed.port() {
            Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
            None => format!("{}://{}", parsed.scheme(), host),
        };

        Ok(Self {
            url: parsed.to_string(),
            base,
            host,
        })
    }

    /// Host of the start URL, lowercased
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Seed URLs in visit order: priority paths, then the start URL itself
    pub fn seed_urls(&self, include_about: bool) -> Vec<String> {
        let mut seeds: Vec<String> = PRIORITY_PATHS
            .iter()
            .map(|path| format!("{}{}", self.base, path))
            .collect();

        if include_about {
            seeds.push(format!("{}{}", self.base, ABOUT_PATH));
        }

        seeds.push(self.url.clone());
        seeds
    }

    /// Whether `url` points at the same site, ignoring a `www.` prefix
    pub fn is_same_site(&self, url: &str) -> bool {
        let Ok(parsed) = Url::parse(url) else {
            return false;
        };
        let Some(host) = parsed.host_str() else {
            return false;
        };

        strip_www(&host.to_lowercase()) == strip_www(&self.host)
    }
}

fn strip_www(host: &str) -> &str {
    host.strip_prefix("www.").unwrap_or(host)
}

/// Directory of a page URL, always ending in `/`, without query or fragment.
///
/// Relative links found on the page resolve against this.
pub fn page_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_query(None);
            parsed.set_fragment(None);
            let path = parsed.path().to_string();
            let dir = match path.rfind('/') {
                Some(idx) => &path[..=idx],
                None => "/",
            };
            parsed.set_path(dir);
            parsed.to_string()
        }
        Err(_) => match url.rfind('/') {
            Some(idx) => url[..=idx].to_string(),
            None => format!("{url}/"),
        },
    }
}
