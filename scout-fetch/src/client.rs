//! HTTP client configuration
//!
//! Builds the browser-impersonating client used for static fetches.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fetch configuration shared by both tiers
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Static request timeout in seconds
    pub timeout_secs: u64,
    /// Headless navigation timeout in seconds
    pub render_timeout_secs: u64,
    /// Wait after navigation so deferred scripts can run, in milliseconds
    pub settle_ms: u64,
    /// Whether pages may escalate to headless rendering
    pub headless: bool,
    /// Explicit Chromium binary; auto-detected when unset
    pub chrome_path: Option<PathBuf>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            render_timeout_secs: 20,
            settle_ms: 5000,
            headless: true,
            chrome_path: None,
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_render_timeout(mut self, secs: u64) -> Self {
        self.render_timeout_secs = secs;
        self
    }

    pub fn with_settle_ms(mut self, ms: u64) -> Self {
        self.settle_ms = ms;
        self
    }

    pub fn static_only(mut self) -> Self {
        self.headless = false;
        self
    }

    pub fn with_chrome_path(mut self, path: PathBuf) -> Self {
        self.chrome_path = Some(path);
        self
    }
}

/// Errors from either fetch tier
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("Render failed: {0}")]
    Render(String),

    #[error("Failed to launch headless browser: {0}")]
    Launch(String),

    #[error("Headless rendering is disabled")]
    HeadlessDisabled,
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create the HTTP client used for static fetches
pub fn create_http_client(config: &FetchConfig) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(random_user_agent())
        .default_headers(headers)
        .build()
        .map_err(|e| FetchError::ClientBuild(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FetchConfig::default();
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.settle_ms, 5000);
        assert!(config.headless);
    }

    #[test]
    fn test_static_only() {
        let config = FetchConfig::default().static_only().with_timeout(3);
        assert!(!config.headless);
        assert_eq!(config.timeout_secs, 3);
    }

    #[test]
    fn test_random_user_agent() {
        let ua = random_user_agent();
        assert!(ua.contains("Mozilla"));
    }

    #[test]
    fn test_client_builds() {
        assert!(create_http_client(&FetchConfig::default()).is_ok());
    }
}
