//! Static page fetching
//!
//! The cheap tier: a plain GET with no script execution.

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use tracing::debug;

use crate::{create_http_client, random_user_agent, FetchConfig, FetchError};

/// Something that can return the HTML behind a URL
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url`; non-success statuses are errors
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError>;
}

/// Static fetcher backed by `reqwest`
pub struct HttpFetcher {
    client: Client,
    timeout_secs: u64,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self {
            client: create_http_client(config)?,
            timeout_secs: config.timeout_secs,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        debug!("GET {}", url);

        // Rotate per request, not just per client
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, random_user_agent())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout(self.timeout_secs)
                } else {
                    FetchError::Request(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            debug!("GET {} returned status: {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contact"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>info@site.com</p>"))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let html = fetcher
            .fetch_html(&format!("{}/contact", server.uri()))
            .await
            .unwrap();

        assert!(html.contains("info@site.com"));
    }

    #[tokio::test]
    async fn test_fetch_forbidden_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        let result = fetcher.fetch_html(&format!("{}/", server.uri())).await;

        assert!(matches!(result, Err(FetchError::Status(403))));
    }

    #[tokio::test]
    async fn test_fetch_sends_browser_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(wiremock::matchers::header_exists("user-agent"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&FetchConfig::default()).unwrap();
        assert_eq!(fetcher.fetch_html(&server.uri()).await.unwrap(), "ok");
    }
}
