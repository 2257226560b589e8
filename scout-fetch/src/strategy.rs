//! Two-tier fetch strategy
//!
//! Static first, because it is strictly cheaper. A page escalates to
//! headless rendering when the static tier fails or returns nothing usable
//! (no validated address and no contact form). Escalation is decided per
//! URL.

use std::sync::Arc;
use tracing::{debug, warn};

use scout_core::{PageContent, PageSignals, RenderedVia};

use crate::{FetchError, PageFetcher, RenderSession};

/// Static fetcher plus a crawl-scoped render session
pub struct FetchStrategy {
    fetcher: Arc<dyn PageFetcher>,
    session: RenderSession,
}

impl FetchStrategy {
    pub fn new(fetcher: Arc<dyn PageFetcher>, session: RenderSession) -> Self {
        Self { fetcher, session }
    }

    /// Static tier only
    pub fn static_only(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self::new(fetcher, RenderSession::disabled())
    }

    /// Number of headless render attempts so far
    pub fn renders(&self) -> usize {
        self.session.renders()
    }

    /// Fetch one page.
    ///
    /// A headless failure after a successful static fetch falls back to the
    /// static HTML. Only [`FetchError::Launch`] means the crawl cannot go on.
    pub async fn fetch(&mut self, url: &str) -> Result<PageContent, FetchError> {
        let static_result = self.fetcher.fetch_html(url).await;

        if !self.session.is_enabled() {
            return static_result.map(|html| PageContent::new(url, html, RenderedVia::Static));
        }

        let static_html = match static_result {
            Ok(html) => {
                if PageSignals::from_html(&html).is_useful() {
                    return Ok(PageContent::new(url, html, RenderedVia::Static));
                }
                debug!("Static fetch of {} found nothing, rendering", url);
                Some(html)
            }
            Err(e) => {
                debug!("Static fetch of {} failed ({}), rendering", url, e);
                None
            }
        };

        match self.session.render(url).await {
            Ok(html) => Ok(PageContent::new(url, html, RenderedVia::Headless)),
            Err(FetchError::Launch(msg)) => Err(FetchError::Launch(msg)),
            Err(e) => match static_html {
                Some(html) => {
                    warn!("Render of {} failed ({}), keeping static content", url, e);
                    Ok(PageContent::new(url, html, RenderedVia::Static))
                }
                None => Err(e),
            },
        }
    }

    /// Release the render engine
    pub async fn close(&mut self) {
        self.session.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryFetcher, MemoryLauncher};

    const URL: &str = "https://site.com/contact";

    fn strategy(fetcher: MemoryFetcher, launcher: &MemoryLauncher) -> FetchStrategy {
        FetchStrategy::new(
            Arc::new(fetcher),
            RenderSession::new(Arc::new(launcher.clone())),
        )
    }

    #[tokio::test]
    async fn test_useful_static_page_not_rendered() {
        let launcher = MemoryLauncher::new();
        let fetcher = MemoryFetcher::new().with_page(URL, "<p>editor@site.com</p>");
        let mut strategy = strategy(fetcher, &launcher);

        let page = strategy.fetch(URL).await.unwrap();
        assert_eq!(page.rendered_via, RenderedVia::Static);
        assert_eq!(launcher.launches(), 0);
    }

    #[tokio::test]
    async fn test_forbidden_escalates() {
        let launcher = MemoryLauncher::new().with_page(URL, "<p>editor@site.com</p>");
        let fetcher = MemoryFetcher::new().with_status(URL, 403);
        let mut strategy = strategy(fetcher, &launcher);

        let page = strategy.fetch(URL).await.unwrap();
        assert_eq!(page.rendered_via, RenderedVia::Headless);
        assert!(page.html.contains("editor@site.com"));
    }

    #[tokio::test]
    async fn test_empty_static_escalates() {
        let launcher = MemoryLauncher::new().with_page(URL, "<div id=app>team@site.com</div>");
        let fetcher = MemoryFetcher::new().with_page(URL, "<div id=app></div>");
        let mut strategy = strategy(fetcher, &launcher);

        let page = strategy.fetch(URL).await.unwrap();
        assert_eq!(page.rendered_via, RenderedVia::Headless);
        assert_eq!(launcher.rendered(), vec![URL.to_string()]);
    }

    #[tokio::test]
    async fn test_render_failure_keeps_static() {
        let launcher = MemoryLauncher::new();
        let fetcher = MemoryFetcher::new().with_page(URL, "<a href='/write'>write</a>");
        let mut strategy = strategy(fetcher, &launcher);

        let page = strategy.fetch(URL).await.unwrap();
        assert_eq!(page.rendered_via, RenderedVia::Static);
        assert!(page.html.contains("/write"));
    }

    #[tokio::test]
    async fn test_both_tiers_fail() {
        let launcher = MemoryLauncher::new();
        let fetcher = MemoryFetcher::new().with_status(URL, 500);
        let mut strategy = strategy(fetcher, &launcher);

        assert!(matches!(strategy.fetch(URL).await, Err(FetchError::Render(_))));
    }

    #[tokio::test]
    async fn test_launch_failure_is_reported() {
        let launcher = MemoryLauncher::failing();
        let fetcher = MemoryFetcher::new().with_page(URL, "<p>nothing</p>");
        let mut strategy = strategy(fetcher, &launcher);

        assert!(matches!(strategy.fetch(URL).await, Err(FetchError::Launch(_))));
    }

    #[tokio::test]
    async fn test_static_only_never_renders() {
        let fetcher = MemoryFetcher::new().with_status(URL, 403);
        let mut strategy = FetchStrategy::static_only(Arc::new(fetcher));

        assert!(matches!(strategy.fetch(URL).await, Err(FetchError::Status(403))));
        assert_eq!(strategy.renders(), 0);
    }

    #[tokio::test]
    async fn test_close_releases_engine() {
        let launcher = MemoryLauncher::new();
        let fetcher = MemoryFetcher::new().with_status(URL, 403);
        let mut strategy = strategy(fetcher, &launcher);

        let _ = strategy.fetch(URL).await;
        strategy.close().await;
        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.shutdowns(), 1);
    }
}
