//! Crawl Controller
//!
//! Runs one bounded, breadth-first walk per start URL:
//! - Seeds the frontier with conventional outreach paths, then the start URL
//! - Fetches pages through the tiered strategy, skipping failures
//! - Accumulates validated addresses and the contact-form fallback flag
//! - Follows outreach-relevant, same-site links until the budget runs out
//!
//! Each call to [`Discoverer::discover`] owns its own frontier, address set
//! and render session. Nothing is shared between concurrent crawls.

use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info, info_span, warn, Instrument};

use scout_core::{
    discover_links_with, page_path, CrawlTarget, DiscoveryReport, Outcome, PageContent,
    PageSignals, RenderedVia, TargetError, CRAWL_KEYWORDS, EXTENDED_CRAWL_KEYWORDS,
};
use scout_fetch::{
    ChromiumLauncher, FetchError, FetchStrategy, HttpFetcher, PageFetcher, RenderLauncher,
    RenderSession,
};

use crate::{CrawlConfig, Frontier};

/// Errors that end a crawl without an outcome
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Render engine unavailable: {0}")]
    RenderEngine(String),

    #[error("Fetch setup failed: {0}")]
    Client(#[from] FetchError),
}

impl From<TargetError> for CrawlError {
    fn from(err: TargetError) -> Self {
        match err {
            TargetError::InvalidUrl(url) => CrawlError::InvalidUrl(url),
        }
    }
}

/// Why the crawl loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    FrontierExhausted,
    BudgetExhausted,
    TimedOut,
}

/// Counters for one crawl
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    pub pages_visited: usize,
    pub pages_failed: usize,
    pub pages_rendered: usize,
    pub termination: Termination,
}

/// Outcome of one crawl plus how it got there
#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    pub target: String,
    pub outcome: Outcome,
    pub stats: CrawlStats,
}

/// Entry point for contact discovery
pub struct Discoverer {
    config: CrawlConfig,
    fetcher: Arc<dyn PageFetcher>,
    launcher: Option<Arc<dyn RenderLauncher>>,
}

impl Discoverer {
    /// Discoverer backed by `reqwest` and, unless disabled, headless Chromium
    pub fn new(config: CrawlConfig) -> Result<Self, CrawlError> {
        let fetcher: Arc<dyn PageFetcher> = Arc::new(HttpFetcher::new(&config.fetch)?);
        let launcher: Option<Arc<dyn RenderLauncher>> = if config.fetch.headless {
            Some(Arc::new(ChromiumLauncher::new(config.fetch.clone())))
        } else {
            None
        };

        Ok(Self::with_tiers(config, fetcher, launcher))
    }

    /// Discoverer over caller-supplied fetch tiers
    pub fn with_tiers(
        config: CrawlConfig,
        fetcher: Arc<dyn PageFetcher>,
        launcher: Option<Arc<dyn RenderLauncher>>,
    ) -> Self {
        Self {
            config,
            fetcher,
            launcher,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawl from `input` and classify what was found
    pub async fn discover(&self, input: &str) -> Result<CrawlReport, CrawlError> {
        let target = CrawlTarget::parse(input)?;
        let crawl_id = uuid::Uuid::new_v4().to_string()[..8].to_string();
        let span = info_span!("crawl", id = %crawl_id, site = %target.base);

        self.run_crawl(target).instrument(span).await
    }

    /// [`Discoverer::discover`] flattened into the wire report
    pub async fn discover_report(&self, input: &str) -> DiscoveryReport {
        match self.discover(input).await {
            Ok(report) => DiscoveryReport::from(&report.outcome),
            Err(e) => DiscoveryReport::error(e.to_string()),
        }
    }

    async fn run_crawl(&self, target: CrawlTarget) -> Result<CrawlReport, CrawlError> {
        info!("Starting crawl of {}", target.url);

        let session = match &self.launcher {
            Some(launcher) => RenderSession::new(Arc::clone(launcher)),
            None => RenderSession::disabled(),
        };
        let mut strategy = FetchStrategy::new(Arc::clone(&self.fetcher), session);
        let mut crawl = Crawl::new(target, &self.config);

        let result = tokio::time::timeout(
            self.config.budget.total_timeout,
            crawl.run(&mut strategy, &self.config),
        )
        .await;

        // Released on every path, including timeout and fatal errors
        strategy.close().await;

        let termination = match result {
            Ok(Ok(termination)) => termination,
            Ok(Err(e)) => {
                error!("Crawl of {} aborted: {}", crawl.target.url, e);
                return Err(e);
            }
            Err(_) => {
                warn!(
                    "Crawl of {} hit the {}s wall-clock limit",
                    crawl.target.url,
                    self.config.budget.total_timeout.as_secs()
                );
                Termination::TimedOut
            }
        };

        let report = crawl.finish(termination);
        info!(
            "Crawl finished ({:?}): {} pages visited, {} failed, {} rendered, outcome {:?}",
            report.stats.termination,
            report.stats.pages_visited,
            report.stats.pages_failed,
            report.stats.pages_rendered,
            report.outcome
        );
        Ok(report)
    }
}

/// Mutable state of a single crawl
struct Crawl {
    target: CrawlTarget,
    frontier: Frontier,
    emails: BTreeSet<String>,
    contact_form: bool,
    keywords: &'static [&'static str],
    pages_failed: usize,
    pages_rendered: usize,
}

impl Crawl {
    fn new(target: CrawlTarget, config: &CrawlConfig) -> Self {
        let frontier = Frontier::seeded(target.seed_urls(config.include_about));
        let keywords = if config.include_about {
            EXTENDED_CRAWL_KEYWORDS
        } else {
            CRAWL_KEYWORDS
        };

        Self {
            target,
            frontier,
            emails: BTreeSet::new(),
            contact_form: false,
            keywords,
            pages_failed: 0,
            pages_rendered: 0,
        }
    }

    async fn run(
        &mut self,
        strategy: &mut FetchStrategy,
        config: &CrawlConfig,
    ) -> Result<Termination, CrawlError> {
        let page_deadline = config.page_deadline();

        loop {
            if self.frontier.visited_count() >= config.budget.max_pages {
                return Ok(Termination::BudgetExhausted);
            }

            let Some(url) = self.frontier.next_unvisited() else {
                return Ok(Termination::FrontierExhausted);
            };

            let page = match tokio::time::timeout(page_deadline, strategy.fetch(&url)).await {
                Ok(Ok(page)) => page,
                Ok(Err(FetchError::Launch(msg))) => return Err(CrawlError::RenderEngine(msg)),
                Ok(Err(e)) => {
                    warn!("Skipping {}: {}", url, e);
                    self.pages_failed += 1;
                    continue;
                }
                Err(_) => {
                    warn!("Skipping {}: no content within {:?}", url, page_deadline);
                    self.pages_failed += 1;
                    continue;
                }
            };

            self.absorb(&page);
        }
    }

    /// Fold one page into the accumulators and the frontier
    fn absorb(&mut self, page: &PageContent) {
        if page.rendered_via == RenderedVia::Headless {
            self.pages_rendered += 1;
        }

        let signals = PageSignals::from_html(&page.html);
        debug!(
            "{} ({:?}): {} valid addresses, contact form: {}",
            page.url,
            page.rendered_via,
            signals.emails.len(),
            signals.contact_form
        );

        self.emails.extend(signals.emails);

        if self.emails.is_empty() && signals.contact_form {
            self.contact_form = true;
        }

        let links = discover_links_with(
            &page.html,
            &self.target.base,
            &page_path(&page.url),
            self.keywords,
        );

        for link in links {
            if !self.target.is_same_site(&link) {
                continue;
            }
            if self.frontier.push(link.clone()) {
                debug!("Queued {}", link);
            }
        }
    }

    fn finish(self, termination: Termination) -> CrawlReport {
        CrawlReport {
            target: self.target.url,
            outcome: Outcome::from_accumulators(&self.emails, self.contact_form),
            stats: CrawlStats {
                pages_visited: self.frontier.visited_count(),
                pages_failed: self.pages_failed,
                pages_rendered: self.pages_rendered,
                termination,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use scout_fetch::{MemoryFetcher, MemoryLauncher};
    use std::collections::HashSet;
    use std::time::Duration;

    const HOME: &str = "https://site.com/";
    const CONTACT: &str = "https://site.com/contact";

    fn static_only(config: CrawlConfig, fetcher: &MemoryFetcher) -> Discoverer {
        Discoverer::with_tiers(config, Arc::new(fetcher.clone()), None)
    }

    fn with_headless(
        config: CrawlConfig,
        fetcher: &MemoryFetcher,
        launcher: &MemoryLauncher,
    ) -> Discoverer {
        Discoverer::with_tiers(
            config,
            Arc::new(fetcher.clone()),
            Some(Arc::new(launcher.clone())),
        )
    }

    #[tokio::test]
    async fn test_seeded_contact_page_found() {
        let fetcher = MemoryFetcher::new()
            .with_page(HOME, "<h1>Welcome</h1>")
            .with_page(CONTACT, "<p>Press: press@site.com</p>");
        let discoverer = static_only(CrawlConfig::default().with_max_pages(2), &fetcher);

        let report = discoverer.discover("site.com").await.unwrap();

        // "press" is not an outreach keyword, so it is not a priority address
        assert_eq!(
            report.outcome,
            Outcome::EmailsFound {
                priority: vec![],
                others: vec!["press@site.com".to_string()],
            }
        );
        assert_eq!(fetcher.requests()[0], CONTACT);
    }

    #[tokio::test]
    async fn test_contact_form_fallback() {
        let fetcher = MemoryFetcher::new().with_page(
            HOME,
            "<form action='/send'><textarea></textarea><button>Contact us</button></form>",
        );
        let discoverer = static_only(CrawlConfig::default().with_max_pages(20), &fetcher);

        let report = discoverer.discover(HOME).await.unwrap();
        assert_eq!(report.outcome, Outcome::ContactFormFound);
        assert_eq!(report.stats.termination, Termination::FrontierExhausted);
    }

    #[tokio::test]
    async fn test_single_page_budget() {
        let fetcher = MemoryFetcher::new()
            .with_page(
                CONTACT,
                "<a href='/write-for-us-today'>Write</a><a href='/guest-authors'>Guests</a>",
            )
            .with_page(HOME, "<p>editor@site.com</p>");
        let discoverer = static_only(CrawlConfig::default().with_max_pages(1), &fetcher);

        let report = discoverer.discover(HOME).await.unwrap();
        assert_eq!(report.outcome, Outcome::NoneFound);
        assert_eq!(report.stats.pages_visited, 1);
        assert_eq!(report.stats.termination, Termination::BudgetExhausted);
        assert_eq!(fetcher.requests(), vec![CONTACT.to_string()]);
    }

    #[tokio::test]
    async fn test_headless_fallback_after_forbidden() {
        let fetcher = MemoryFetcher::new().with_status(CONTACT, 403);
        let launcher = MemoryLauncher::new().with_page(CONTACT, "<p>Editors: editor@site.com</p>");
        let discoverer = with_headless(CrawlConfig::default(), &fetcher, &launcher);

        let report = discoverer.discover(HOME).await.unwrap();
        assert!(report.outcome.all_emails().contains(&"editor@site.com".to_string()));
        assert!(report.stats.pages_rendered >= 1);

        // one engine for the whole crawl, released at the end
        assert_eq!(launcher.launches(), 1);
        assert_eq!(launcher.shutdowns(), 1);
    }

    fn chained_site() -> MemoryFetcher {
        let mut fetcher = MemoryFetcher::new().with_page(
            HOME,
            "<a href='/contact'>c</a><a href='/contact'>c</a><a href='/submit-news'>s</a>",
        );
        for i in 0..10 {
            let url = format!("https://site.com/write-{i}");
            fetcher = fetcher.with_page(&url, &format!("<a href='/write-{}'>next</a>", i + 1));
        }
        fetcher.with_page(CONTACT, "<a href='/write-0'>w</a><a href='/'>home</a>")
    }

    #[tokio::test]
    async fn test_budget_and_uniqueness() {
        for max_pages in [1, 3, 7, 30] {
            let probe = chained_site();
            let discoverer = static_only(CrawlConfig::default().with_max_pages(max_pages), &probe);
            let report = discoverer.discover(HOME).await.unwrap();

            let requests = probe.requests();
            let unique: HashSet<_> = requests.iter().collect();
            assert_eq!(unique.len(), requests.len(), "a URL was fetched twice");
            assert!(requests.len() <= max_pages);
            assert!(report.stats.pages_visited <= max_pages);
        }
    }

    #[tokio::test]
    async fn test_discovered_links_followed_same_site_only() {
        let fetcher = MemoryFetcher::new()
            .with_page(
                HOME,
                r#"<a href="/team/write-with-us">Write</a>
                   <a href="https://twitter.com/contact">Tweet</a>"#,
            )
            .with_page("https://site.com/team/write-with-us", "<p>pitch@site.com</p>");
        let discoverer = static_only(CrawlConfig::default().with_max_pages(25), &fetcher);

        let report = discoverer.discover(HOME).await.unwrap();
        assert_eq!(report.outcome.best_email(), Some("pitch@site.com"));
        assert!(!fetcher.requests().iter().any(|u| u.contains("twitter.com")));
    }

    #[tokio::test]
    async fn test_form_does_not_stop_email_search() {
        let fetcher = MemoryFetcher::new()
            .with_page(CONTACT, "<form><button>Send message</button></form>")
            .with_page(HOME, "<footer>info [at] site [dot] com</footer>");
        let discoverer = static_only(CrawlConfig::default().with_max_pages(20), &fetcher);

        let report = discoverer.discover(HOME).await.unwrap();
        assert_eq!(report.outcome.best_email(), Some("info@site.com"));
    }

    #[tokio::test]
    async fn test_launch_failure_is_fatal() {
        let fetcher = MemoryFetcher::new();
        let launcher = MemoryLauncher::failing();
        let discoverer = with_headless(CrawlConfig::default(), &fetcher, &launcher);

        let result = discoverer.discover(HOME).await;
        assert!(matches!(result, Err(CrawlError::RenderEngine(_))));

        let report = discoverer.discover_report(HOME).await;
        assert!(report.is_error());
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let discoverer = static_only(CrawlConfig::default(), &MemoryFetcher::new());
        assert!(matches!(
            discoverer.discover("   ").await,
            Err(CrawlError::InvalidUrl(_))
        ));
    }

    /// Serves the contact page instantly and hangs on everything else
    struct StallingFetcher {
        inner: MemoryFetcher,
    }

    #[async_trait]
    impl PageFetcher for StallingFetcher {
        async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
            if url != CONTACT {
                tokio::time::sleep(Duration::from_secs(30)).await;
            }
            self.inner.fetch_html(url).await
        }
    }

    #[tokio::test]
    async fn test_total_timeout_keeps_accumulated() {
        let fetcher = StallingFetcher {
            inner: MemoryFetcher::new().with_page(CONTACT, "<p>tips@site.com</p>"),
        };
        let config = CrawlConfig::default()
            .with_max_pages(10)
            .with_total_timeout(Duration::from_millis(200));
        let discoverer = Discoverer::with_tiers(config, Arc::new(fetcher), None);

        let report = discoverer.discover(HOME).await.unwrap();
        assert_eq!(report.stats.termination, Termination::TimedOut);
        assert_eq!(report.outcome.best_email(), Some("tips@site.com"));
    }

    #[tokio::test]
    async fn test_report_serializes() {
        let fetcher = MemoryFetcher::new().with_page(CONTACT, "<p>team@site.com</p>");
        let discoverer = static_only(CrawlConfig::default().with_max_pages(1), &fetcher);

        let report = discoverer.discover(HOME).await.unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"]["kind"], "emails_found");
        assert_eq!(json["stats"]["termination"], "budget_exhausted");
    }
}
