//! Crawl configuration

use std::time::Duration;

use scout_core::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_TIMEOUT_SECS, DEFAULT_TOTAL_TIMEOUT_SECS};
use scout_fetch::FetchConfig;

/// Page and time limits for one crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlBudget {
    /// Maximum pages visited, failed fetches included
    pub max_pages: usize,
    /// Static fetch timeout
    pub page_timeout: Duration,
    /// Wall-clock bound for the whole crawl
    pub total_timeout: Duration,
}

impl Default for CrawlBudget {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            total_timeout: Duration::from_secs(DEFAULT_TOTAL_TIMEOUT_SECS),
        }
    }
}

/// Everything a [`crate::Discoverer`] needs
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub budget: CrawlBudget,
    /// Seed `/about` and follow about/editor links
    pub include_about: bool,
    /// Crawls run at once in batch mode
    pub max_concurrent: usize,
    pub fetch: FetchConfig,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            budget: CrawlBudget::default(),
            include_about: false,
            max_concurrent: 4,
            fetch: FetchConfig::default(),
        }
    }
}

impl CrawlConfig {
    pub fn with_max_pages(mut self, pages: usize) -> Self {
        self.budget.max_pages = pages;
        self
    }

    /// Sets the static fetch timeout for both the budget and the HTTP client
    pub fn with_page_timeout(mut self, secs: u64) -> Self {
        self.budget.page_timeout = Duration::from_secs(secs);
        self.fetch.timeout_secs = secs;
        self
    }

    pub fn with_total_timeout(mut self, timeout: Duration) -> Self {
        self.budget.total_timeout = timeout;
        self
    }

    pub fn with_about_pages(mut self, include: bool) -> Self {
        self.include_about = include;
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Upper bound for one page: static timeout, then navigation and settle
    pub fn page_deadline(&self) -> Duration {
        let mut deadline = self.budget.page_timeout;
        if self.fetch.headless {
            deadline += Duration::from_secs(self.fetch.render_timeout_secs)
                + Duration::from_millis(self.fetch.settle_ms);
        }
        deadline
    }
}
