//! In-memory fetch tiers
//!
//! Canned pages standing in for the network and for Chromium, so crawl
//! behavior can be exercised without either.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::{FetchError, PageFetcher, RenderEngine, RenderLauncher};

/// Static tier serving pages from a map; unknown URLs are a 404
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    pages: HashMap<String, Result<String, u16>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), Ok(html.to_string()));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.pages.insert(url.to_string(), Err(status));
        self
    }

    /// Every URL requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageFetcher for MemoryFetcher {
    async fn fetch_html(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(url.to_string());
        }

        match self.pages.get(url) {
            Some(Ok(html)) => Ok(html.clone()),
            Some(Err(status)) => Err(FetchError::Status(*status)),
            None => Err(FetchError::Status(404)),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    launches: AtomicUsize,
    shutdowns: AtomicUsize,
    rendered: Mutex<Vec<String>>,
}

/// Render tier serving pages from a map, counting launches and shutdowns.
///
/// Clones share their counters.
#[derive(Debug, Clone, Default)]
pub struct MemoryLauncher {
    pages: HashMap<String, String>,
    fail_launch: bool,
    counters: Arc<Counters>,
}

impl MemoryLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// A launcher whose engine never starts
    pub fn failing() -> Self {
        Self {
            fail_launch: true,
            ..Self::default()
        }
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    pub fn launches(&self) -> usize {
        self.counters.launches.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.counters.shutdowns.load(Ordering::SeqCst)
    }

    /// Every URL rendered so far, in order
    pub fn rendered(&self) -> Vec<String> {
        self.counters
            .rendered
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RenderLauncher for MemoryLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderEngine>, FetchError> {
        if self.fail_launch {
            return Err(FetchError::Launch("no browser available".to_string()));
        }

        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryEngine {
            pages: self.pages.clone(),
            counters: Arc::clone(&self.counters),
        }))
    }
}

struct MemoryEngine {
    pages: HashMap<String, String>,
    counters: Arc<Counters>,
}

#[async_trait]
impl RenderEngine for MemoryEngine {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        if let Ok(mut rendered) = self.counters.rendered.lock() {
            rendered.push(url.to_string());
        }

        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Render(format!("navigation to {url} failed")))
    }

    async fn shutdown(self: Box<Self>) -> Result<(), FetchError> {
        self.counters.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_fetcher() {
        let fetcher = MemoryFetcher::new()
            .with_page("https://site.com/", "<p>home</p>")
            .with_status("https://site.com/blocked", 403);

        assert_eq!(fetcher.fetch_html("https://site.com/").await.unwrap(), "<p>home</p>");
        assert!(matches!(
            fetcher.fetch_html("https://site.com/blocked").await,
            Err(FetchError::Status(403))
        ));
        assert!(matches!(
            fetcher.fetch_html("https://site.com/nope").await,
            Err(FetchError::Status(404))
        ));
        assert_eq!(fetcher.requests().len(), 3);
    }
}
