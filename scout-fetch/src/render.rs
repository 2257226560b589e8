//! Headless rendering
//!
//! The expensive tier: load a page in a UI-less Chromium, wait for deferred
//! scripts to settle and serialize the resulting DOM. A crawl owns at most
//! one engine, acquired lazily through [`RenderSession`] and released when
//! the crawl ends.

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::Page;
use futures::StreamExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::{FetchConfig, FetchError};

/// A running render engine
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Navigate to `url`, wait for the settle interval and return the DOM
    async fn render(&self, url: &str) -> Result<String, FetchError>;

    /// Tear the engine down
    async fn shutdown(self: Box<Self>) -> Result<(), FetchError>;
}

/// Starts render engines
#[async_trait]
pub trait RenderLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn RenderEngine>, FetchError>;
}

/// Launches headless Chromium via `chromiumoxide`
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: FetchConfig,
}

impl ChromiumLauncher {
    pub fn new(config: FetchConfig) -> Self {
        Self { config }
    }

    /// Launch and immediately shut down an engine
    pub async fn probe(&self) -> Result<(), FetchError> {
        let engine = self.launch().await?;
        engine.shutdown().await
    }
}

#[async_trait]
impl RenderLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderEngine>, FetchError> {
        let mut builder = BrowserConfig::builder()
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--window-size=1920,1080");

        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder.build().map_err(FetchError::Launch)?;

        let launch_timeout = Duration::from_secs(self.config.render_timeout_secs);
        let (browser, mut handler) = tokio::time::timeout(launch_timeout, Browser::launch(browser_config))
            .await
            .map_err(|_| FetchError::Launch(format!("timed out after {}s", launch_timeout.as_secs())))?
            .map_err(|e| FetchError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        debug!("Headless Chromium launched");

        Ok(Box::new(ChromiumEngine {
            browser,
            handler,
            render_timeout: launch_timeout,
            settle: Duration::from_millis(self.config.settle_ms),
        }))
    }
}

/// One Chromium process and its CDP event loop
pub struct ChromiumEngine {
    browser: Browser,
    handler: JoinHandle<()>,
    render_timeout: Duration,
    settle: Duration,
}

#[async_trait]
impl RenderEngine for ChromiumEngine {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let page = within(self.render_timeout, async {
            self.browser
                .new_page("about:blank")
                .await
                .map_err(|e| FetchError::Render(e.to_string()))
        })
        .await?;

        // Closed below on the normal path, or from Drop if this future is
        // cancelled mid-render
        let tab = OpenTab(Some(page.clone()));

        let html = within(self.render_timeout + self.settle, async {
            page.goto(url)
                .await
                .map_err(|e| FetchError::Render(e.to_string()))?;
            tokio::time::sleep(self.settle).await;
            page.content()
                .await
                .map_err(|e| FetchError::Render(e.to_string()))
        })
        .await;

        tab.close(url).await;
        html
    }

    async fn shutdown(mut self: Box<Self>) -> Result<(), FetchError> {
        self.browser
            .close()
            .await
            .map_err(|e| FetchError::Render(e.to_string()))?;
        if let Err(e) = self.browser.wait().await {
            debug!("Chromium did not exit cleanly: {}", e);
        }
        debug!("Headless Chromium shut down");
        Ok(())
    }
}

impl Drop for ChromiumEngine {
    // Dropping `Browser` kills the child process; the event loop goes with it.
    fn drop(&mut self) {
        self.handler.abort();
    }
}

/// Run `fut` under `limit`, mapping expiry to [`FetchError::Timeout`]
async fn within<T, F>(limit: Duration, fut: F) -> Result<T, FetchError>
where
    F: Future<Output = Result<T, FetchError>>,
{
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| FetchError::Timeout(limit.as_secs()))?
}

/// A browser tab that must not outlive its render
struct OpenTab(Option<Page>);

impl OpenTab {
    async fn close(mut self, url: &str) {
        if let Some(page) = self.0.take() {
            if let Err(e) = page.close().await {
                debug!("Failed to close tab for {}: {}", url, e);
            }
        }
    }
}

impl Drop for OpenTab {
    fn drop(&mut self) {
        let Some(page) = self.0.take() else {
            return;
        };
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                let _ = page.close().await;
            });
        }
    }
}

/// Lazily-acquired render engine scoped to one crawl.
///
/// The engine is launched on the first call to [`RenderSession::render`]
/// and reused afterwards. Call [`RenderSession::close`] on every exit path;
/// if the session is dropped instead, the engine's own `Drop` still kills
/// the browser.
pub struct RenderSession {
    launcher: Option<Arc<dyn RenderLauncher>>,
    engine: Option<Box<dyn RenderEngine>>,
    renders: usize,
}

impl RenderSession {
    pub fn new(launcher: Arc<dyn RenderLauncher>) -> Self {
        Self {
            launcher: Some(launcher),
            engine: None,
            renders: 0,
        }
    }

    /// A session that never renders
    pub fn disabled() -> Self {
        Self {
            launcher: None,
            engine: None,
            renders: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.launcher.is_some()
    }

    /// Whether an engine is currently running
    pub fn is_active(&self) -> bool {
        self.engine.is_some()
    }

    /// Number of render attempts made through this session
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Render `url`, launching the engine first if needed
    pub async fn render(&mut self, url: &str) -> Result<String, FetchError> {
        let launcher = self.launcher.clone().ok_or(FetchError::HeadlessDisabled)?;

        if self.engine.is_none() {
            self.engine = Some(launcher.launch().await?);
        }

        let Some(engine) = self.engine.as_ref() else {
            return Err(FetchError::Launch("render engine unavailable".to_string()));
        };

        self.renders += 1;
        engine.render(url).await
    }

    /// Release the engine, if one was launched
    pub async fn close(&mut self) {
        if let Some(engine) = self.engine.take() {
            if let Err(e) = engine.shutdown().await {
                warn!("Render engine shutdown failed: {}", e);
            }
        }
    }
}
