//! HTTP service
//!
//! `POST /extract` for one URL, `POST /extract/batch` for many. A
//! process-wide semaphore caps how many requests crawl at once; it is the
//! only state shared between calls.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::Semaphore;
use tracing::{info, warn};

use scout_core::DiscoveryReport;
use scout_runtime::Discoverer;

#[derive(Clone)]
pub struct AppState {
    discoverer: Arc<Discoverer>,
    limiter: Arc<Semaphore>,
}

impl AppState {
    pub fn new(discoverer: Discoverer, max_crawls: usize) -> Self {
        Self {
            discoverer: Arc::new(discoverer),
            limiter: Arc::new(Semaphore::new(max_crawls.max(1))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UrlRequest {
    url: String,
}

#[derive(Debug, Deserialize)]
struct BatchRequest {
    urls: Vec<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/extract", post(extract))
        .route("/extract/batch", post(extract_batch))
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Contact scout API is running" }))
}

async fn extract(
    State(state): State<AppState>,
    Json(request): Json<UrlRequest>,
) -> Json<DiscoveryReport> {
    let Ok(_permit) = state.limiter.acquire().await else {
        return Json(DiscoveryReport::error("service is shutting down"));
    };

    Json(state.discoverer.discover_report(&request.url).await)
}

async fn extract_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Json<Vec<DiscoveryReport>> {
    let Ok(_permit) = state.limiter.acquire().await else {
        let failed = request
            .urls
            .iter()
            .map(|_| DiscoveryReport::error("service is shutting down"))
            .collect();
        return Json(failed);
    };

    Json(state.discoverer.discover_batch(&request.urls).await)
}

/// Serve until Ctrl-C
pub async fn serve(bind: &str, state: AppState) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
    }
}
