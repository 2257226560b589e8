//! Contact Scout Fetch Layer
//!
//! Page retrieval for the crawl:
//! - Browser-impersonating HTTP client for static fetches
//! - Headless Chromium rendering with a crawl-scoped session
//! - Tiered strategy that escalates only when the static page is useless
//! - In-memory tiers for exercising crawls offline (`test-util` feature)

pub mod client;
pub mod http;
pub mod render;
pub mod strategy;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use client::*;
pub use http::*;
pub use render::*;
pub use strategy::*;
#[cfg(any(test, feature = "test-util"))]
pub use memory::*;
