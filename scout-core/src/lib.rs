//! Contact Scout Core - extraction and ranking primitives for outreach discovery
//!
//! This crate holds the pure, network-free half of the pipeline:
//! - Text deobfuscation (`jane [at] site [dot] com`)
//! - Email extraction from markup, visible text, footers and `mailto:` links
//! - Address validation against junk and infrastructure noise
//! - Outreach prioritization and contact-form detection
//! - Link discovery and crawl target derivation
//! - The terminal `Outcome` of a crawl and its wire report

pub mod normalize;
pub mod extract;
pub mod validate;
pub mod prioritize;
pub mod form;
pub mod links;
pub mod target;
pub mod signals;
pub mod outcome;

pub use normalize::*;
pub use extract::*;
pub use validate::*;
pub use prioritize::*;
pub use form::*;
pub use links::*;
pub use target::*;
pub use signals::*;
pub use outcome::*;

/// Default number of pages visited per crawl
pub const DEFAULT_MAX_PAGES: usize = 5;

/// Default per-page fetch timeout in seconds
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 10;

/// Default wall-clock bound for a whole crawl in seconds
pub const DEFAULT_TOTAL_TIMEOUT_SECS: u64 = 120;
