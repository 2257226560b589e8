//! Contact Scout Runtime
//!
//! Drives discovery end to end:
//! - **Frontier**: ordered, de-duplicated URL queue for one crawl
//! - **Controller**: the bounded crawl loop and outcome classification
//! - **Batch**: concurrent, order-preserving discovery over many start URLs

pub mod config;
pub mod frontier;
pub mod controller;
pub mod batch;

pub use config::*;
pub use frontier::*;
pub use controller::*;
