//! Batch discovery
//!
//! Runs independent crawls concurrently. Each crawl keeps its own frontier,
//! address set and render engine; results come back in input order and a
//! failure on one URL never touches the others.

use futures::stream::{self, StreamExt};
use tracing::info;

use scout_core::DiscoveryReport;

use crate::Discoverer;

impl Discoverer {
    /// Discover contacts for every input, preserving input order
    pub async fn discover_batch<S>(&self, inputs: &[S]) -> Vec<DiscoveryReport>
    where
        S: AsRef<str> + Sync,
    {
        let concurrency = self.config().max_concurrent.max(1);
        info!("Batch of {} URLs, {} at a time", inputs.len(), concurrency);

        let reports: Vec<_> = inputs
            .iter()
            .map(|input| self.discover_report(input.as_ref()))
            .collect();

        stream::iter(reports)
            .buffered(concurrency)
            .collect()
            .await
    }
}
