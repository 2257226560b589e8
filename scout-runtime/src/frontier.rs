//! Crawl frontier
//!
//! FIFO queue with set-based membership so each URL is fetched at most once
//! per crawl. Seeds go in first, which is what puts the priority paths ahead
//! of anything discovered organically.

use std::collections::{HashSet, VecDeque};

/// Pending and visited URLs for one crawl
#[derive(Debug, Default)]
pub struct Frontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
    visited: HashSet<String>,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frontier pre-loaded with `seeds`, in order
    pub fn seeded<I>(seeds: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut frontier = Self::new();
        for url in seeds {
            frontier.push(url);
        }
        frontier
    }

    /// Enqueue `url` unless it is already queued or visited
    pub fn push(&mut self, url: String) -> bool {
        if self.visited.contains(&url) || self.queued.contains(&url) {
            return false;
        }
        self.queued.insert(url.clone());
        self.queue.push_back(url);
        true
    }

    /// Dequeue the next unvisited URL and mark it visited
    pub fn next_unvisited(&mut self) -> Option<String> {
        while let Some(url) = self.queue.pop_front() {
            self.queued.remove(&url);
            if self.visited.insert(url.clone()) {
                return Some(url);
            }
        }
        None
    }

    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// URLs still waiting to be fetched
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
