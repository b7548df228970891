//! Per-job traversal state: the frontier and the visited set

use crate::url::visit_key;
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontierEntry {
    /// The URL to fetch
    pub url: Url,

    /// Link hops from the job's seed
    pub depth: u32,

    /// Page the link was discovered on (`None` for the seed)
    pub parent: Option<Url>,
}

/// Traversal state owned by exactly one crawl engine run
///
/// The frontier is FIFO, so pages come out in non-decreasing depth order.
/// Every entry ever accepted has `depth <= max_depth`, and a page key is
/// accepted into the frontier at most once.
#[derive(Debug)]
pub struct CrawlState {
    /// Keys of pages already attempted
    visited: HashSet<String>,

    /// Keys of pages ever accepted into the frontier
    queued: HashSet<String>,

    /// Pages pending fetch, in discovery order
    frontier: VecDeque<FrontierEntry>,

    /// Depth bound of the owning job
    max_depth: u32,
}

impl CrawlState {
    /// Creates the state for a new run, seeded with `(seed, 0)`
    pub fn new(seed: Url, max_depth: u32) -> Self {
        let mut state = Self {
            visited: HashSet::new(),
            queued: HashSet::new(),
            frontier: VecDeque::new(),
            max_depth,
        };
        state.enqueue(seed, 0, None);
        state
    }

    /// Removes the next unvisited entry from the frontier
    ///
    /// Entries whose page was visited after they were queued (for example
    /// the target of an earlier redirect) are discarded.
    pub fn next_entry(&mut self) -> Option<FrontierEntry> {
        while let Some(entry) = self.frontier.pop_front() {
            if self.is_visited(&entry.url) {
                tracing::trace!("Skipping already visited {}", entry.url);
                continue;
            }
            return Some(entry);
        }
        None
    }

    /// Adds a page to the frontier
    ///
    /// # Returns
    ///
    /// `true` if the page was accepted; `false` if it exceeds the depth bound
    /// or was already visited or queued.
    pub fn enqueue(&mut self, url: Url, depth: u32, parent: Option<Url>) -> bool {
        if depth > self.max_depth {
            return false;
        }

        let key = visit_key(&url);
        if self.visited.contains(&key) || !self.queued.insert(key) {
            return false;
        }

        self.frontier.push_back(FrontierEntry { url, depth, parent });
        true
    }

    /// Records a page as attempted
    ///
    /// # Returns
    ///
    /// `true` if the page had not been visited before
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(visit_key(url))
    }

    /// Whether a page was already attempted in this run
    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited.contains(&visit_key(url))
    }

    /// Number of pages waiting in the frontier
    pub fn frontier_size(&self) -> usize {
        self.frontier.len()
    }

    /// Returns whether the frontier is empty
    pub fn is_empty(&self) -> bool {
        self.frontier.is_empty()
    }

    /// Number of pages attempted so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
