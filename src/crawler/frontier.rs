//! URL frontier: admission, deduplication and breadth-first ordering

use crate::url::{extract_domain, normalize_url, ScopeDecision, UrlFilter};
use std::collections::{HashSet, VecDeque};
use url::Url;

/// A page waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    /// Normalized URL
    pub url: Url,

    /// Lower-cased host, the key for per-domain pacing
    pub domain: String,

    /// Link hops from a seed
    pub depth: u32,

    /// Page the URL was discovered on; None for seeds
    pub referrer: Option<Url>,

    /// Attempt the fetch once, never retry
    pub dont_retry: bool,
}

/// Outcome of offering a URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Admitted,
    /// Already admitted earlier
    Duplicate,
    DomainNotAllowed,
    /// A deny pattern matched
    Denied,
    /// No allow pattern matched
    NotAllowed,
    TooDeep,
    /// Not an absolute http(s) URL
    Invalid,
    /// Admission was closed by cancellation
    Closed,
}

impl Admission {
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// Not-yet-fetched tasks plus the set of every URL ever admitted
///
/// Only admitted URLs enter the visited set, so a URL rejected as too deep
/// can still be admitted later through a shorter path.
#[derive(Debug)]
pub struct Frontier {
    queue: VecDeque<CrawlTask>,
    visited: HashSet<String>,
    filter: UrlFilter,
    max_depth: u32,
    closed: bool,
}

impl Frontier {
    pub fn new(filter: UrlFilter, max_depth: u32) -> Self {
        Self {
            queue: VecDeque::new(),
            visited: HashSet::new(),
            filter,
            max_depth,
            closed: false,
        }
    }

    /// Offers a discovered URL at `depth`
    pub fn enqueue(&mut self, url: &str, depth: u32, referrer: Option<&Url>) -> Admission {
        self.admit(url, depth, referrer, false)
    }

    /// Offers a seed URL at depth 0
    ///
    /// Seeds are fetched even when no allow pattern matches them; the domain
    /// and deny rules still apply.
    pub fn enqueue_seed(&mut self, url: &str) -> Admission {
        self.admit(url, 0, None, true)
    }

    fn admit(&mut self, url: &str, depth: u32, referrer: Option<&Url>, seed: bool) -> Admission {
        if self.closed {
            return Admission::Closed;
        }

        let Ok(url) = normalize_url(url) else {
            return Admission::Invalid;
        };
        let Some(domain) = extract_domain(&url) else {
            return Admission::Invalid;
        };

        if self.visited.contains(url.as_str()) {
            return Admission::Duplicate;
        }

        if depth > self.max_depth {
            return Admission::TooDeep;
        }

        let decision = if seed {
            self.filter.check_seed(&url)
        } else {
            self.filter.check(&url)
        };
        let dont_retry = match decision {
            ScopeDecision::InScope { dont_retry } => dont_retry,
            ScopeDecision::DomainNotAllowed => return Admission::DomainNotAllowed,
            ScopeDecision::Denied => return Admission::Denied,
            ScopeDecision::NotAllowed => return Admission::NotAllowed,
        };

        self.visited.insert(url.to_string());
        self.queue.push_back(CrawlTask {
            url,
            domain,
            depth,
            referrer: referrer.cloned(),
            dont_retry,
        });

        Admission::Admitted
    }

    /// Removes and returns the oldest task accepted by `ready`
    pub fn take_first<F>(&mut self, mut ready: F) -> Option<CrawlTask>
    where
        F: FnMut(&CrawlTask) -> bool,
    {
        let position = self.queue.iter().position(|task| ready(task))?;
        self.queue.remove(position)
    }

    /// Pending tasks, oldest first
    pub fn pending(&self) -> impl Iterator<Item = &CrawlTask> {
        self.queue.iter()
    }

    /// Stops admission and drops every pending task, returning them
    pub fn close(&mut self) -> Vec<CrawlTask> {
        self.closed = true;
        self.queue.drain(..).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs admitted since the crawl started
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
