use crate::robots::CachedRobots;
use std::time::{Duration, Instant};

/// Tracks the state of a domain during crawling
///
/// The scheduler keeps one of these per host to enforce per-domain concurrency
/// and the politeness delay between consecutive requests.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of requests issued to this domain
    pub request_count: u32,

    /// Requests currently in flight
    pub in_flight: u32,

    /// Earliest instant the next request may be issued
    pub next_allowed: Option<Instant>,

    /// robots.txt for this domain, once fetched
    pub robots: Option<CachedRobots>,
}

impl DomainState {
    /// Creates a new DomainState with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be issued to this domain now
    ///
    /// Enforces the per-domain in-flight limit and the delay recorded by the
    /// previous request.
    pub fn can_request(&self, max_in_flight: u32, now: Instant) -> bool {
        self.in_flight < max_in_flight && self.time_until_next_request(now).is_none()
    }

    /// Time left until the politeness delay has elapsed, or None if it already has
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        self.next_allowed
            .filter(|next| *next > now)
            .map(|next| next - now)
    }

    /// Records that a request was issued; the next one must wait `delay`
    pub fn record_request(&mut self, now: Instant, delay: Duration) {
        self.request_count += 1;
        self.in_flight += 1;
        self.next_allowed = Some(now + delay);
    }

    /// Records that an in-flight request completed
    pub fn finish_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Pushes the next allowed request time out to at least `now + delay`
    ///
    /// Used when a fetch task retries so that other pages of the domain keep
    /// their distance from the retried attempt.
    pub fn defer(&mut self, now: Instant, delay: Duration) {
        let candidate = now + delay;
        if self.next_allowed.map_or(true, |next| next < candidate) {
            self.next_allowed = Some(candidate);
        }
    }

    /// Whether robots.txt still has to be fetched for this domain
    pub fn needs_robots(&self) -> bool {
        self.robots.is_none()
    }

    /// Crawl-delay announced by the cached robots.txt, if any
    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        self.robots
            .as_ref()
            .and_then(|robots| robots.crawl_delay(user_agent))
    }
}
