//! Scheduler for releasing frontier tasks under the politeness rules
//!
//! This module handles:
//! - Per-domain in-flight limits
//! - The delay (plus random jitter) between requests to the same domain
//! - Integrating robots.txt crawl delays

use crate::config::{CrawlerConfig, PolitenessConfig};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::state::DomainState;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Releases frontier tasks whose domain is ready for another request
///
/// The scheduler does not sleep itself; it reports how long the caller has
/// to wait so that the crawl loop can also watch completions and cancellation.
#[derive(Debug)]
pub struct Scheduler {
    frontier: Frontier,

    /// Per-domain state tracking
    domain_states: HashMap<String, DomainState>,

    max_per_domain: u32,
    politeness: PolitenessConfig,

    /// Product token matched against robots.txt groups
    robots_agent: String,
}

impl Scheduler {
    pub fn new(
        frontier: Frontier,
        crawler: &CrawlerConfig,
        politeness: &PolitenessConfig,
        robots_agent: &str,
    ) -> Self {
        Self {
            frontier,
            domain_states: HashMap::new(),
            max_per_domain: crawler.max_concurrent_per_domain.max(1),
            politeness: politeness.clone(),
            robots_agent: robots_agent.to_string(),
        }
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn frontier_mut(&mut self) -> &mut Frontier {
        &mut self.frontier
    }

    /// Takes the oldest task whose domain can accept a request at `now`
    pub fn next_ready(&mut self, now: Instant) -> Option<CrawlTask> {
        let states = &self.domain_states;
        let max = self.max_per_domain;
        self.frontier.take_first(|task| {
            states
                .get(&task.domain)
                .map_or(true, |state| state.can_request(max, now))
        })
    }

    /// Shortest wait until some pending task's domain leaves its politeness delay
    ///
    /// None when nothing is pending, or when every pending domain is only
    /// blocked by requests still in flight (their completion is the wake-up).
    pub fn time_until_ready(&self, now: Instant) -> Option<Duration> {
        self.frontier
            .pending()
            .filter_map(|task| match self.domain_states.get(&task.domain) {
                None => Some(Duration::ZERO),
                Some(state) if state.in_flight >= self.max_per_domain => None,
                Some(state) => Some(state.time_until_next_request(now).unwrap_or_default()),
            })
            .min()
    }

    /// Records a request issued to `domain`; returns the delay imposed on the next one
    pub fn record_request(&mut self, domain: &str, now: Instant) -> Duration {
        let delay = self.effective_delay(domain) + self.jitter();
        self.domain_state_mut(domain).record_request(now, delay);
        delay
    }

    /// Records that a request to `domain` finished; `last_attempt` is when
    /// its final attempt was sent, which may be later than the dispatch when
    /// the fetch was retried
    pub fn finish(&mut self, domain: &str, last_attempt: Instant) {
        let delay = self.effective_delay(domain);
        let state = self.domain_state_mut(domain);
        state.finish_request();
        state.defer(last_attempt, delay);
    }

    /// Configured delay, or the robots.txt Crawl-delay when that is longer
    pub fn effective_delay(&self, domain: &str) -> Duration {
        let configured = Duration::from_millis(self.politeness.delay_ms);
        let robots = self
            .domain_states
            .get(domain)
            .and_then(|state| state.crawl_delay(&self.robots_agent))
            .unwrap_or(Duration::ZERO);

        configured.max(robots)
    }

    fn jitter(&self) -> Duration {
        match self.politeness.jitter_ms {
            0 => Duration::ZERO,
            max => Duration::from_millis(rand::random_range(0..=max)),
        }
    }

    pub fn domain_state(&self, domain: &str) -> Option<&DomainState> {
        self.domain_states.get(domain)
    }

    pub fn domain_state_mut(&mut self, domain: &str) -> &mut DomainState {
        self.domain_states.entry(domain.to_string()).or_default()
    }

    pub fn robots_agent(&self) -> &str {
        &self.robots_agent
    }
}
