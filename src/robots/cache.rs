use crate::robots::ParsedRobots;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Where a domain's robots rules came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsSource {
    /// robots.txt was served and parsed
    Fetched,
    /// The server answered with a non-success status; everything is allowed
    Missing(u16),
    /// robots.txt could not be retrieved; everything is allowed
    Unreachable,
    /// robots.txt handling is switched off in configuration
    Ignored,
}

/// robots.txt rules remembered for a domain for the rest of the crawl
#[derive(Debug, Clone)]
pub struct CachedRobots {
    pub rules: ParsedRobots,
    pub source: RobotsSource,
    pub fetched_at: DateTime<Utc>,
}

impl CachedRobots {
    pub fn new(rules: ParsedRobots, source: RobotsSource) -> Self {
        Self {
            rules,
            source,
            fetched_at: Utc::now(),
        }
    }

    /// Rules parsed from a served robots.txt
    pub fn fetched(rules: ParsedRobots) -> Self {
        Self::new(rules, RobotsSource::Fetched)
    }

    /// Allow-all rules standing in for an absent or unusable robots.txt
    pub fn permissive(source: RobotsSource) -> Self {
        Self::new(ParsedRobots::allow_all(), source)
    }

    pub fn is_allowed(&self, url: &str, user_agent: &str) -> bool {
        self.rules.is_allowed(url, user_agent)
    }

    pub fn crawl_delay(&self, user_agent: &str) -> Option<Duration> {
        self.rules.crawl_delay(user_agent)
    }
}
