//! Robots.txt handling module
//!
//! robots.txt is fetched once per domain before its first page request and the
//! result is kept in the domain's state for the rest of the crawl.

mod cache;
mod parser;

pub use cache::{CachedRobots, RobotsSource};
pub use parser::ParsedRobots;

use crate::url::robots_url;
use reqwest::header::USER_AGENT;
use reqwest::Client;
use url::Url;

/// Fetches robots.txt for the origin of `page_url`
///
/// Never fails: a non-success status or a transport error yields allow-all
/// rules, with the reason kept in [`CachedRobots::source`].
pub async fn fetch_robots(client: &Client, page_url: &Url, user_agent: &str) -> CachedRobots {
    let Some(location) = robots_url(page_url) else {
        return CachedRobots::permissive(RobotsSource::Unreachable);
    };

    let response = match client
        .get(location.clone())
        .header(USER_AGENT, user_agent)
        .send()
        .await
    {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt unreachable at {}: {}", location, e);
            return CachedRobots::permissive(RobotsSource::Unreachable);
        }
    };

    let status = response.status();
    if !status.is_success() {
        tracing::debug!("robots.txt at {} returned {}", location, status);
        return CachedRobots::permissive(RobotsSource::Missing(status.as_u16()));
    }

    match response.text().await {
        Ok(body) => {
            tracing::debug!("Loaded robots.txt from {}", location);
            CachedRobots::fetched(ParsedRobots::from_content(&body))
        }
        Err(e) => {
            tracing::debug!("Failed to read robots.txt body from {}: {}", location, e);
            CachedRobots::permissive(RobotsSource::Unreachable)
        }
    }
}
