//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client (timeout, redirect limit, compression)
//! - Drawing a User-Agent identity for every attempt
//! - Classifying each attempt as success, transient or permanent failure
//! - Retrying transient failures with exponential backoff

use crate::config::{Config, UserAgentConfig};
use crate::crawler::retry::RetryPolicy;
use crate::state::PageState;
use reqwest::header::{HeaderMap, CONTENT_TYPE, USER_AGENT};
use reqwest::{redirect::Policy, Client};
use std::fmt;
use std::time::{Duration, Instant};
use url::Url;

/// Maximum redirect hops followed for a single request
const MAX_REDIRECTS: usize = 10;

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,
    pub status: u16,
    pub headers: HeaderMap,
    /// Response body; reading stops once it grows past the page size limit
    pub body: Vec<u8>,
}

impl FetchedPage {
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// True unless a Content-Type is present and does not mention html
    pub fn is_html(&self) -> bool {
        self.content_type()
            .map_or(true, |ct| ct.to_ascii_lowercase().contains("html"))
    }
}

/// Why a fetch did not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Non-2xx HTTP status
    Status(u16),
    Timeout,
    Connect,
    /// Any other transport problem (redirect loop, body read error, ...)
    Transport(String),
    /// A transient failure persisted through every allowed attempt
    RetriesExhausted {
        attempts: u32,
        last: Box<FailureReason>,
    },
}

impl FailureReason {
    /// The page state a permanent failure is recorded with
    pub fn page_state(&self) -> PageState {
        match self {
            FailureReason::Status(404) | FailureReason::Status(410) => PageState::DeadLink,
            FailureReason::RetriesExhausted { .. } => PageState::RetriesExhausted,
            _ => PageState::Failed,
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::Status(code) => write!(f, "HTTP {}", code),
            FailureReason::Timeout => write!(f, "request timeout"),
            FailureReason::Connect => write!(f, "connection failed"),
            FailureReason::Transport(msg) => write!(f, "transport error: {}", msg),
            FailureReason::RetriesExhausted { attempts, last } => {
                write!(f, "gave up after {} attempts ({})", attempts, last)
            }
        }
    }
}

/// Result of a single fetch attempt
#[derive(Debug)]
pub enum FetchOutcome {
    Success(FetchedPage),
    RetryableFailure(FailureReason),
    PermanentFailure(FailureReason),
}

/// Final outcome of a task after all of its attempts
#[derive(Debug)]
pub struct FetchReport {
    /// Either `Success` or `PermanentFailure`
    pub outcome: FetchOutcome,
    pub attempts: u32,
    /// When the last attempt was sent
    pub last_attempt: Instant,
}

/// Pool of User-Agent identities, one drawn at random per attempt
#[derive(Debug, Clone)]
pub struct IdentityRotator {
    identities: Vec<String>,
}

impl IdentityRotator {
    /// Uses the rotation pool when configured, else the identifying agent alone
    pub fn from_config(config: &UserAgentConfig) -> Self {
        let identities = if config.rotate.is_empty() {
            vec![config.identifying_agent()]
        } else {
            config.rotate.clone()
        };
        Self { identities }
    }

    pub fn pick(&self) -> &str {
        match self.identities.len() {
            0 => "",
            1 => &self.identities[0],
            n => &self.identities[rand::random_range(0..n)],
        }
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// Builds an HTTP client with proper configuration
///
/// The default User-Agent is the identifying agent; [`Fetcher`] overrides
/// it per request when a rotation pool is configured.
///
/// # Example
///
/// ```no_run
/// use docs_harvester::config::parse_config;
/// use docs_harvester::crawler::build_http_client;
///
/// # fn example(toml: &str) -> Result<(), Box<dyn std::error::Error>> {
/// let config = parse_config(toml)?;
/// let client = build_http_client(&config)?;
/// # Ok(())
/// # }
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.identifying_agent())
        .timeout(Duration::from_secs(config.crawler.fetch_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches pages with identity rotation and retries
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
    identities: IdentityRotator,
    retry: RetryPolicy,
    max_page_bytes: u64,
}

impl Fetcher {
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
            identities: IdentityRotator::from_config(&config.user_agent),
            retry: RetryPolicy::from_config(&config.retry),
            max_page_bytes: config.crawler.max_page_bytes,
        })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Performs one attempt and classifies it
    pub async fn fetch_once(&self, url: &Url) -> FetchOutcome {
        let response = match self
            .client
            .get(url.clone())
            .header(USER_AGENT, self.identities.pick())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return classify_error(&e),
        };

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let reason = FailureReason::Status(status);
            return if self.retry.is_retryable_status(status) {
                FetchOutcome::RetryableFailure(reason)
            } else {
                FetchOutcome::PermanentFailure(reason)
            };
        }

        let final_url = response.url().clone();
        let headers = response.headers().clone();
        let mut response = response;
        let mut body = Vec::new();

        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    body.extend_from_slice(&chunk);
                    if body.len() as u64 > self.max_page_bytes {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => return classify_error(&e),
            }
        }

        FetchOutcome::Success(FetchedPage {
            final_url,
            status,
            headers,
            body,
        })
    }

    /// Fetches `url`, retrying transient failures
    ///
    /// Between attempts the task waits `pacing` (the domain's politeness
    /// delay) plus the backoff for that retry. The returned outcome is never
    /// `RetryableFailure`.
    pub async fn fetch(&self, url: &Url, dont_retry: bool, pacing: Duration) -> FetchReport {
        let mut attempts = 0;

        loop {
            attempts += 1;
            let started = Instant::now();
            let reason = match self.fetch_once(url).await {
                FetchOutcome::RetryableFailure(reason) => reason,
                outcome => {
                    return FetchReport {
                        outcome,
                        attempts,
                        last_attempt: started,
                    }
                }
            };

            if self.retry.should_retry(attempts, dont_retry) {
                let backoff = self.retry.calculate_backoff(attempts);
                tracing::debug!(
                    "Retrying {} in {:?} after attempt {} ({})",
                    url,
                    pacing + backoff,
                    attempts,
                    reason
                );
                tokio::time::sleep(pacing + backoff).await;
                continue;
            }

            let reason = if dont_retry {
                reason
            } else {
                FailureReason::RetriesExhausted {
                    attempts,
                    last: Box::new(reason),
                }
            };
            return FetchReport {
                outcome: FetchOutcome::PermanentFailure(reason),
                attempts,
                last_attempt: started,
            };
        }
    }
}

/// Maps a reqwest error onto the retry classification
fn classify_error(e: &reqwest::Error) -> FetchOutcome {
    if e.is_timeout() {
        FetchOutcome::RetryableFailure(FailureReason::Timeout)
    } else if e.is_connect() {
        FetchOutcome::RetryableFailure(FailureReason::Connect)
    } else if e.is_request() || e.is_body() {
        FetchOutcome::RetryableFailure(FailureReason::Transport(e.to_string()))
    } else {
        FetchOutcome::PermanentFailure(FailureReason::Transport(e.to_string()))
    }
}
