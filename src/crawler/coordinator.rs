//! Crawler coordinator - main crawl orchestration logic
//!
//! The session owns the frontier, the scheduler and the record set and is the
//! only writer to them. Fetches run as spawned tasks and hand their final
//! (post-retry) outcome back to the session loop, which performs admission,
//! extraction and validation.

use crate::config::Config;
use crate::crawler::fetcher::{FetchOutcome, FetchReport, FetchedPage, Fetcher};
use crate::crawler::frontier::{CrawlTask, Frontier};
use crate::crawler::scheduler::Scheduler;
use crate::extract::PageExtractor;
use crate::output::CrawlSummary;
use crate::records::{ValidatedRecordSet, Validator};
use crate::robots::{fetch_robots, CachedRobots, RobotsSource};
use crate::state::PageState;
use crate::url::UrlFilter;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;
use tokio::task::{JoinError, JoinSet};
use url::Url;

/// Progress is logged every this many processed pages
const PROGRESS_INTERVAL: usize = 10;

/// Requests cancellation of a running crawl
///
/// Cancelling closes admission, aborts in-flight fetches and makes the session
/// return the records validated so far.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Resolves once [`cancel`](Self::cancel) has been called
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// A URL that was admitted but produced no records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedUrl {
    pub url: String,
    pub state: PageState,
    pub reason: Option<String>,
    pub referrer: Option<String>,
}

/// Everything a crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutput {
    /// Validated records in discovery order
    pub records: ValidatedRecordSet,
    pub skipped: Vec<SkippedUrl>,
    pub summary: CrawlSummary,
}

type FetchResult = (CrawlTask, FetchReport);

/// One crawl run
pub struct CrawlSession {
    config: Config,
    config_hash: String,
    scheduler: Scheduler,
    fetcher: Arc<Fetcher>,
    extractor: PageExtractor,
    validator: Validator,
    records: ValidatedRecordSet,
    skipped: Vec<SkippedUrl>,
    summary: CrawlSummary,
    pages_processed: usize,
    cancel: CancelHandle,
}

impl CrawlSession {
    /// Creates a new session and seeds its frontier
    pub fn new(config: Config) -> crate::Result<Self> {
        let filter = UrlFilter::new(&config.crawler)?;
        let frontier = Frontier::new(filter.clone(), config.crawler.max_depth);
        let scheduler = Scheduler::new(
            frontier,
            &config.crawler,
            &config.politeness,
            &config.user_agent.crawler_name,
        );
        let fetcher = Fetcher::new(&config)?;
        let extractor = PageExtractor::from_parts(&config.extraction, filter);
        let validator = Validator::new(config.extraction.min_content_length);

        let mut session = Self {
            config,
            config_hash: String::new(),
            scheduler,
            fetcher: Arc::new(fetcher),
            extractor,
            validator,
            records: ValidatedRecordSet::new(),
            skipped: Vec::new(),
            summary: CrawlSummary::new(),
            pages_processed: 0,
            cancel: CancelHandle::new(),
        };
        session.seed();
        Ok(session)
    }

    /// Records the configuration hash in the crawl summary
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    fn seed(&mut self) {
        let seeds = self.config.crawler.seeds.clone();
        for seed in &seeds {
            let admission = self.scheduler.frontier_mut().enqueue_seed(seed);
            if !admission.is_admitted() {
                tracing::warn!("Seed {} not admitted: {:?}", seed, admission);
            }
        }
        tracing::info!(
            "Seeded frontier with {} URLs",
            self.scheduler.frontier().len()
        );
    }

    /// Runs the crawl loop until the frontier drains or the crawl is cancelled
    pub async fn run(mut self) -> crate::Result<CrawlOutput> {
        let started = Instant::now();
        let crawl_date = Utc::now();
        let cancel = self.cancel.clone();
        let max_open = self.config.crawler.max_concurrent_pages_open.max(1) as usize;

        let mut join_set: JoinSet<FetchResult> = JoinSet::new();
        let mut in_flight: HashMap<Url, CrawlTask> = HashMap::new();

        tracing::info!(
            "Starting crawl with {} seed(s), max depth {}",
            self.scheduler.frontier().len(),
            self.config.crawler.max_depth
        );

        loop {
            while !cancel.is_cancelled() && in_flight.len() < max_open {
                let Some(task) = self.scheduler.next_ready(Instant::now()) else {
                    break;
                };
                self.dispatch(task, &mut join_set, &mut in_flight).await;
            }

            if cancel.is_cancelled() {
                break;
            }

            if join_set.is_empty() {
                self.recover_lost(&mut in_flight);
                if self.scheduler.frontier().is_empty() {
                    tracing::info!("Frontier is empty, crawl complete");
                    break;
                }
            }

            let wait = self.scheduler.time_until_ready(Instant::now());
            if join_set.is_empty() && wait.is_none() {
                tracing::warn!("Pending URLs can no longer be scheduled, stopping");
                break;
            }

            tokio::select! {
                Some(joined) = join_set.join_next() => {
                    self.handle_joined(joined, &mut in_flight);
                }
                _ = tokio::time::sleep(wait.unwrap_or_default()), if wait.is_some() => {}
                _ = cancel.cancelled() => {}
            }
        }

        let cancelled = cancel.is_cancelled();
        if cancelled {
            self.abandon(&mut join_set, &mut in_flight).await;
        }

        Ok(self.finish(crawl_date, started.elapsed(), cancelled))
    }

    /// Issues the fetch for `task`, fetching robots.txt for its domain first if needed
    async fn dispatch(
        &mut self,
        task: CrawlTask,
        join_set: &mut JoinSet<FetchResult>,
        in_flight: &mut HashMap<Url, CrawlTask>,
    ) {
        if self.scheduler.domain_state_mut(&task.domain).needs_robots() {
            let robots = if self.config.crawler.obey_robots {
                fetch_robots(
                    self.fetcher.client(),
                    &task.url,
                    &self.config.user_agent.identifying_agent(),
                )
                .await
            } else {
                CachedRobots::permissive(RobotsSource::Ignored)
            };
            self.scheduler.domain_state_mut(&task.domain).robots = Some(robots);
        }

        let agent = self.scheduler.robots_agent().to_string();
        let allowed = self
            .scheduler
            .domain_state(&task.domain)
            .and_then(|state| state.robots.as_ref())
            .map_or(true, |robots| robots.is_allowed(task.url.as_str(), &agent));
        if !allowed {
            tracing::debug!("robots.txt disallows {}", task.url);
            self.record_skip(&task, PageState::RobotsDenied, None);
            return;
        }

        let pacing = self.scheduler.record_request(&task.domain, Instant::now());
        tracing::debug!("Fetching {} (depth {})", task.url, task.depth);

        let fetcher = Arc::clone(&self.fetcher);
        in_flight.insert(task.url.clone(), task.clone());
        join_set.spawn(async move {
            let report = fetcher.fetch(&task.url, task.dont_retry, pacing).await;
            (task, report)
        });
    }

    fn handle_joined(
        &mut self,
        joined: Result<FetchResult, JoinError>,
        in_flight: &mut HashMap<Url, CrawlTask>,
    ) {
        let (task, report) = match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::error!("Fetch task failed: {}", e);
                return;
            }
        };

        in_flight.remove(&task.url);
        self.scheduler.finish(&task.domain, report.last_attempt);

        match report.outcome {
            FetchOutcome::Success(page) => self.process_page(task, page),
            FetchOutcome::PermanentFailure(reason) | FetchOutcome::RetryableFailure(reason) => {
                tracing::warn!(
                    "Failed to fetch {} after {} attempt(s): {}",
                    task.url,
                    report.attempts,
                    reason
                );
                self.record_skip(&task, reason.page_state(), Some(reason.to_string()));
            }
        }
    }

    /// Applies the post-fetch gates, extracts the page and follows its links
    fn process_page(&mut self, task: CrawlTask, page: FetchedPage) {
        let limit = self.config.crawler.max_page_bytes;
        if page.body.len() as u64 > limit {
            tracing::debug!("Skipping oversized page {}", task.url);
            let reason = format!("body exceeds {} bytes", limit);
            self.record_skip(&task, PageState::Oversized, Some(reason));
            return;
        }

        if !page.is_html() {
            tracing::debug!("Skipping non-HTML page {}", task.url);
            let reason = page.content_type().map(str::to_string);
            self.record_skip(&task, PageState::ContentMismatch, reason);
            return;
        }

        let body = String::from_utf8_lossy(&page.body);
        let extracted = self.extractor.extract(&task.url, &page.final_url, &body);

        let mut admitted = 0;
        for link in &extracted.follow {
            let admission = self
                .scheduler
                .frontier_mut()
                .enqueue(link, task.depth + 1, Some(&task.url));
            if admission.is_admitted() {
                admitted += 1;
            }
        }
        tracing::debug!(
            "Processed {}: {} of {} links admitted",
            task.url,
            admitted,
            extracted.follow.len()
        );

        self.records.absorb(
            &mut self.validator,
            extracted.item,
            extracted.code_examples,
            extracted.links,
        );
        self.summary.count_state(PageState::Processed, 1);
        self.pages_processed += 1;

        if self.pages_processed % PROGRESS_INTERVAL == 0 {
            tracing::info!(
                "Progress: {} pages processed, {} in frontier, {} items kept",
                self.pages_processed,
                self.scheduler.frontier().len(),
                self.records.documentation_items.len()
            );
        }
    }

    fn record_skip(&mut self, task: &CrawlTask, state: PageState, reason: Option<String>) {
        self.summary.count_state(state, 1);
        self.skipped.push(SkippedUrl {
            url: task.url.to_string(),
            state,
            reason,
            referrer: task.referrer.as_ref().map(Url::to_string),
        });
    }

    /// Settles tasks whose spawned fetch ended without reporting back
    fn recover_lost(&mut self, in_flight: &mut HashMap<Url, CrawlTask>) {
        let mut lost: Vec<CrawlTask> = in_flight.drain().map(|(_, task)| task).collect();
        lost.sort_by(|a, b| a.url.cmp(&b.url));
        for task in lost {
            self.scheduler.finish(&task.domain, Instant::now());
            self.record_skip(&task, PageState::Failed, Some("fetch task failed".to_string()));
        }
    }

    /// Closes admission, aborts every in-flight fetch and records it as abandoned
    async fn abandon(
        &mut self,
        join_set: &mut JoinSet<FetchResult>,
        in_flight: &mut HashMap<Url, CrawlTask>,
    ) {
        let pending = self.scheduler.frontier_mut().close();
        join_set.shutdown().await;

        let mut abandoned: Vec<CrawlTask> = in_flight.drain().map(|(_, task)| task).collect();
        abandoned.sort_by(|a, b| a.url.cmp(&b.url));
        for task in &abandoned {
            self.record_skip(task, PageState::Abandoned, Some("crawl cancelled".to_string()));
        }
        self.summary.count_state(PageState::Queued, pending.len());

        tracing::info!(
            "Crawl cancelled: {} fetch(es) abandoned, {} queued URL(s) dropped",
            abandoned.len(),
            pending.len()
        );
    }

    fn finish(self, crawl_date: chrono::DateTime<Utc>, elapsed: Duration, cancelled: bool) -> CrawlOutput {
        let mut summary = CrawlSummary::from_records(&self.records);
        summary.crawl_date = crawl_date.to_rfc3339();
        summary.config_hash = self.config_hash;
        summary.duration_seconds = elapsed.as_secs_f64();
        summary.cancelled = cancelled;
        summary.pages_by_state = self.summary.pages_by_state;
        summary.pages_fetched = self.pages_processed;
        summary.skipped_urls = self.skipped.len();
        summary.rejected = self.validator.rejected();

        tracing::info!(
            "Crawl finished in {:.1}s: {} pages processed, {} skipped, {} items kept, {} records rejected",
            summary.duration_seconds,
            summary.pages_fetched,
            summary.skipped_urls,
            summary.total_documentation_items,
            summary.rejected.total()
        );

        CrawlOutput {
            records: self.records,
            skipped: self.skipped,
            summary,
        }
    }
}

/// Runs a complete crawl and returns the validated records
///
/// # Example
///
/// ```no_run
/// use docs_harvester::config::load_config;
/// use docs_harvester::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> docs_harvester::Result<()> {
/// let config = load_config(Path::new("harvester.toml"))?;
/// let output = run_crawl(config).await?;
/// println!("{} items", output.records.documentation_items.len());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> crate::Result<CrawlOutput> {
    CrawlSession::new(config)?.run().await
}
