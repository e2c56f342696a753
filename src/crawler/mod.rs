//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - The URL frontier with deduplication and depth control
//! - Request scheduling under per-domain politeness rules
//! - HTTP fetching with retry logic
//! - Overall crawl coordination and cancellation

mod coordinator;
mod fetcher;
mod frontier;
mod retry;
mod scheduler;

pub use coordinator::{run_crawl, CancelHandle, CrawlOutput, CrawlSession, SkippedUrl};
pub use fetcher::{
    build_http_client, FailureReason, FetchOutcome, FetchReport, FetchedPage, Fetcher,
    IdentityRotator,
};
pub use frontier::{Admission, CrawlTask, Frontier};
pub use retry::RetryPolicy;
pub use scheduler::Scheduler;
