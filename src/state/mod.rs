//! State module for tracking crawl progress
//!
//! - `PageState`: the lifecycle of individual pages (queued, fetching, processed, skipped, failed)
//! - `DomainState`: per-domain pacing, in-flight accounting and the cached robots.txt

mod domain_state;
mod page_state;

pub use domain_state::DomainState;
pub use page_state::PageState;
