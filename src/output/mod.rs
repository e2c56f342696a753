//! Output module for aggregating and persisting crawl results
//!
//! This module handles:
//! - Grouping the validated records into a processed corpus with statistics
//! - Rendering the markdown report family
//! - Persisting collections as JSON and reading them back
//! - Generating the markdown crawl summary

mod corpus;
mod json_output;
mod markdown;
mod reports;
pub mod stats;
mod traits;

pub use corpus::{aggregate, aggregate_at, ProcessedCorpus};
pub use json_output::{
    JsonOutput, CODE_EXAMPLES_FILE, CRAWL_SUMMARY_FILE, DOCUMENTATION_ITEMS_FILE, LINKS_FILE,
    PROCESSED_DATA_FILE,
};
pub use markdown::{format_markdown_summary, generate_markdown_summary, SUMMARY_DOCUMENT};
pub use reports::{render, render_at, slugify, write_documents, RenderedDocument};
pub use stats::{print_statistics, Statistics};
pub use traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};
