//! Output handler traits and types
//!
//! This module defines the trait interface for output handlers and
//! associated data structures for crawl summaries.

use crate::output::ProcessedCorpus;
use crate::records::{RejectionCounts, ValidatedRecordSet};
use crate::state::PageState;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Summary statistics for a crawl
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlSummary {
    // Run metadata
    pub crawl_date: String,
    pub config_hash: String,
    pub duration_seconds: f64,
    pub cancelled: bool,

    // Record totals
    pub total_documentation_items: usize,
    pub total_code_examples: usize,
    pub total_links: usize,

    // Item counts per grouping key
    pub sections: BTreeMap<String, usize>,
    pub languages: BTreeMap<String, usize>,
    pub page_types: BTreeMap<String, usize>,

    // State breakdown (snake_case state name -> count)
    pub pages_by_state: BTreeMap<String, usize>,
    pub pages_fetched: usize,
    pub skipped_urls: usize,

    /// Records dropped by the validator
    pub rejected: RejectionCounts,
}

impl CrawlSummary {
    /// Creates a new empty crawl summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Summary with the record totals and grouped counts of `records` filled in
    pub fn from_records(records: &ValidatedRecordSet) -> Self {
        let mut summary = Self {
            total_documentation_items: records.documentation_items.len(),
            total_code_examples: records.code_examples.len(),
            total_links: records.links.len(),
            ..Self::default()
        };

        for item in &records.documentation_items {
            *summary.sections.entry(item.section.clone()).or_default() += 1;
            *summary.languages.entry(item.language.clone()).or_default() += 1;
            *summary.page_types.entry(item.page_type.clone()).or_default() += 1;
        }

        summary
    }

    /// Adds `count` pages to the tally of `state`
    pub fn count_state(&mut self, state: PageState, count: usize) {
        if count > 0 {
            *self
                .pages_by_state
                .entry(state.as_str().to_string())
                .or_default() += count;
        }
    }

    /// Number of pages that ended in `state`
    pub fn pages_in(&self, state: PageState) -> usize {
        self.pages_by_state
            .get(state.as_str())
            .copied()
            .unwrap_or(0)
    }

    /// Returns the total number of pages in terminal states
    pub fn total_terminal_pages(&self) -> usize {
        PageState::all_states()
            .iter()
            .filter(|state| state.is_terminal())
            .map(|state| self.pages_in(*state))
            .sum()
    }

    /// Returns the success rate as a percentage
    pub fn success_rate(&self) -> f64 {
        let terminal = self.total_terminal_pages();
        if terminal == 0 {
            return 0.0;
        }
        (self.pages_in(PageState::Processed) as f64 / terminal as f64) * 100.0
    }

    /// Returns the error rate as a percentage
    pub fn error_rate(&self) -> f64 {
        let terminal = self.total_terminal_pages();
        if terminal == 0 {
            return 0.0;
        }
        let errors: usize = PageState::all_states()
            .iter()
            .filter(|state| state.is_error())
            .map(|state| self.pages_in(*state))
            .sum();
        (errors as f64 / terminal as f64) * 100.0
    }
}

/// Trait for output handlers
///
/// Output handlers persist the stages of a run so that a later run can
/// reload them (e.g. to render reports without crawling again).
pub trait OutputHandler {
    /// Persists the validated record collections
    fn write_records(&self, records: &ValidatedRecordSet) -> OutputResult<()>;

    /// Persists the crawl summary
    fn write_summary(&self, summary: &CrawlSummary) -> OutputResult<()>;

    /// Persists the aggregated corpus
    fn write_corpus(&self, corpus: &ProcessedCorpus) -> OutputResult<()>;

    /// Loads previously persisted record collections
    fn load_records(&self) -> OutputResult<ValidatedRecordSet>;
}
