//! Corpus statistics
//!
//! Statistics are a pure function of the grouped corpus; recomputing them
//! from persisted records gives the same values.

use crate::records::{CodeExample, DocumentationItem};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Format of `processing_date`
pub const PROCESSING_DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

/// Aggregate statistics of a processed corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_documentation_items: usize,
    pub total_code_examples: usize,
    pub total_links: usize,

    /// Number of distinct groups per grouping
    pub sections_count: usize,
    pub languages_count: usize,
    pub page_types_count: usize,
    pub topics_count: usize,

    /// Content length in characters, summed over all items
    pub total_content_length: usize,

    /// 0 when there are no items
    pub average_content_length: f64,

    /// Distinct code example languages, sorted
    pub code_languages: Vec<String>,
    pub code_languages_count: usize,

    pub processing_date: String,
}

/// Counts of the groupings a corpus was split into
#[derive(Debug, Clone, Copy, Default)]
pub struct GroupCounts {
    pub sections: usize,
    pub languages: usize,
    pub page_types: usize,
    pub topics: usize,
}

impl Statistics {
    /// Computes statistics for `items`, `code_examples` and `total_links` links
    pub fn compute(
        items: &[DocumentationItem],
        code_examples: &[CodeExample],
        total_links: usize,
        groups: GroupCounts,
        processed_at: NaiveDateTime,
    ) -> Self {
        let total_content_length: usize = items.iter().map(|i| i.content.chars().count()).sum();
        let average_content_length = if items.is_empty() {
            0.0
        } else {
            total_content_length as f64 / items.len() as f64
        };

        let code_languages: Vec<String> = code_examples
            .iter()
            .map(|example| example.language.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Self {
            total_documentation_items: items.len(),
            total_code_examples: code_examples.len(),
            total_links,
            sections_count: groups.sections,
            languages_count: groups.languages,
            page_types_count: groups.page_types,
            topics_count: groups.topics,
            total_content_length,
            average_content_length,
            code_languages_count: code_languages.len(),
            code_languages,
            processing_date: processed_at.format(PROCESSING_DATE_FORMAT).to_string(),
        }
    }
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &Statistics, sections: &BTreeMap<String, usize>) {
    println!("=== Corpus Statistics ===\n");

    println!("Overview:");
    println!("  Documentation items: {}", stats.total_documentation_items);
    println!("  Code examples: {}", stats.total_code_examples);
    println!("  Links: {}", stats.total_links);
    println!(
        "  Content length: {} total, {:.1} average",
        stats.total_content_length, stats.average_content_length
    );
    println!();

    println!("Items by Section:");
    // Sort sections by count (descending)
    let mut section_counts: Vec<_> = sections.iter().collect();
    section_counts.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    for (section, count) in section_counts {
        let percentage = if stats.total_documentation_items > 0 {
            (*count as f64 / stats.total_documentation_items as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", section, count, percentage);
    }
    println!();

    println!(
        "Groups: {} sections, {} languages, {} page types, {} topics",
        stats.sections_count, stats.languages_count, stats.page_types_count, stats.topics_count
    );

    if !stats.code_languages.is_empty() {
        println!(
            "Code Languages ({}): {}",
            stats.code_languages_count,
            stats.code_languages.join(", ")
        );
    }
}
