//! Markdown summary generation
//!
//! This module generates a human-readable markdown summary of a crawl run:
//! run information, overall statistics, the page-state breakdown and the
//! grouped item counts.

use crate::output::traits::{CrawlSummary, OutputResult};
use crate::state::PageState;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// File name of the crawl summary document
pub const SUMMARY_DOCUMENT: &str = "CRAWL_SUMMARY.md";

/// Writes the markdown summary of `summary` to `output_path`
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# Docs-Harvester Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Crawl Date**: {}\n", summary.crawl_date));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds ({:.2} minutes)\n",
        summary.duration_seconds,
        summary.duration_seconds / 60.0
    ));
    let status = if summary.cancelled {
        "cancelled (partial results)"
    } else {
        "completed"
    };
    md.push_str(&format!("- **Status**: {}\n", status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Overall statistics
    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!(
        "- **Documentation Items**: {}\n",
        summary.total_documentation_items
    ));
    md.push_str(&format!(
        "- **Code Examples**: {}\n",
        summary.total_code_examples
    ));
    md.push_str(&format!("- **Links**: {}\n", summary.total_links));
    md.push_str(&format!("- **Pages Fetched**: {}\n", summary.pages_fetched));
    md.push_str(&format!("- **Skipped URLs**: {}\n", summary.skipped_urls));
    md.push_str(&format!(
        "- **Rejected Records**: {} (items {}, code examples {}, links {})\n",
        summary.rejected.total(),
        summary.rejected.documentation_items,
        summary.rejected.code_examples,
        summary.rejected.links
    ));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!("- **Error Rate**: {:.2}%\n\n", summary.error_rate()));

    // State breakdown
    md.push_str("## Page State Breakdown\n\n");
    md.push_str("| State | Count |\n");
    md.push_str("|-------|-------|\n");
    for state in PageState::all_states() {
        let count = summary.pages_in(state);
        if count > 0 {
            md.push_str(&format!("| {} | {} |\n", state_label(state), count));
        }
    }
    md.push('\n');

    push_counts(&mut md, "Sections", "Section", &summary.sections);
    push_counts(&mut md, "Languages", "Language", &summary.languages);
    push_counts(&mut md, "Page Types", "Page Type", &summary.page_types);

    md
}

fn push_counts(md: &mut String, heading: &str, column: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }

    md.push_str(&format!("## {}\n\n", heading));
    md.push_str(&format!("| {} | Items |\n", column));
    md.push_str("|-------|-------|\n");
    for (key, count) in counts {
        md.push_str(&format!("| {} | {} |\n", key, count));
    }
    md.push('\n');
}

fn state_label(state: PageState) -> &'static str {
    match state {
        PageState::Queued => "Queued (dropped on cancel)",
        PageState::Fetching => "Fetching",
        PageState::Processed => "Processed",
        PageState::Oversized => "Oversized",
        PageState::ContentMismatch => "Content Mismatch",
        PageState::RobotsDenied => "Denied by robots.txt",
        PageState::DeadLink => "Dead Link (404/410)",
        PageState::Failed => "Failed",
        PageState::RetriesExhausted => "Retries Exhausted",
        PageState::Abandoned => "Abandoned",
    }
}
