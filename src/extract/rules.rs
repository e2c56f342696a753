//! Rule table for URL-based classification, topic tagging and completeness
//!
//! Every heuristic the extractor applies lives here as data so it can be
//! overridden from configuration and tested in isolation. Tags and the
//! completeness flag are best-effort signals.

use crate::config::{CompletenessRule, ExtractionConfig, PathRule};
use std::collections::BTreeSet;
use url::Url;

const FALLBACK_PAGE_TYPE: &str = "general";
const FALLBACK_SECTION: &str = "General Documentation";

#[derive(Debug, Clone)]
pub struct RuleTable {
    page_types: Vec<PathRule>,
    sections: Vec<PathRule>,
    topics: Vec<String>,
    completeness: Vec<CompletenessRule>,
    complete_min_content: usize,
}

impl RuleTable {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let lower = |rules: &[PathRule]| {
            rules
                .iter()
                .map(|r| PathRule {
                    pattern: r.pattern.to_lowercase(),
                    label: r.label.clone(),
                })
                .collect()
        };

        Self {
            page_types: lower(&config.page_types),
            sections: lower(&config.sections),
            topics: config.topics.iter().map(|t| t.to_lowercase()).collect(),
            completeness: config.completeness.clone(),
            complete_min_content: config.complete_min_content_length,
        }
    }

    /// First page-type rule whose pattern occurs in the path, else `general`
    pub fn page_type(&self, url: &Url) -> String {
        first_match(&self.page_types, url)
            .unwrap_or(FALLBACK_PAGE_TYPE)
            .to_string()
    }

    /// First section rule whose pattern occurs in the path, else `General Documentation`
    pub fn section(&self, url: &Url) -> String {
        first_match(&self.sections, url)
            .unwrap_or(FALLBACK_SECTION)
            .to_string()
    }

    /// Topics from the vocabulary that occur in `text`, case-insensitively
    pub fn topics_in(&self, text: &str) -> Vec<String> {
        let haystack = text.to_lowercase();
        self.topics
            .iter()
            .filter(|topic| haystack.contains(topic.as_str()))
            .cloned()
            .collect()
    }

    /// Completeness policy: a title, at least `complete-min-content-length`
    /// characters of content, plus one of the required tags when the page
    /// type has a rule
    pub fn is_complete(
        &self,
        page_type: &str,
        title: &str,
        content: &str,
        tags: &BTreeSet<String>,
    ) -> bool {
        let content_chars = content.trim().chars().count();
        if title.trim().is_empty() || content_chars < self.complete_min_content {
            return false;
        }

        match self.completeness.iter().find(|r| r.page_type == page_type) {
            Some(rule) => rule.required_tags.iter().any(|tag| tags.contains(tag)),
            None => true,
        }
    }
}

/// Matches against the lower-cased path with a trailing slash, so that
/// `/mini-dapp` and `/mini-dapp/` both satisfy a `/mini-dapp/` pattern
fn first_match<'a>(rules: &'a [PathRule], url: &Url) -> Option<&'a str> {
    let mut path = url.path().to_lowercase();
    if !path.ends_with('/') {
        path.push('/');
    }

    rules
        .iter()
        .find(|rule| path.contains(rule.pattern.as_str()))
        .map(|rule| rule.label.as_str())
}
