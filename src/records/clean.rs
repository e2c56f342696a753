//! Validation and cleaning of extracted records
//!
//! Records that fail a check are dropped and counted; cleaning never fails.

use crate::records::{CodeExample, DocumentationItem, LinkRecord};
use serde::{Deserialize, Serialize};

/// Code shorter than this (in characters) is not worth keeping
const MIN_CODE_LENGTH: usize = 10;

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_SECTION: &str = "General Documentation";
const DEFAULT_CODE_LANGUAGE: &str = "text";
const DEFAULT_CODE_DESCRIPTION: &str = "Code example";

/// Number of records dropped during validation, per record kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionCounts {
    pub documentation_items: usize,
    pub code_examples: usize,
    pub links: usize,
}

impl RejectionCounts {
    pub fn total(&self) -> usize {
        self.documentation_items + self.code_examples + self.links
    }
}

/// Filters and normalizes records before they enter the validated corpus
#[derive(Debug, Clone)]
pub struct Validator {
    min_content_length: usize,
    rejected: RejectionCounts,
}

impl Validator {
    pub fn new(min_content_length: usize) -> Self {
        Self {
            min_content_length,
            rejected: RejectionCounts::default(),
        }
    }

    pub fn rejected(&self) -> RejectionCounts {
        self.rejected
    }

    /// Cleans a page record; drops it if the title is empty or the cleaned
    /// content is shorter than the minimum content length
    pub fn validate_item(&mut self, mut item: DocumentationItem) -> Option<DocumentationItem> {
        item.title = clean_text(&item.title);
        item.content = clean_text(&item.content);
        item.content_length = item.content.chars().count();

        if item.title.is_empty() || item.content_length < self.min_content_length {
            tracing::debug!(
                "Rejected documentation item {} ({} chars of content)",
                item.url,
                item.content_length
            );
            self.rejected.documentation_items += 1;
            return None;
        }

        if item.language.trim().is_empty() {
            item.language = DEFAULT_LANGUAGE.to_string();
        }
        if item.section.trim().is_empty() {
            item.section = DEFAULT_SECTION.to_string();
        }
        for block in &mut item.code_blocks {
            block.code = clean_code(&block.code);
        }
        for heading in &mut item.headings {
            heading.text = clean_text(&heading.text);
        }

        Some(item)
    }

    /// Cleans a code example; drops it if the code is too short to be useful
    pub fn validate_code_example(&mut self, mut example: CodeExample) -> Option<CodeExample> {
        example.code = clean_code(&example.code);

        if example.code.chars().count() < MIN_CODE_LENGTH {
            self.rejected.code_examples += 1;
            return None;
        }

        if example.language.trim().is_empty() {
            example.language = DEFAULT_CODE_LANGUAGE.to_string();
        }
        example.description = clean_text(&example.description);
        if example.description.is_empty() {
            example.description = DEFAULT_CODE_DESCRIPTION.to_string();
        }

        Some(example)
    }

    /// Cleans a link; drops it if the url or the text is missing
    pub fn validate_link(&mut self, mut link: LinkRecord) -> Option<LinkRecord> {
        link.url = link.url.trim().to_string();
        link.text = clean_text(&link.text);

        if link.url.is_empty() || link.text.is_empty() {
            self.rejected.links += 1;
            return None;
        }

        Some(link)
    }
}

/// Normalizes prose: typographic quotes and non-breaking spaces become their
/// ASCII counterparts, whitespace runs collapse to one space, ends are trimmed
pub fn clean_text(text: &str) -> String {
    replace_smart_punctuation(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Normalizes code like [`clean_text`] but keeps its line structure
pub fn clean_code(code: &str) -> String {
    replace_smart_punctuation(code).trim().to_string()
}

fn replace_smart_punctuation(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{00A0}' => ' ',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            other => other,
        })
        .collect()
}
