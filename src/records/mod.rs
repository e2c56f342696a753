//! Typed records produced by extraction and kept after validation

mod clean;

pub use clean::{clean_code, clean_text, RejectionCounts, Validator};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A heading found on a page, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// 1 for `h1` through 6 for `h6`
    pub level: u8,
    pub text: String,
}

/// How a code fragment appeared on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeKind {
    /// A `pre` block
    Fenced,
    /// A `code` element outside any `pre`
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub language: String,
    pub code: String,
    pub kind: CodeKind,
}

/// An anchor found on a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub url: String,
    pub text: String,
    pub is_internal: bool,
}

/// One crawled documentation page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentationItem {
    pub url: String,
    pub title: String,
    /// Update marker published by the page, if any
    pub last_updated: Option<String>,
    pub page_type: String,
    pub language: String,
    pub section: String,
    pub headings: Vec<Heading>,
    pub content: String,
    pub code_blocks: Vec<CodeBlock>,
    pub links: Vec<LinkRef>,
    pub tags: BTreeSet<String>,
    /// Character count of `content`
    pub content_length: usize,
    pub has_code: bool,
    pub is_complete: bool,
}

/// A substantial code sample lifted out of a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeExample {
    pub language: String,
    pub code: String,
    pub description: String,
    /// URL of the page the sample was found on
    pub context: String,
    pub url: String,
}

/// A hyperlink observed on a crawled page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    pub text: String,
    pub is_internal: bool,
    /// Liveness is not checked; always false
    pub is_broken: bool,
    /// URL of the page the link was found on
    pub context: String,
}

/// The validated corpus, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatedRecordSet {
    pub documentation_items: Vec<DocumentationItem>,
    pub code_examples: Vec<CodeExample>,
    pub links: Vec<LinkRecord>,
}

impl ValidatedRecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one page's records through the validator and keeps the survivors
    pub fn absorb(
        &mut self,
        validator: &mut Validator,
        item: Option<DocumentationItem>,
        code_examples: Vec<CodeExample>,
        links: Vec<LinkRecord>,
    ) {
        if let Some(item) = item.and_then(|item| validator.validate_item(item)) {
            self.documentation_items.push(item);
        }
        self.code_examples.extend(
            code_examples
                .into_iter()
                .filter_map(|example| validator.validate_code_example(example)),
        );
        self.links
            .extend(links.into_iter().filter_map(|link| validator.validate_link(link)));
    }

    pub fn is_empty(&self) -> bool {
        self.documentation_items.is_empty() && self.code_examples.is_empty() && self.links.is_empty()
    }
}
