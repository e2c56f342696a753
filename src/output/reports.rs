//! Markdown report rendering
//!
//! Renders the fixed family of documents for a processed corpus. Apart from
//! the generation timestamp every document is a deterministic function of
//! the corpus.

use crate::output::traits::OutputResult;
use crate::output::ProcessedCorpus;
use crate::records::DocumentationItem;
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Format of the `Generated on` line
pub const GENERATED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const INDEX_DOCUMENT: &str = "README.md";
pub const GETTING_STARTED_DOCUMENT: &str = "getting_started.md";
pub const CODE_EXAMPLES_DOCUMENT: &str = "code_examples.md";
pub const API_REFERENCE_DOCUMENT: &str = "api_reference.md";
pub const COMBINED_DOCUMENT: &str = "documentation.md";

/// Items mentioning one of these are collected in the getting-started guide
const GETTING_STARTED_KEYWORDS: &[&str] = &[
    "getting started",
    "tutorial",
    "quick start",
    "beginner",
    "setup",
    "installation",
];

#[allow(clippy::unwrap_used)]
static NON_SLUG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\w\s-]").unwrap());

#[allow(clippy::unwrap_used)]
static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-\s]+").unwrap());

/// A named markdown document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    /// File name, relative to the reports directory
    pub name: String,
    pub content: String,
}

/// Converts text into a URL-safe anchor
///
/// # Example
///
/// ```
/// use docs_harvester::output::slugify;
///
/// assert_eq!(slugify("Getting Started: SDK v2!"), "getting-started-sdk-v2");
/// ```
pub fn slugify(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_SLUG_RE.replace_all(&lowered, "");
    let collapsed = SEPARATOR_RE.replace_all(&stripped, "-");
    collapsed.trim_matches('-').to_string()
}

/// Renders every report, stamped with the current local time
pub fn render(corpus: &ProcessedCorpus, title: &str) -> Vec<RenderedDocument> {
    render_at(corpus, title, Local::now().naive_local())
}

/// Renders every report, stamped with `generated_at`
///
/// The index comes first and links every other document.
pub fn render_at(
    corpus: &ProcessedCorpus,
    title: &str,
    generated_at: NaiveDateTime,
) -> Vec<RenderedDocument> {
    let stamp = format!(
        "*Generated on: {}*\n\n",
        generated_at.format(GENERATED_AT_FORMAT)
    );

    let mut contents = vec![(
        "Getting Started".to_string(),
        document(GETTING_STARTED_DOCUMENT, getting_started(corpus, title, &stamp)),
    )];

    let mut used: HashSet<String> = [
        INDEX_DOCUMENT,
        GETTING_STARTED_DOCUMENT,
        CODE_EXAMPLES_DOCUMENT,
        API_REFERENCE_DOCUMENT,
        COMBINED_DOCUMENT,
    ]
    .iter()
    .map(|name| name.to_lowercase())
    .collect();

    for (section, items) in &corpus.sections {
        let name = section_file_name(section, &mut used);
        contents.push((
            section.clone(),
            document(&name, section_document(section, items, &stamp)),
        ));
    }

    contents.push((
        "API Reference".to_string(),
        document(API_REFERENCE_DOCUMENT, api_reference(corpus, &stamp)),
    ));
    contents.push((
        "Code Examples".to_string(),
        document(CODE_EXAMPLES_DOCUMENT, code_examples(corpus, &stamp)),
    ));
    contents.push((
        "Complete Documentation".to_string(),
        document(COMBINED_DOCUMENT, combined(corpus, title, &stamp)),
    ));

    let index = index(corpus, title, &stamp, &contents);
    std::iter::once(document(INDEX_DOCUMENT, index))
        .chain(contents.into_iter().map(|(_, doc)| doc))
        .collect()
}

/// Writes rendered documents into `directory`, creating it if needed
pub fn write_documents(directory: &Path, documents: &[RenderedDocument]) -> OutputResult<()> {
    fs::create_dir_all(directory)?;
    for doc in documents {
        fs::write(directory.join(&doc.name), &doc.content)?;
    }
    tracing::info!(
        "Wrote {} documents to {}",
        documents.len(),
        directory.display()
    );
    Ok(())
}

fn document(name: &str, content: String) -> RenderedDocument {
    RenderedDocument {
        name: name.to_string(),
        content,
    }
}

/// `Wallet Integration` -> `wallet_integration.md`, made unique among `used`
fn section_file_name(section: &str, used: &mut HashSet<String>) -> String {
    let kept: String = section
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '_' || *c == '-')
        .collect();
    let mut stem = kept.split_whitespace().collect::<Vec<_>>().join("_");
    if stem.is_empty() {
        stem = "section".to_string();
    }

    let mut name = format!("{}.md", stem);
    let mut n = 2;
    while used.contains(&name) {
        name = format!("{}_{}.md", stem, n);
        n += 1;
    }
    used.insert(name.clone());
    name
}

fn index(
    corpus: &ProcessedCorpus,
    title: &str,
    stamp: &str,
    contents: &[(String, RenderedDocument)],
) -> String {
    let stats = &corpus.statistics;
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", title));
    md.push_str(stamp);

    md.push_str("## Overview\n\n");
    md.push_str(&format!(
        "- **Total Documentation Pages:** {}\n",
        stats.total_documentation_items
    ));
    md.push_str(&format!("- **Code Examples:** {}\n", stats.total_code_examples));
    md.push_str(&format!("- **Sections:** {}\n", stats.sections_count));
    md.push_str(&format!("- **Languages:** {}\n", stats.languages_count));
    md.push_str(&format!("- **Topics:** {}\n\n", stats.topics_count));

    md.push_str("## Table of Contents\n\n");
    for (i, (label, doc)) in contents.iter().enumerate() {
        md.push_str(&format!("{}. [{}]({})\n", i + 1, label, doc.name));
    }
    md.push('\n');

    md
}

fn section_document(section: &str, items: &[DocumentationItem], stamp: &str) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", section));
    md.push_str(stamp);

    md.push_str("## Overview\n\n");
    md.push_str(&format!(
        "This section contains {} documentation pages related to {}.\n\n",
        items.len(),
        section.to_lowercase()
    ));

    md.push_str("## Table of Contents\n\n");
    for (i, item) in items.iter().enumerate() {
        md.push_str(&format!("{}. [{}](#{})\n", i + 1, item.title, slugify(&item.title)));
    }
    md.push_str("\n---\n\n");

    for item in items {
        write_item(&mut md, item);
    }

    md
}

fn code_examples(corpus: &ProcessedCorpus, stamp: &str) -> String {
    let mut md = String::new();

    md.push_str("# Code Examples\n\n");
    md.push_str(stamp);

    if corpus.code_by_language.is_empty() {
        md.push_str("No code examples found in the crawled data.\n");
        return md;
    }

    for (language, examples) in &corpus.code_by_language {
        md.push_str(&format!("## {} Examples\n\n", title_case(language)));

        for (i, example) in examples.iter().enumerate() {
            md.push_str(&format!("### Example {}\n\n", i + 1));
            if !example.description.is_empty() {
                md.push_str(&format!("**Description:** {}\n\n", example.description));
            }
            md.push_str(&format!("```{}\n{}\n```\n\n", language, example.code));
            if !example.context.is_empty() {
                md.push_str(&format!("**Source:** {}\n\n", example.context));
            }
        }

        md.push_str("---\n\n");
    }

    md
}

fn api_reference(corpus: &ProcessedCorpus, stamp: &str) -> String {
    let items: Vec<&DocumentationItem> = corpus
        .items()
        .filter(|item| item.tags.contains("api") || item.page_type.contains("api"))
        .collect();

    let mut md = String::new();
    md.push_str("# API Reference\n\n");
    md.push_str(stamp);

    if items.is_empty() {
        md.push_str("No API documentation found in the crawled data.\n");
        return md;
    }

    md.push_str("## Overview\n\n");
    md.push_str(&format!(
        "This section contains {} API-related documentation pages.\n\n",
        items.len()
    ));
    for item in items {
        write_item(&mut md, item);
    }

    md
}

fn getting_started(corpus: &ProcessedCorpus, title: &str, stamp: &str) -> String {
    let items: Vec<&DocumentationItem> = corpus.items().filter(|i| is_introductory(i)).collect();

    let mut md = String::new();
    md.push_str("# Getting Started\n\n");
    md.push_str(stamp);

    md.push_str(&format!("## Welcome to {}\n\n", title));
    md.push_str("This guide collects the pages that help you take your first steps.\n\n");

    if items.is_empty() {
        md.push_str("## Getting Started Resources\n\n");
        md.push_str(
            "Please refer to the main documentation sections for getting started information.\n",
        );
        return md;
    }

    md.push_str("## Quick Start Guides\n\n");
    for item in items {
        write_item(&mut md, item);
    }

    md
}

fn is_introductory(item: &DocumentationItem) -> bool {
    let title = item.title.to_lowercase();
    let content = item.content.to_lowercase();

    GETTING_STARTED_KEYWORDS.iter().any(|keyword| {
        title.contains(keyword)
            || content.contains(keyword)
            || item.tags.iter().any(|tag| tag.to_lowercase() == *keyword)
    })
}

fn combined(corpus: &ProcessedCorpus, title: &str, stamp: &str) -> String {
    let mut md = String::new();

    md.push_str(&format!("# {}\n\n", title));
    md.push_str(stamp);

    md.push_str("## Table of Contents\n\n");
    for section in corpus.sections.keys() {
        md.push_str(&format!("- [{}](#{})\n", section, slugify(section)));
    }
    md.push_str("\n---\n\n");

    for (section, items) in &corpus.sections {
        md.push_str(&format!("## {}\n\n", section));
        for item in items {
            write_item(&mut md, item);
        }
    }

    md
}

fn write_item(md: &mut String, item: &DocumentationItem) {
    md.push_str(&format!("### {}\n\n", item.title));
    md.push_str(&format!("**Source:** {}\n\n", item.url));
    md.push_str(&format!("**Language:** {}\n\n", item.language));

    if let Some(updated) = &item.last_updated {
        md.push_str(&format!("**Last Updated:** {}\n\n", updated));
    }

    if !item.tags.is_empty() {
        let tags: Vec<&str> = item.tags.iter().map(String::as_str).collect();
        md.push_str(&format!("**Tags:** {}\n\n", tags.join(", ")));
    }

    if !item.content.is_empty() {
        md.push_str(&format!("{}\n\n", item.content));
    }

    if !item.code_blocks.is_empty() {
        md.push_str("#### Code Examples\n\n");
        for block in &item.code_blocks {
            md.push_str(&format!("```{}\n{}\n```\n\n", block.language, block.code));
        }
    }

    md.push_str("---\n\n");
}

/// Upper-cases the first letter of every word: `objective-c` -> `Objective-C`
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if after_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            after_letter = true;
        } else {
            out.push(c);
            after_letter = false;
        }
    }
    out
}
