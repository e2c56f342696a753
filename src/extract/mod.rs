//! Page classifier and extractor
//!
//! Turns one fetched HTML page into typed records. Extraction is a pure
//! function of the page URL and body: no I/O, no clock, no shared state.
//!
//! # Example
//!
//! ```
//! use docs_harvester::config::parse_config;
//! use docs_harvester::extract::PageExtractor;
//! use url::Url;
//!
//! # let config = parse_config(r#"
//! # [crawler]
//! # seeds = ["https://docs.example.com/"]
//! # allowed-domains = ["docs.example.com"]
//! # [user-agent]
//! # crawler-name = "bot"
//! # crawler-version = "1"
//! # contact-url = "https://example.com"
//! # contact-email = "bot@example.com"
//! # [output]
//! # directory = "out"
//! # reports-directory = "out/r"
//! # "#).unwrap();
//! let extractor = PageExtractor::new(&config).unwrap();
//! let url = Url::parse("https://docs.example.com/mini-dapp/intro").unwrap();
//! let page = extractor.extract(&url, &url, "<h1>Intro</h1><p>Build with the SDK.</p>");
//!
//! let item = page.item.unwrap();
//! assert_eq!(item.title, "Intro");
//! assert_eq!(item.page_type, "mini_dapp");
//! assert!(item.tags.contains("sdk"));
//! ```

mod html;
mod language;
mod rules;

pub use language::detect_language;
pub use rules::RuleTable;

use crate::config::{Config, ExtractionConfig};
use crate::records::{CodeExample, DocumentationItem, LinkRecord, LinkRef};
use crate::url::UrlFilter;
use crate::ConfigError;
use scraper::Html;
use std::collections::BTreeSet;
use url::Url;

/// Everything extracted from one page
#[derive(Debug, Clone, Default)]
pub struct PageRecords {
    /// None when the page has no usable title
    pub item: Option<DocumentationItem>,
    pub code_examples: Vec<CodeExample>,
    pub links: Vec<LinkRecord>,
    /// Absolute http(s) URLs to offer to the frontier
    pub follow: Vec<String>,
}

/// Extracts records from HTML according to the configured rule table
#[derive(Debug, Clone)]
pub struct PageExtractor {
    rules: RuleTable,
    scope: UrlFilter,
    inline_code_min_length: usize,
    substantial_code_length: usize,
}

impl PageExtractor {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        Ok(Self::from_parts(
            &config.extraction,
            UrlFilter::new(&config.crawler)?,
        ))
    }

    pub fn from_parts(extraction: &ExtractionConfig, scope: UrlFilter) -> Self {
        Self {
            rules: RuleTable::from_config(extraction),
            scope,
            inline_code_min_length: extraction.inline_code_min_length,
            substantial_code_length: extraction.substantial_code_length,
        }
    }

    /// Extracts the records of one page
    ///
    /// `url` identifies the page in the records; `base` (the URL after
    /// redirects) is what relative follow links are resolved against.
    pub fn extract(&self, url: &Url, base: &Url, body: &str) -> PageRecords {
        let document = Html::parse_document(body);
        let page_url = url.to_string();

        let title = html::first_text(&document, html::TITLE_SELECTORS)
            .unwrap_or_else(|| html::title_from_path(url));
        let text = html::page_text(&document);
        let page_type = self.rules.page_type(url);
        let content = html::paragraphs(&document);

        let mut tags: BTreeSet<String> = html::meta_keywords(&document).into_iter().collect();
        tags.extend(self.rules.topics_in(&text));
        if html::has_meta_description(&document) {
            tags.insert("description".to_string());
        }

        let fenced = html::fenced_blocks(&document);
        let code_examples = fenced
            .iter()
            .filter(|f| f.block.code.chars().count() > self.substantial_code_length)
            .map(|f| CodeExample {
                language: f.block.language.clone(),
                code: f.block.code.clone(),
                description: f
                    .description
                    .clone()
                    .unwrap_or_else(|| "Code example".to_string()),
                context: page_url.clone(),
                url: page_url.clone(),
            })
            .collect();

        let mut code_blocks: Vec<_> = fenced.into_iter().map(|f| f.block).collect();
        code_blocks.extend(html::inline_blocks(&document, self.inline_code_min_length));

        let link_refs: Vec<LinkRef> = html::anchors(&document, url)
            .into_iter()
            .map(|(target, text)| LinkRef {
                is_internal: self.scope.is_internal(&target),
                url: target.to_string(),
                text,
            })
            .collect();

        let links = link_refs
            .iter()
            .map(|link| LinkRecord {
                url: link.url.clone(),
                text: link.text.clone(),
                is_internal: link.is_internal,
                is_broken: false,
                context: page_url.clone(),
            })
            .collect();

        let item = (!title.is_empty()).then(|| DocumentationItem {
            url: page_url.clone(),
            last_updated: html::first_text(&document, html::LAST_UPDATED_SELECTORS),
            language: detect_language(html::declared_language(&document).as_deref(), &text),
            section: self.rules.section(url),
            headings: html::headings(&document),
            content_length: content.chars().count(),
            has_code: !code_blocks.is_empty(),
            is_complete: self.rules.is_complete(&page_type, &title, &content, &tags),
            title,
            page_type,
            content,
            code_blocks,
            links: link_refs,
            tags,
        });

        PageRecords {
            item,
            code_examples,
            links,
            follow: html::follow_links(&document, base),
        }
    }
}
