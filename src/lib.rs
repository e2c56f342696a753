//! Docs-Harvester: a polite documentation-site crawler
//!
//! This crate crawls a documentation site within a configured scope, extracts
//! pages, code samples and links into typed records, and aggregates them into
//! grouped statistics and rendered markdown reports.
//!
//! The three stages are exposed as plain functions so that an orchestrator only
//! has to sequence them and persist what they return:
//!
//! ```no_run
//! use docs_harvester::config::load_config;
//! use docs_harvester::crawler::run_crawl;
//! use docs_harvester::output::{aggregate, render};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(Path::new("harvester.toml"))?;
//! let title = config.report.title.clone();
//! let crawl = run_crawl(config).await?;
//! let corpus = aggregate(&crawl.records);
//! let documents = render(&corpus, &title);
//! println!("{} documents rendered", documents.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod records;
pub mod robots;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Docs-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for Docs-Harvester operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{run_crawl, CrawlOutput};
pub use output::{aggregate, render, ProcessedCorpus, Statistics};
pub use records::ValidatedRecordSet;
pub use state::{DomainState, PageState};
pub use url::{extract_domain, normalize_url, UrlFilter};
