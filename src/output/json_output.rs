//! JSON-file output handler implementation
//!
//! This module provides an output handler that persists each collection as a
//! pretty-printed JSON file in the output directory and reads them back.

use crate::output::traits::{CrawlSummary, OutputError, OutputHandler, OutputResult};
use crate::output::ProcessedCorpus;
use crate::records::ValidatedRecordSet;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

pub const DOCUMENTATION_ITEMS_FILE: &str = "documentation_items.json";
pub const CODE_EXAMPLES_FILE: &str = "code_examples.json";
pub const LINKS_FILE: &str = "links.json";
pub const CRAWL_SUMMARY_FILE: &str = "crawl_summary.json";
pub const PROCESSED_DATA_FILE: &str = "processed_data.json";

/// JSON-file output handler
///
/// Writes go to a temporary file that is renamed into place, so a failed
/// write never leaves a truncated collection behind.
#[derive(Debug, Clone)]
pub struct JsonOutput {
    directory: PathBuf,
}

impl JsonOutput {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Loads a previously persisted crawl summary
    pub fn load_summary(&self) -> OutputResult<CrawlSummary> {
        self.read(CRAWL_SUMMARY_FILE)
    }

    /// Loads a previously persisted corpus
    pub fn load_corpus(&self) -> OutputResult<ProcessedCorpus> {
        self.read(PROCESSED_DATA_FILE)
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> OutputResult<()> {
        fs::create_dir_all(&self.directory)?;

        let path = self.directory.join(name);
        let tmp = self.directory.join(format!("{}.tmp", name));

        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.write_all(b"\n")?;
        writer
            .into_inner()
            .map_err(|e| OutputError::Write(format!("{}: {}", tmp.display(), e)))?
            .sync_all()?;
        fs::rename(&tmp, &path)?;

        tracing::debug!("Wrote {}", path.display());
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> OutputResult<T> {
        let path = self.directory.join(name);
        let file = File::open(&path)?;
        let value = serde_json::from_reader(BufReader::new(file))?;
        tracing::debug!("Loaded {}", path.display());
        Ok(value)
    }
}

impl OutputHandler for JsonOutput {
    fn write_records(&self, records: &ValidatedRecordSet) -> OutputResult<()> {
        self.write(DOCUMENTATION_ITEMS_FILE, &records.documentation_items)?;
        self.write(CODE_EXAMPLES_FILE, &records.code_examples)?;
        self.write(LINKS_FILE, &records.links)?;

        tracing::info!(
            "Saved {} documentation items, {} code examples and {} links to {}",
            records.documentation_items.len(),
            records.code_examples.len(),
            records.links.len(),
            self.directory.display()
        );
        Ok(())
    }

    fn write_summary(&self, summary: &CrawlSummary) -> OutputResult<()> {
        self.write(CRAWL_SUMMARY_FILE, summary)
    }

    fn write_corpus(&self, corpus: &ProcessedCorpus) -> OutputResult<()> {
        self.write(PROCESSED_DATA_FILE, corpus)
    }

    fn load_records(&self) -> OutputResult<ValidatedRecordSet> {
        Ok(ValidatedRecordSet {
            documentation_items: self.read(DOCUMENTATION_ITEMS_FILE)?,
            code_examples: self.read(CODE_EXAMPLES_FILE)?,
            links: self.read(LINKS_FILE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::aggregate_at;
    use crate::records::{CodeExample, DocumentationItem, LinkRecord};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn records() -> ValidatedRecordSet {
        let content = "Use the wallet provider to request the user's address before payment.";
        ValidatedRecordSet {
            documentation_items: vec![DocumentationItem {
                url: "https://docs.example.com/wallet".to_string(),
                title: "Wallet".to_string(),
                last_updated: Some("2024-04-30".to_string()),
                page_type: "general".to_string(),
                language: "en".to_string(),
                section: "Wallet Integration".to_string(),
                headings: vec![],
                content: content.to_string(),
                code_blocks: vec![],
                links: vec![],
                tags: ["wallet".to_string(), "payment".to_string()].into_iter().collect(),
                content_length: content.chars().count(),
                has_code: false,
                is_complete: true,
            }],
            code_examples: vec![CodeExample {
                language: "typescript".to_string(),
                code: "const provider = sdk.getWalletProvider();".to_string(),
                description: "Get the provider".to_string(),
                context: "https://docs.example.com/wallet".to_string(),
                url: "https://docs.example.com/wallet".to_string(),
            }],
            links: vec![LinkRecord {
                url: "https://docs.example.com/payment".to_string(),
                text: "Payments".to_string(),
                is_internal: true,
                is_broken: false,
                context: "https://docs.example.com/wallet".to_string(),
            }],
        }
    }

    #[test]
    fn test_records_reload() {
        let dir = TempDir::new().unwrap();
        let output = JsonOutput::new(dir.path().join("out"));
        let records = records();

        output.write_records(&records).unwrap();

        assert!(dir.path().join("out").join(DOCUMENTATION_ITEMS_FILE).exists());
        assert!(!dir.path().join("out").join("links.json.tmp").exists());
        assert_eq!(output.load_records().unwrap(), records);
    }

    #[test]
    fn test_corpus_recomputed_from_persisted_items() {
        let dir = TempDir::new().unwrap();
        let output = JsonOutput::new(dir.path());
        let at = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();

        let corpus = aggregate_at(&records(), at);
        output.write_records(&records()).unwrap();
        output.write_corpus(&corpus).unwrap();

        let recomputed = aggregate_at(&output.load_records().unwrap(), at);
        assert_eq!(recomputed, output.load_corpus().unwrap());
    }

    #[test]
    fn test_summary_reload() {
        let dir = TempDir::new().unwrap();
        let output = JsonOutput::new(dir.path());
        let mut summary = CrawlSummary::from_records(&records());
        summary.duration_seconds = 12.345;
        summary.config_hash = "abc".to_string();

        output.write_summary(&summary).unwrap();
        assert_eq!(output.load_summary().unwrap(), summary);
    }

    #[test]
    fn test_missing_collection_is_an_error() {
        let dir = TempDir::new().unwrap();
        let output = JsonOutput::new(dir.path());
        assert!(output.load_records().is_err());
    }
}
