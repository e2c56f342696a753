//! Docs-Harvester main entry point
//!
//! This is the command-line interface for the Docs-Harvester documentation crawler.

use anyhow::{Context, Result};
use clap::Parser;
use docs_harvester::config::{load_config_with_hash, Config};
use docs_harvester::crawler::CrawlSession;
use docs_harvester::output::{
    aggregate, generate_markdown_summary, print_statistics, render, write_documents, JsonOutput,
    OutputHandler, ProcessedCorpus, SUMMARY_DOCUMENT,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Docs-Harvester: a polite documentation-site crawler
///
/// Docs-Harvester crawls a documentation site within a configured scope while
/// respecting robots.txt and per-domain delays, extracts pages, code samples
/// and links, and renders grouped markdown reports from them.
#[derive(Parser, Debug)]
#[command(name = "docs-harvester")]
#[command(version)]
#[command(about = "A polite documentation-site crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with_all = ["crawl_only", "process_only"])]
    dry_run: bool,

    /// Crawl and save the JSON collections without rendering reports
    #[arg(long, conflicts_with_all = ["dry_run", "process_only"])]
    crawl_only: bool,

    /// Aggregate and render reports from previously saved collections
    #[arg(long, conflicts_with_all = ["dry_run", "crawl_only"])]
    process_only: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.process_only {
        handle_process(&config)?;
    } else {
        handle_crawl(config, config_hash, !cli.crawl_only).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("docs_harvester=info,warn"),
            1 => EnvFilter::new("docs_harvester=debug,info"),
            2 => EnvFilter::new("docs_harvester=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Docs-Harvester Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max depth: {}", config.crawler.max_depth);
    println!(
        "  Max concurrent pages: {} ({} per domain)",
        config.crawler.max_concurrent_pages_open, config.crawler.max_concurrent_per_domain
    );
    println!("  Max page size: {} bytes", config.crawler.max_page_bytes);
    println!("  Fetch timeout: {}s", config.crawler.fetch_timeout_secs);
    println!(
        "  Delay: {}ms (+ up to {}ms jitter)",
        config.politeness.delay_ms, config.politeness.jitter_ms
    );
    println!(
        "  Retries: {} (backoff {}ms, max {}ms, statuses {:?})",
        config.retry.max_retries,
        config.retry.backoff_ms,
        config.retry.max_backoff_ms,
        config.retry.retryable_status
    );
    println!("  Obey robots.txt: {}", config.crawler.obey_robots);

    println!("\nUser Agent:");
    println!("  Identity: {}", config.user_agent.identifying_agent());
    if !config.user_agent.rotate.is_empty() {
        println!("  Rotation pool: {} identities", config.user_agent.rotate.len());
    }

    println!("\nScope:");
    println!("  Allowed domains: {}", config.crawler.allowed_domains.join(", "));
    print_patterns("Allow", &config.crawler.allow);
    print_patterns("Deny", &config.crawler.deny);
    print_patterns("Don't retry", &config.crawler.dont_retry);

    println!("\nOutput:");
    println!("  Collections: {}", config.output.directory);
    println!("  Reports: {}", config.output.reports_directory);

    println!("\nSeeds ({}):", config.crawler.seeds.len());
    for seed in &config.crawler.seeds {
        println!("  - {}", seed);
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would start crawling with {} seed URLs",
        config.crawler.seeds.len()
    );
}

fn print_patterns(label: &str, patterns: &[String]) {
    if patterns.is_empty() {
        println!("  {}: (none)", label);
    } else {
        println!("  {}: {}", label, patterns.join("  "));
    }
}

/// Handles the main crawl operation, followed by report generation unless `process` is false
async fn handle_crawl(config: Config, config_hash: String, process: bool) -> Result<()> {
    tracing::info!(
        "Seeds: {}, allowed domains: {}",
        config.crawler.seeds.len(),
        config.crawler.allowed_domains.len()
    );

    let output = JsonOutput::new(&config.output.directory);
    let session = CrawlSession::new(config.clone())
        .context("Failed to initialize crawl")?
        .with_config_hash(config_hash);

    // Ctrl-C stops admission and keeps the partial results
    let cancel = session.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping crawl");
            cancel.cancel();
        }
    });

    let crawl = session.run().await.context("Crawl failed")?;

    output
        .write_records(&crawl.records)
        .context("Failed to save crawled records")?;
    output
        .write_summary(&crawl.summary)
        .context("Failed to save crawl summary")?;
    let summary_path = Path::new(&config.output.directory).join(SUMMARY_DOCUMENT);
    generate_markdown_summary(&crawl.summary, &summary_path)
        .context("Failed to write crawl summary")?;

    if crawl.summary.cancelled {
        tracing::warn!("Crawl was cancelled; saved partial results");
    }

    if process {
        let corpus = aggregate(&crawl.records);
        write_reports(&config, &output, &corpus)?;
    }

    Ok(())
}

/// Handles the --process-only mode: aggregates and renders saved collections
fn handle_process(config: &Config) -> Result<()> {
    let output = JsonOutput::new(&config.output.directory);
    let records = output.load_records().with_context(|| {
        format!(
            "Failed to load saved collections from {}",
            config.output.directory
        )
    })?;
    tracing::info!(
        "Loaded {} documentation items, {} code examples, {} links",
        records.documentation_items.len(),
        records.code_examples.len(),
        records.links.len()
    );

    let corpus = aggregate(&records);
    write_reports(config, &output, &corpus)
}

fn write_reports(config: &Config, output: &JsonOutput, corpus: &ProcessedCorpus) -> Result<()> {
    output
        .write_corpus(corpus)
        .context("Failed to save processed data")?;

    let documents = render(corpus, &config.report.title);
    write_documents(Path::new(&config.output.reports_directory), &documents)
        .context("Failed to write reports")?;

    let sections: BTreeMap<String, usize> = corpus
        .sections
        .iter()
        .map(|(section, items)| (section.clone(), items.len()))
        .collect();
    print_statistics(&corpus.statistics, &sections);

    println!(
        "\n✓ {} reports written to: {}",
        documents.len(),
        config.output.reports_directory
    );
    Ok(())
}
