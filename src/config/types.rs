use serde::Deserialize;

/// Main configuration structure for Docs-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub politeness: PolitenessConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

/// Crawl scope and resource limits
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// URLs the crawl starts from (depth 0)
    pub seeds: Vec<String>,

    /// Domain patterns (e.g., "docs.example.com" or "*.example.com") that may be fetched
    pub allowed_domains: Vec<String>,

    /// Path patterns of which at least one must match; empty allows every path
    #[serde(default)]
    pub allow: Vec<String>,

    /// Path patterns that exclude a URL even if an allow pattern matches
    #[serde(default)]
    pub deny: Vec<String>,

    /// Path patterns whose tasks are attempted exactly once
    #[serde(default)]
    pub dont_retry: Vec<String>,

    /// Maximum depth to crawl from seed URLs
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Responses with a larger body are skipped before extraction
    #[serde(default = "default_max_page_bytes")]
    pub max_page_bytes: u64,

    /// Per-attempt request timeout (seconds)
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Maximum number of concurrent page fetches across all domains
    #[serde(default = "default_max_concurrent_pages_open")]
    pub max_concurrent_pages_open: u32,

    /// Maximum number of requests in flight to a single domain
    #[serde(default = "default_max_concurrent_per_domain")]
    pub max_concurrent_per_domain: u32,

    /// Whether robots.txt rules are honored
    #[serde(default = "default_true")]
    pub obey_robots: bool,
}

/// Request pacing between requests to the same domain
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolitenessConfig {
    /// Base delay between two requests to one domain (milliseconds)
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Upper bound of the random delay added on top of `delay_ms` (milliseconds)
    #[serde(default = "default_jitter_ms")]
    pub jitter_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            jitter_ms: default_jitter_ms(),
        }
    }
}

/// Retry behavior for transient fetch failures
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Number of retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff before the first retry; doubled for each further retry (milliseconds)
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Cap on a single backoff (milliseconds)
    #[serde(default = "default_max_backoff_ms")]
    pub max_backoff_ms: u64,

    /// HTTP status codes treated as transient
    #[serde(default = "default_retryable_status")]
    pub retryable_status: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            max_backoff_ms: default_max_backoff_ms(),
            retryable_status: default_retryable_status(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,

    /// Identities drawn from at random for each request; empty means the
    /// identifying agent built from the fields above
    #[serde(default)]
    pub rotate: Vec<String>,
}

impl UserAgentConfig {
    /// Formats the identifying agent: `Name/Version (+ContactURL; ContactEmail)`
    pub fn identifying_agent(&self) -> String {
        format!(
            "{}/{} (+{}; {})",
            self.crawler_name, self.crawler_version, self.contact_url, self.contact_email
        )
    }
}

/// A `(path substring -> label)` classification rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathRule {
    pub pattern: String,
    pub label: String,
}

impl PathRule {
    pub fn new(pattern: &str, label: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            label: label.to_string(),
        }
    }
}

/// Tags of which a page of `page_type` must carry at least one to be complete
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CompletenessRule {
    pub page_type: String,
    pub required_tags: Vec<String>,
}

/// Thresholds and rule tables used by the page extractor and the cleaner
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ExtractionConfig {
    /// Documentation items with less cleaned content are dropped
    #[serde(default = "default_min_content_length")]
    pub min_content_length: usize,

    /// Pages with less content are never flagged complete
    #[serde(default = "default_complete_min_content_length")]
    pub complete_min_content_length: usize,

    /// Inline code must be longer than this to be kept
    #[serde(default = "default_inline_code_min_length")]
    pub inline_code_min_length: usize,

    /// Fenced blocks longer than this are also emitted as code examples
    #[serde(default = "default_substantial_code_length")]
    pub substantial_code_length: usize,

    /// Topic vocabulary searched in page text
    #[serde(default = "default_topics")]
    pub topics: Vec<String>,

    /// Ordered page-type table, first match wins
    #[serde(default = "default_page_types")]
    pub page_types: Vec<PathRule>,

    /// Ordered section table, first match wins
    #[serde(default = "default_sections")]
    pub sections: Vec<PathRule>,

    /// Per-page-type completeness requirements
    #[serde(default = "default_completeness")]
    pub completeness: Vec<CompletenessRule>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_content_length: default_min_content_length(),
            complete_min_content_length: default_complete_min_content_length(),
            inline_code_min_length: default_inline_code_min_length(),
            substantial_code_length: default_substantial_code_length(),
            topics: default_topics(),
            page_types: default_page_types(),
            sections: default_sections(),
            completeness: default_completeness(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory receiving the JSON collections and the crawl summary
    pub directory: String,

    /// Directory receiving the rendered markdown documents
    #[serde(rename = "reports-directory")]
    pub reports_directory: String,
}

/// Report rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    /// Heading of the index and combined documents
    #[serde(default = "default_report_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_report_title(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_max_depth() -> u32 {
    5
}

fn default_max_page_bytes() -> u64 {
    7 * 1024 * 1024
}

fn default_fetch_timeout_secs() -> u64 {
    120
}

fn default_max_concurrent_pages_open() -> u32 {
    4
}

fn default_max_concurrent_per_domain() -> u32 {
    1
}

fn default_delay_ms() -> u64 {
    3000
}

fn default_jitter_ms() -> u64 {
    500
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_max_backoff_ms() -> u64 {
    30_000
}

fn default_retryable_status() -> Vec<u16> {
    vec![500, 502, 503, 504, 408, 429]
}

fn default_min_content_length() -> usize {
    50
}

fn default_complete_min_content_length() -> usize {
    100
}

fn default_inline_code_min_length() -> usize {
    10
}

fn default_substantial_code_length() -> usize {
    50
}

fn default_topics() -> Vec<String> {
    [
        "mini dapp",
        "dapp portal",
        "kaia",
        "wallet",
        "payment",
        "sdk",
        "api",
        "integration",
        "development",
        "tutorial",
    ]
    .iter()
    .map(|t| t.to_string())
    .collect()
}

fn default_page_types() -> Vec<PathRule> {
    vec![
        PathRule::new("/mini-dapp/", "mini_dapp"),
        PathRule::new("/dapp-portal/", "dapp_portal"),
        PathRule::new("/kaia-wave/", "kaia_wave"),
        PathRule::new("/api/", "api"),
    ]
}

fn default_sections() -> Vec<PathRule> {
    vec![
        PathRule::new("mini-dapp", "Mini Dapp Development"),
        PathRule::new("dapp-portal", "Dapp Portal Features"),
        PathRule::new("kaia-wave", "Kaia Wave Program"),
        PathRule::new("wallet", "Wallet Integration"),
        PathRule::new("payment", "Payment Systems"),
        PathRule::new("design", "Design Guidelines"),
    ]
}

fn default_completeness() -> Vec<CompletenessRule> {
    vec![
        CompletenessRule {
            page_type: "mini_dapp".to_string(),
            required_tags: vec![
                "sdk".to_string(),
                "integration".to_string(),
                "development".to_string(),
            ],
        },
        CompletenessRule {
            page_type: "dapp_portal".to_string(),
            required_tags: vec![
                "wallet".to_string(),
                "payment".to_string(),
                "portal".to_string(),
            ],
        },
    ]
}

fn default_report_title() -> String {
    "Dapp Portal Documentation".to_string()
}
