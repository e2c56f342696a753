use crate::config::types::{
    Config, CrawlerConfig, ExtractionConfig, OutputConfig, RetryConfig, UserAgentConfig,
};
use crate::url::{domain_allowed, extract_domain};
use crate::ConfigError;
use regex::Regex;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_retry_config(&config.retry)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_extraction_config(&config.extraction)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl scope and limits
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.allowed_domains.is_empty() {
        return Err(ConfigError::Validation(
            "allowed-domains must list at least one domain".to_string(),
        ));
    }
    for pattern in &config.allowed_domains {
        validate_domain_pattern(pattern)?;
    }

    if config.seeds.is_empty() {
        return Err(ConfigError::Validation(
            "seeds must contain at least one URL".to_string(),
        ));
    }
    for seed in &config.seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }

        let in_scope = extract_domain(&url)
            .map(|domain| domain_allowed(&config.allowed_domains, &domain))
            .unwrap_or(false);
        if !in_scope {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' is outside allowed-domains",
                seed
            )));
        }
    }

    for pattern in config
        .allow
        .iter()
        .chain(&config.deny)
        .chain(&config.dont_retry)
    {
        Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Invalid path pattern '{}': {}", pattern, e))
        })?;
    }

    if config.max_concurrent_pages_open < 1 || config.max_concurrent_pages_open > 100 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-pages-open must be between 1 and 100, got {}",
            config.max_concurrent_pages_open
        )));
    }

    if config.max_concurrent_per_domain < 1 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-per-domain must be >= 1, got {}",
            config.max_concurrent_per_domain
        )));
    }

    if config.max_page_bytes == 0 {
        return Err(ConfigError::Validation(
            "max-page-bytes must be greater than 0".to_string(),
        ));
    }

    if config.fetch_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetch-timeout-secs must be greater than 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if let Some(status) = config
        .retryable_status
        .iter()
        .find(|s| !(100..=599).contains(*s))
    {
        return Err(ConfigError::Validation(format!(
            "retryable-status contains invalid HTTP status {}",
            status
        )));
    }

    if config.max_backoff_ms < config.backoff_ms {
        return Err(ConfigError::Validation(format!(
            "max-backoff-ms ({}) must not be smaller than backoff-ms ({})",
            config.max_backoff_ms, config.backoff_ms
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    if config.rotate.iter().any(|agent| agent.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "rotate must not contain empty user agents".to_string(),
        ));
    }

    Ok(())
}

fn validate_extraction_config(config: &ExtractionConfig) -> Result<(), ConfigError> {
    for rule in config.page_types.iter().chain(&config.sections) {
        if rule.pattern.is_empty() || rule.label.is_empty() {
            return Err(ConfigError::Validation(format!(
                "Classification rules need a pattern and a label, got '{}' -> '{}'",
                rule.pattern, rule.label
            )));
        }
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.reports_directory.is_empty() {
        return Err(ConfigError::Validation(
            "reports-directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a domain pattern (supports wildcards)
fn validate_domain_pattern(pattern: &str) -> Result<(), ConfigError> {
    if pattern.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain pattern cannot be empty".to_string(),
        ));
    }

    validate_domain_string(pattern.strip_prefix("*.").unwrap_or(pattern))
}

/// Validates a domain string (without wildcard prefix)
fn validate_domain_string(domain: &str) -> Result<(), ConfigError> {
    if domain.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Domain cannot be empty".to_string(),
        ));
    }

    if !domain
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' contains invalid characters",
            domain
        )));
    }

    if domain.starts_with('.')
        || domain.ends_with('.')
        || domain.starts_with('-')
        || domain.ends_with('-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot start or end with '.' or '-'",
            domain
        )));
    }

    if domain.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' cannot contain consecutive dots",
            domain
        )));
    }

    // Bare hostnames like "localhost" are not crawl targets
    if !domain.contains('.') {
        return Err(ConfigError::InvalidPattern(format!(
            "Domain '{}' must contain at least one dot (e.g., 'example.com')",
            domain
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid contact-email: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid contact-email: '{}'",
            email
        )));
    }

    Ok(())
}
