use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded in the crawl summary so runs can be traced back to
/// the configuration that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const MINIMAL: &str = r#"
[crawler]
seeds = ["https://docs.example.com/"]
allowed-domains = ["docs.example.com"]

[user-agent]
crawler-name = "HarvestBot"
crawler-version = "1.0"
contact-url = "https://docs.example.com/bot"
contact-email = "bot@docs.example.com"

[output]
directory = "./out"
reports-directory = "./out/structured"
"#;

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
seeds = ["https://docs.example.com/"]
allowed-domains = ["docs.example.com"]
allow = ["/docs/"]
deny = ['\.pdf$']
max-depth = 3
max-concurrent-pages-open = 10

[politeness]
delay-ms = 250
jitter-ms = 0

[retry]
max-retries = 2
retryable-status = [503]

[user-agent]
crawler-name = "HarvestBot"
crawler-version = "1.0"
contact-url = "https://docs.example.com/bot"
contact-email = "bot@docs.example.com"
rotate = ["AgentA/1.0", "AgentB/2.0"]

[[extraction.page-types]]
pattern = "/guides/"
label = "guide"

[output]
directory = "./out"
reports-directory = "./out/structured"

[report]
title = "Example Docs"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.max_concurrent_pages_open, 10);
        assert_eq!(config.crawler.allow, vec!["/docs/"]);
        assert_eq!(config.politeness.delay_ms, 250);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.retryable_status, vec![503]);
        assert_eq!(config.user_agent.crawler_name, "HarvestBot");
        assert_eq!(config.user_agent.rotate.len(), 2);
        assert_eq!(config.extraction.page_types.len(), 1);
        assert_eq!(config.extraction.page_types[0].label, "guide");
        // Tables not given keep their defaults
        assert_eq!(config.extraction.sections.len(), 6);
        assert_eq!(config.report.title, "Example Docs");
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(MINIMAL).unwrap();

        assert_eq!(config.crawler.max_depth, 5);
        assert_eq!(config.crawler.max_page_bytes, 7 * 1024 * 1024);
        assert_eq!(config.crawler.max_concurrent_per_domain, 1);
        assert!(config.crawler.obey_robots);
        assert_eq!(config.politeness.delay_ms, 3000);
        assert_eq!(config.politeness.jitter_ms, 500);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(
            config.retry.retryable_status,
            vec![500, 502, 503, 504, 408, 429]
        );
        assert_eq!(config.extraction.min_content_length, 50);
        assert_eq!(config.extraction.topics.len(), 10);
        assert_eq!(config.report.title, "Dapp Portal Documentation");
        assert_eq!(
            config.user_agent.identifying_agent(),
            "HarvestBot/1.0 (+https://docs.example.com/bot; bot@docs.example.com)"
        );
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = MINIMAL.replace(
            "allowed-domains = [\"docs.example.com\"]",
            "allowed-domains = [\"docs.example.com\"]\nmax-concurrent-pages-open = 0",
        );
        let result = parse_config(&content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let content = MINIMAL.replace(
            "allowed-domains = [\"docs.example.com\"]",
            "allowed-domains = [\"docs.example.com\"]\ndeny = [\"(unclosed\"]",
        );
        let result = parse_config(&content);
        assert!(matches!(result, Err(ConfigError::InvalidPattern(_))));
    }

    #[test]
    fn test_seed_outside_allowed_domains_rejected() {
        let content = MINIMAL.replace(
            "seeds = [\"https://docs.example.com/\"]",
            "seeds = [\"https://other.example.org/\"]",
        );
        let result = parse_config(&content);
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        // Same content should produce same hash
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64); // SHA-256 produces 64 hex characters
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_load_config_with_hash() {
        let file = create_temp_config(MINIMAL);
        let (config, hash) = load_config_with_hash(file.path()).unwrap();
        assert_eq!(config.crawler.seeds.len(), 1);
        assert_eq!(hash.len(), 64);
    }
}
