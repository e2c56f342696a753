//! URL handling module for Docs-Harvester
//!
//! This module provides URL normalization, domain extraction, wildcard domain
//! matching, and the path filter deciding which URLs belong to the crawl.

mod domain;
mod normalize;

use crate::config::CrawlerConfig;
use crate::ConfigError;
use regex::Regex;
use url::Url;

pub use domain::{domain_allowed, extract_domain, matches_wildcard, robots_url};
pub use normalize::{normalize_parsed, normalize_url};

/// Result of checking a URL against the crawl scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDecision {
    /// The URL may be crawled; `dont_retry` marks it for a single attempt
    InScope { dont_retry: bool },
    /// The host is not covered by any allowed domain pattern
    DomainNotAllowed,
    /// A deny pattern matched
    Denied,
    /// Allow patterns exist and none matched
    NotAllowed,
}

/// Decides whether URLs fall inside the configured crawl scope
///
/// Domain patterns are matched against the host. Allow, deny and dont-retry
/// patterns are regular expressions searched in the path, including the
/// query when present. Deny always wins over allow; an empty allow list
/// admits every path.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    allowed_domains: Vec<String>,
    allow: Vec<Regex>,
    deny: Vec<Regex>,
    dont_retry: Vec<Regex>,
}

impl UrlFilter {
    /// Compiles the filter from crawler configuration
    pub fn new(config: &CrawlerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            allowed_domains: config
                .allowed_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
            allow: compile_patterns(&config.allow)?,
            deny: compile_patterns(&config.deny)?,
            dont_retry: compile_patterns(&config.dont_retry)?,
        })
    }

    /// Checks a (normalized) URL against domain and path rules
    pub fn check(&self, url: &Url) -> ScopeDecision {
        self.decide(url, true)
    }

    /// Checks a seed URL: allow patterns do not apply, domain and deny still do
    pub fn check_seed(&self, url: &Url) -> ScopeDecision {
        self.decide(url, false)
    }

    fn decide(&self, url: &Url, apply_allow: bool) -> ScopeDecision {
        if !self.is_internal(url) {
            return ScopeDecision::DomainNotAllowed;
        }

        let targets = match_targets(url);

        if matches_any(&self.deny, &targets) {
            return ScopeDecision::Denied;
        }

        if apply_allow && !self.allow.is_empty() && !matches_any(&self.allow, &targets) {
            return ScopeDecision::NotAllowed;
        }

        ScopeDecision::InScope {
            dont_retry: matches_any(&self.dont_retry, &targets),
        }
    }

    /// Returns true if the URL's host is covered by an allowed domain pattern
    pub fn is_internal(&self, url: &Url) -> bool {
        extract_domain(url)
            .map(|domain| domain_allowed(&self.allowed_domains, &domain))
            .unwrap_or(false)
    }
}

fn compile_patterns(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| {
                ConfigError::InvalidPattern(format!("Invalid path pattern '{}': {}", p, e))
            })
        })
        .collect()
}

/// Path (plus query) as normalized, and the same path with a trailing `/`
///
/// Normalization strips the trailing slash, so `/api/` arrives as `/api`;
/// the slashed form lets directory patterns like `/api/` match it.
fn match_targets(url: &Url) -> Vec<String> {
    let path = url.path();
    let with_query = |path: &str| match url.query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.to_string(),
    };

    let mut targets = vec![with_query(path)];
    if !path.ends_with('/') {
        targets.push(with_query(&format!("{}/", path)));
    }
    targets
}

fn matches_any(patterns: &[Regex], targets: &[String]) -> bool {
    patterns
        .iter()
        .any(|re| targets.iter().any(|target| re.is_match(target)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;

    fn filter(allow: &[&str], deny: &[&str], dont_retry: &[&str]) -> UrlFilter {
        let quote = |items: &[&str]| {
            items
                .iter()
                .map(|p| format!("'{}'", p))
                .collect::<Vec<_>>()
                .join(", ")
        };
        let toml = format!(
            r#"
[crawler]
seeds = ["https://docs.example.com/"]
allowed-domains = ["docs.example.com", "*.kaia.io"]
allow = [{}]
deny = [{}]
dont-retry = [{}]

[user-agent]
crawler-name = "HarvestBot"
crawler-version = "1.0"
contact-url = "https://docs.example.com/bot"
contact-email = "bot@docs.example.com"

[output]
directory = "out"
reports-directory = "out/structured"
"#,
            quote(allow),
            quote(deny),
            quote(dont_retry)
        );
        UrlFilter::new(&parse_config(&toml).unwrap().crawler).unwrap()
    }

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_empty_allow_admits_everything_in_domain() {
        let f = filter(&[], &[], &[]);
        assert_eq!(
            f.check(&url("https://docs.example.com/anything")),
            ScopeDecision::InScope { dont_retry: false }
        );
        assert_eq!(
            f.check(&url("https://wave.kaia.io/")),
            ScopeDecision::InScope { dont_retry: false }
        );
    }

    #[test]
    fn test_foreign_domain_rejected() {
        let f = filter(&[], &[], &[]);
        assert_eq!(
            f.check(&url("https://github.com/docs/")),
            ScopeDecision::DomainNotAllowed
        );
        assert!(!f.is_internal(&url("https://github.com/")));
        assert!(f.is_internal(&url("https://docs.example.com/x")));
    }

    #[test]
    fn test_deny_takes_precedence_over_allow() {
        let f = filter(&["/docs/"], &["/docs/private/"], &[]);
        assert_eq!(
            f.check(&url("https://docs.example.com/docs/guide")),
            ScopeDecision::InScope { dont_retry: false }
        );
        assert_eq!(
            f.check(&url("https://docs.example.com/docs/private/keys")),
            ScopeDecision::Denied
        );
        assert_eq!(
            f.check(&url("https://docs.example.com/blog/post")),
            ScopeDecision::NotAllowed
        );
    }

    #[test]
    fn test_deny_matches_extension_and_query() {
        let f = filter(&[], &[r"\.(pdf|zip)$", r"print=1"], &[]);
        assert_eq!(
            f.check(&url("https://docs.example.com/files/guide.pdf")),
            ScopeDecision::Denied
        );
        assert_eq!(
            f.check(&url("https://docs.example.com/page?print=1")),
            ScopeDecision::Denied
        );
    }

    #[test]
    fn test_directory_patterns_match_landing_pages() {
        let f = filter(&["/mini-dapp/"], &["/api/", "/admin/"], &[]);
        let landing = normalize_url("https://docs.example.com/api/").unwrap();
        assert_eq!(landing.path(), "/api");
        assert_eq!(f.check(&landing), ScopeDecision::Denied);
        assert_eq!(
            f.check(&url("https://docs.example.com/admin")),
            ScopeDecision::Denied
        );
        assert_eq!(
            f.check(&normalize_url("https://docs.example.com/mini-dapp/").unwrap()),
            ScopeDecision::InScope { dont_retry: false }
        );
        assert_eq!(
            f.check(&url("https://docs.example.com/mini-dapps")),
            ScopeDecision::NotAllowed
        );
    }

    #[test]
    fn test_extension_pattern_unaffected_by_slash_form() {
        let f = filter(&[], &[r"\.pdf$"], &[]);
        assert_eq!(
            f.check(&url("https://docs.example.com/guide.pdf")),
            ScopeDecision::Denied
        );
        assert_eq!(
            f.check(&url("https://docs.example.com/guide")),
            ScopeDecision::InScope { dont_retry: false }
        );
    }

    #[test]
    fn test_seed_skips_allow_but_not_deny() {
        let f = filter(&["/mini-dapp/"], &["/admin/"], &[]);
        let root = url("https://docs.example.com/");
        assert_eq!(f.check(&root), ScopeDecision::NotAllowed);
        assert_eq!(
            f.check_seed(&root),
            ScopeDecision::InScope { dont_retry: false }
        );
        assert_eq!(
            f.check_seed(&url("https://docs.example.com/admin")),
            ScopeDecision::Denied
        );
        assert_eq!(
            f.check_seed(&url("https://github.com/")),
            ScopeDecision::DomainNotAllowed
        );
    }

    #[test]
    fn test_dont_retry_flag() {
        let f = filter(&[], &[], &["/flaky/"]);
        assert_eq!(
            f.check(&url("https://docs.example.com/flaky/page")),
            ScopeDecision::InScope { dont_retry: true }
        );
    }
}
