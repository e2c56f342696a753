use url::Url;

/// Extracts the lower-cased host of a URL, without port
///
/// # Examples
///
/// ```
/// use url::Url;
/// use docs_harvester::url::extract_domain;
///
/// let url = Url::parse("https://Docs.Example.com:8443/guide").unwrap();
/// assert_eq!(extract_domain(&url), Some("docs.example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks a domain against a pattern that is either exact (`docs.example.com`)
/// or a wildcard (`*.example.com`, which also covers the bare `example.com`)
///
/// Both sides are expected to be lower-case already.
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

/// Returns true if `domain` matches any of the allowed domain patterns
pub fn domain_allowed<S: AsRef<str>>(patterns: &[S], domain: &str) -> bool {
    patterns
        .iter()
        .any(|pattern| matches_wildcard(&pattern.as_ref().to_lowercase(), domain))
}

/// Builds the robots.txt location for the origin of `url`, keeping any explicit port
pub fn robots_url(url: &Url) -> Option<Url> {
    let mut robots = url.clone();
    if robots.cannot_be_a_base() || robots.host_str().is_none() {
        return None;
    }
    robots.set_path("/robots.txt");
    robots.set_query(None);
    robots.set_fragment(None);
    Some(robots)
}
