use crate::UrlError;
use url::Url;

/// Query parameters that only carry campaign or referral tracking
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Normalizes a URL into the canonical form used for deduplication
///
/// Two URLs that address the same document normalize to the same value:
///
/// - only `http` and `https` are accepted
/// - the host is lower-cased
/// - dot segments are resolved and repeated slashes collapsed
/// - a trailing slash is removed, except for the root path
/// - the fragment is dropped
/// - tracking parameters (`utm_*`, `fbclid`, `gclid`, `mc_eid`, `ref`,
///   `source`) are removed and the remaining pairs sorted by key
///
/// # Examples
///
/// ```
/// use docs_harvester::url::normalize_url;
///
/// let a = normalize_url("https://Docs.Example.com/guide/#intro").unwrap();
/// let b = normalize_url("https://docs.example.com/guide#setup").unwrap();
/// assert_eq!(a, b);
/// assert_eq!(a.as_str(), "https://docs.example.com/guide");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;
    normalize_parsed(url)
}

/// Normalizes an already parsed URL
pub fn normalize_parsed(mut url: Url) -> Result<Url, UrlError> {
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .map(str::to_lowercase)
        .ok_or(UrlError::MissingDomain)?;
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    if url.query().is_some() {
        let params = retained_query_pairs(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Resolves dot segments, collapses repeated slashes and strips a trailing slash
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Non-tracking query pairs, sorted by key (stable, so repeated keys keep their order)
fn retained_query_pairs(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
