//! DOM queries used by the page extractor
//!
//! Each function reads one kind of information out of a parsed document.
//! Malformed markup never fails; a missing element simply yields nothing.

use crate::records::{CodeBlock, CodeKind, Heading};
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use url::Url;

pub const TITLE_SELECTORS: &[&str] = &[
    "h1",
    "title",
    ".page-title",
    ".article-title",
    "[data-testid=\"page-title\"]",
];

pub const LAST_UPDATED_SELECTORS: &[&str] = &[
    ".last-updated",
    ".updated",
    "[data-testid=\"last-updated\"]",
    "time",
];

/// Paragraph containers, most specific first
const CONTENT_SELECTORS: &[&str] = &[
    ".article__body p",
    ".content p",
    ".documentation p",
    "main p",
    "article p",
    "p",
];

/// Longest text accepted as a caption for a code sample
const MAX_DESCRIPTION_CHARS: usize = 200;

/// A `pre` block together with the caption found right before it
#[derive(Debug, Clone)]
pub struct FencedBlock {
    pub block: CodeBlock,
    pub description: Option<String>,
}

/// Text of an element with whitespace runs collapsed
pub fn element_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First non-empty text among the selectors, tried in order
pub fn first_text(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        document
            .select(&selector)
            .map(|el| element_text(&el))
            .find(|text| !text.is_empty())
    })
}

/// Every non-empty `h1`-`h6`, in document order
pub fn headings(document: &Html) -> Vec<Heading> {
    let Ok(selector) = Selector::parse("h1, h2, h3, h4, h5, h6") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let level = el.value().name().get(1..)?.parse::<u8>().ok()?;
            let text = element_text(&el);
            (!text.is_empty()).then_some(Heading { level, text })
        })
        .collect()
}

/// Paragraph text joined by single spaces, each paragraph kept once
pub fn paragraphs(document: &Html) -> String {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();

    for css in CONTENT_SELECTORS {
        if let Ok(selector) = Selector::parse(css) {
            for element in document.select(&selector) {
                let text = element_text(&element);
                if !text.is_empty() && seen.insert(text.clone()) {
                    parts.push(text);
                }
            }
        }
    }

    parts.join(" ")
}

/// The `lang` attribute of the root `html` element
pub fn declared_language(document: &Html) -> Option<String> {
    document
        .root_element()
        .value()
        .attr("lang")
        .map(|lang| lang.trim().to_string())
}

/// All text of the document, for topic and script detection
pub fn page_text(document: &Html) -> String {
    element_text(&document.root_element())
}

/// Comma-separated values of `<meta name="keywords">`
pub fn meta_keywords(document: &Html) -> Vec<String> {
    let Ok(selector) = Selector::parse("meta[name=\"keywords\"][content]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .flat_map(|content| content.split(','))
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

/// True when the page declares a non-empty `<meta name="description">`
pub fn has_meta_description(document: &Html) -> bool {
    let Ok(selector) = Selector::parse("meta[name=\"description\"][content]") else {
        return false;
    };

    document
        .select(&selector)
        .filter_map(|el| el.value().attr("content"))
        .any(|content| !content.trim().is_empty())
}

/// Every non-empty `pre` block, with the code inside its `code` child when present
pub fn fenced_blocks(document: &Html) -> Vec<FencedBlock> {
    let (Ok(pre_selector), Ok(code_selector)) = (Selector::parse("pre"), Selector::parse("code"))
    else {
        return Vec::new();
    };

    let mut blocks = Vec::new();
    for pre in document.select(&pre_selector) {
        // Nested pre elements are covered by their outermost ancestor
        if has_ancestor(&pre, "pre") {
            continue;
        }

        let source = pre.select(&code_selector).next().unwrap_or(pre);
        let code = source.text().collect::<String>().trim().to_string();
        if code.is_empty() {
            continue;
        }

        let language = class_language(&source)
            .or_else(|| class_language(&pre))
            .unwrap_or_else(|| "text".to_string());

        blocks.push(FencedBlock {
            block: CodeBlock {
                language,
                code,
                kind: CodeKind::Fenced,
            },
            description: preceding_caption(&pre),
        });
    }

    blocks
}

/// `code` elements outside any `pre` that are longer than `min_chars`
pub fn inline_blocks(document: &Html, min_chars: usize) -> Vec<CodeBlock> {
    let Ok(selector) = Selector::parse("code") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter(|el| !has_ancestor(el, "pre"))
        .filter_map(|el| {
            let code = el.text().collect::<String>().trim().to_string();
            (code.chars().count() > min_chars).then(|| CodeBlock {
                language: class_language(&el).unwrap_or_else(|| "text".to_string()),
                code,
                kind: CodeKind::Inline,
            })
        })
        .collect()
}

/// Anchors with both an href and visible text, resolved against `page_url`
pub fn anchors(document: &Html, page_url: &Url) -> Vec<(Url, String)> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let href = el.value().attr("href")?.trim();
            let text = element_text(&el);
            if href.is_empty() || text.is_empty() {
                return None;
            }
            page_url.join(href).ok().map(|url| (url, text))
        })
        .collect()
}

/// Links worth following: anchors (except downloads) and canonical links
///
/// **Excluded:** `javascript:`, `mailto:`, `tel:` and `data:` hrefs,
/// fragment-only anchors, and anything not http(s) after resolution.
/// `rel="nofollow"` links are followed.
pub fn follow_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }
            if let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(url);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(url);
            }
        }
    }

    links
}

/// Title derived from the last path segment: `getting-started` becomes `Getting Started`
pub fn title_from_path(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or("");

    segment
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty()
        || href.starts_with('#')
        || ["javascript:", "mailto:", "tel:", "data:"]
            .iter()
            .any(|scheme| href.starts_with(scheme))
    {
        return None;
    }

    let absolute = base_url.join(href).ok()?;
    matches!(absolute.scheme(), "http" | "https").then(|| absolute.to_string())
}

fn has_ancestor(element: &ElementRef, name: &str) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| ancestor.value().name() == name)
}

/// `language-rust` / `lang-rust` give `rust`; otherwise the first class is used
fn class_language(element: &ElementRef) -> Option<String> {
    let classes: Vec<&str> = element.value().attr("class")?.split_whitespace().collect();

    classes
        .iter()
        .find_map(|class| {
            class
                .strip_prefix("language-")
                .or_else(|| class.strip_prefix("lang-"))
        })
        .or_else(|| classes.first().copied())
        .filter(|language| !language.is_empty())
        .map(str::to_string)
}

/// Text of the nearest of the two preceding element siblings that is a
/// paragraph or heading with a short enough text
fn preceding_caption(block: &ElementRef) -> Option<String> {
    block
        .prev_siblings()
        .filter_map(ElementRef::wrap)
        .take(2)
        .filter(|sibling| {
            matches!(
                sibling.value().name(),
                "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            )
        })
        .map(|sibling| element_text(&sibling))
        .find(|text| !text.is_empty() && text.chars().count() < MAX_DESCRIPTION_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn base_url() -> Url {
        Url::parse("https://docs.example.com/guide/page").unwrap()
    }

    #[test]
    fn test_first_text_respects_selector_order() {
        let html = doc("<html><head><title>Head Title</title></head><body><h1>  </h1><h1>Main  Heading</h1></body></html>");
        assert_eq!(
            first_text(&html, TITLE_SELECTORS),
            Some("Main Heading".to_string())
        );

        let html = doc("<html><head><title>Head Title</title></head><body></body></html>");
        assert_eq!(first_text(&html, TITLE_SELECTORS), Some("Head Title".to_string()));

        let html = doc("<html><body><p>nothing</p></body></html>");
        assert_eq!(first_text(&html, TITLE_SELECTORS), None);
    }

    #[test]
    fn test_headings_in_document_order() {
        let html = doc("<body><h2>B</h2><h1>A</h1><h3> </h3><h6>F</h6></body>");
        let found = headings(&html);
        assert_eq!(
            found,
            vec![
                Heading { level: 2, text: "B".into() },
                Heading { level: 1, text: "A".into() },
                Heading { level: 6, text: "F".into() },
            ]
        );
    }

    #[test]
    fn test_paragraphs_deduplicated_by_first_occurrence() {
        let html = doc(
            "<body><main><p>Second</p></main><div class='content'><p>First</p></div><p>Third</p><p> </p></body>",
        );
        // `.content p` is consulted before `main p`
        assert_eq!(paragraphs(&html), "First Second Third");
    }

    #[test]
    fn test_meta_keywords() {
        let html = doc(r#"<head><meta name="keywords" content="sdk, wallet ,, Payments"></head>"#);
        assert_eq!(meta_keywords(&html), vec!["sdk", "wallet", "Payments"]);
    }

    #[test]
    fn test_fenced_blocks_language_and_caption() {
        let html = doc(
            r#"<body>
            <h2>Install</h2>
            <p>Add the SDK to your project:</p>
            <pre><code class="hljs language-bash">npm install @example/sdk
</code></pre>
            <pre class="lang-json">{"a": 1}</pre>
            <pre><code>   </code></pre>
            </body>"#,
        );
        let blocks = fenced_blocks(&html);
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].block.language, "bash");
        assert_eq!(blocks[0].block.code, "npm install @example/sdk");
        assert_eq!(blocks[0].block.kind, CodeKind::Fenced);
        assert_eq!(
            blocks[0].description.as_deref(),
            Some("Add the SDK to your project:")
        );

        assert_eq!(blocks[1].block.language, "json");
        // Nearest sibling is the first pre, the second one is the caption
        assert_eq!(
            blocks[1].description.as_deref(),
            Some("Add the SDK to your project:")
        );
    }

    #[test]
    fn test_caption_limited_to_two_siblings() {
        let html = doc("<body><p>Too far</p><div>a</div><div>b</div><pre>code here</pre></body>");
        let blocks = fenced_blocks(&html);
        assert_eq!(blocks[0].description, None);
        assert_eq!(blocks[0].block.language, "text");
    }

    #[test]
    fn test_long_caption_ignored() {
        let html = doc(&format!("<body><p>{}</p><pre>code</pre></body>", "x".repeat(200)));
        assert_eq!(fenced_blocks(&html)[0].description, None);
    }

    #[test]
    fn test_inline_blocks() {
        let html = doc(
            "<body><p>Use <code>init()</code> or <code class='js'>sdk.connectWallet()</code></p><pre><code>inside pre block</code></pre></body>",
        );
        let blocks = inline_blocks(&html, 10);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].code, "sdk.connectWallet()");
        assert_eq!(blocks[0].language, "js");
        assert_eq!(blocks[0].kind, CodeKind::Inline);
    }

    #[test]
    fn test_anchors_require_text() {
        let html = doc(
            r#"<body><a href="../other">Other page</a><a href="/img"><img src="x.png"></a><a href="mailto:a@b.c">Mail</a></body>"#,
        );
        let found = anchors(&html, &base_url());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].0.as_str(), "https://docs.example.com/other");
        assert_eq!(found[0].1, "Other page");
        assert_eq!(found[1].0.scheme(), "mailto");
    }

    #[test]
    fn test_follow_links_filters() {
        let html = doc(
            r##"<html><head><link rel="canonical" href="https://docs.example.com/canonical"></head><body>
            <a href="next">Next</a>
            <a href="/file.pdf" download>Download</a>
            <a href="#section">Jump</a>
            <a href="javascript:void(0)">JS</a>
            <a href="tel:+123">Call</a>
            <a href="ftp://files.example.com/x">FTP</a>
            <a href="/nofollow" rel="nofollow">Nofollow</a>
            </body></html>"##,
        );
        let links = follow_links(&html, &base_url());
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/guide/next",
                "https://docs.example.com/nofollow",
                "https://docs.example.com/canonical",
            ]
        );
    }

    #[test]
    fn test_title_from_path() {
        let url = Url::parse("https://docs.example.com/mini-dapp/getting_started-GUIDE/").unwrap();
        assert_eq!(title_from_path(&url), "Getting Started Guide");

        let root = Url::parse("https://docs.example.com/").unwrap();
        assert_eq!(title_from_path(&root), "");
    }

    #[test]
    fn test_declared_language() {
        assert_eq!(
            declared_language(&doc("<html lang='ja'><body></body></html>")),
            Some("ja".to_string())
        );
        assert_eq!(declared_language(&doc("<html><body></body></html>")), None);
    }
}
