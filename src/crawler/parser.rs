//! HTML parser for extracting links and metadata
//!
//! This module handles parsing fetched HTML to extract:
//! - Links to follow (from `<a href>` anchors)
//! - Page metadata: title, meta description, canonical link, first `<h1>`
//!
//! Parsing never fails: html5ever recovers from malformed markup, and anything
//! that cannot be read is simply absent from the result.

use crate::url::resolve_link;
use scraper::{Html, Selector};
use std::collections::BTreeSet;
use url::Url;

/// Metadata fields mapped into each completed page result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMetadata {
    /// Text of the first `<title>`
    pub title: Option<String>,

    /// `content` of `<meta name="description">`
    pub description: Option<String>,

    /// `href` of `<link rel="canonical">`, as written in the page
    pub canonical: Option<String>,

    /// Text of the first `<h1>`
    pub h1: Option<String>,
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// Page metadata
    pub metadata: PageMetadata,

    /// All followable links found on the page (absolute URLs)
    pub links: BTreeSet<Url>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Arguments
///
/// * `html` - The HTML content to parse
/// * `base_url` - The URL the page was served from, for resolving relative links
///
/// # Example
///
/// ```
/// use crawl_worker::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.metadata.title, Some("Test".to_string()));
/// assert_eq!(parsed.links.len(), 1);
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        metadata: metadata_from_document(&document),
        links: links_from_document(&document, base_url),
    }
}

/// Extracts the set of absolute http(s) URLs linked from anchor elements
///
/// # Link Extraction Rules
///
/// **Include:**
/// - every `<a href="...">`, resolved against `base_url`
///
/// **Exclude:**
/// - missing or empty `href`
/// - fragment-only anchors
/// - `javascript:`, `mailto:`, `tel:` links and data URIs
/// - anything that does not resolve to http or https
///
/// The result is ordered and deduplicated, so identical input always yields
/// an identical set.
pub fn extract_links(html: &str, base_url: &Url) -> BTreeSet<Url> {
    let document = Html::parse_document(html);
    links_from_document(&document, base_url)
}

/// Extracts the metadata fields of a page
pub fn extract_metadata(html: &str) -> PageMetadata {
    let document = Html::parse_document(html);
    metadata_from_document(&document)
}

fn links_from_document(document: &Html, base_url: &Url) -> BTreeSet<Url> {
    let mut links = BTreeSet::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if let Some(href) = element.value().attr("href") {
                if let Some(absolute_url) = resolve_link(href, base_url) {
                    links.insert(absolute_url);
                }
            }
        }
    }

    links
}

fn metadata_from_document(document: &Html) -> PageMetadata {
    PageMetadata {
        title: first_text(document, "title"),
        description: first_attr(document, r#"meta[name="description"]"#, "content"),
        canonical: first_attr(document, r#"link[rel="canonical"]"#, "href"),
        h1: first_text(document, "h1"),
    }
}

/// Text content of the first element matching `selector`, whitespace-collapsed
fn first_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .map(|element| {
            element
                .text()
                .flat_map(str::split_whitespace)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|s| !s.is_empty())
}

/// Trimmed attribute value of the first element matching `selector`
fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;

    document
        .select(&selector)
        .next()
        .and_then(|element| element.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|s| !s.is_empty())
}
