use crate::config::OriginPolicy;
use url::Url;

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - empty hrefs and fragment-only links (same page anchors)
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// Path-relative (`page`), root-relative (`/page`) and protocol-relative
/// (`//host/page`) hrefs are resolved against `base_url`. The fragment of the
/// resolved URL is dropped.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lowered = href.to_ascii_lowercase();
    if lowered.starts_with("javascript:")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("tel:")
        || lowered.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);

    Some(absolute_url)
}

/// Decides whether a discovered link stays within a job's origin
///
/// Under [`OriginPolicy::Prefix`] the link qualifies when its absolute form
/// textually starts with `starting_url`. This is deliberately loose: with a
/// starting URL of `http://example.com`, a link to `http://example.com.evil.net/`
/// also qualifies. [`OriginPolicy::Strict`] additionally requires the scheme,
/// host and port of both URLs to be equal.
///
/// # Examples
///
/// ```
/// use crawl_worker::config::OriginPolicy;
/// use crawl_worker::url::is_same_origin;
/// use url::Url;
///
/// let link = Url::parse("http://example.com/about").unwrap();
/// assert!(is_same_origin(&link, "http://example.com/", OriginPolicy::Prefix));
///
/// let external = Url::parse("http://other.com/x").unwrap();
/// assert!(!is_same_origin(&external, "http://example.com/", OriginPolicy::Prefix));
/// ```
pub fn is_same_origin(link: &Url, starting_url: &str, policy: OriginPolicy) -> bool {
    if !link.as_str().starts_with(starting_url) {
        return false;
    }

    match policy {
        OriginPolicy::Prefix => true,
        OriginPolicy::Strict => match Url::parse(starting_url) {
            Ok(start) => {
                start.scheme() == link.scheme()
                    && start.host_str() == link.host_str()
                    && start.port_or_known_default() == link.port_or_known_default()
            }
            Err(_) => false,
        },
    }
}
