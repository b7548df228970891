use crate::UrlError;
use url::Url;

/// List of tracking query parameters ignored when deduplicating pages
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
];

/// Parses a URL the crawler is allowed to fetch
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed
/// 2. Require an http or https scheme
/// 3. Require a host
/// 4. Remove the fragment (everything after #)
///
/// Scheme and path are otherwise preserved, so the textual same-origin test
/// still compares against what the job producer submitted.
///
/// # Examples
///
/// ```
/// use crawl_worker::url::normalize_url;
///
/// let url = normalize_url("http://EXAMPLE.com/page#top").unwrap();
/// assert_eq!(url.as_str(), "http://example.com/page");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);

    Ok(url)
}

/// Returns the key a URL is recorded under in a job's visited set
///
/// Two URLs with the same key are the same page for deduplication purposes:
/// fragments and tracking parameters are dropped and the remaining query
/// parameters are sorted.
///
/// # Examples
///
/// ```
/// use crawl_worker::url::visit_key;
/// use url::Url;
///
/// let a = Url::parse("http://example.com/p?b=2&a=1&utm_source=x#s").unwrap();
/// let b = Url::parse("http://example.com/p?a=1&b=2").unwrap();
/// assert_eq!(visit_key(&a), visit_key(&b));
/// ```
pub fn visit_key(url: &Url) -> String {
    let mut url = url.clone();
    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);

        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    url.to_string()
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    params.sort();

    params
}

/// Checks if a query parameter is a tracking parameter
fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}
