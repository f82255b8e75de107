use url::Url;

/// Site origin that relative result links are resolved against
pub const GITHUB_BASE_URL: &str = "https://github.com";

/// Resolves a result link href to an absolute URL string
///
/// Hrefs that already start with `http` are returned verbatim, matching
/// what the search page links to. Anything else is joined onto `base`.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `base` - The site origin
///
/// # Returns
///
/// * `Some(String)` - The absolute URL
/// * `None` - The href is blank or cannot be joined onto `base`
///
/// # Examples
///
/// ```
/// use url::Url;
/// use github_crawler::url::resolve_result_url;
///
/// let base = Url::parse("https://github.com").unwrap();
/// assert_eq!(
///     resolve_result_url("/rust-lang/rust", &base),
///     Some("https://github.com/rust-lang/rust".to_string())
/// );
/// ```
pub fn resolve_result_url(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() {
        return None;
    }

    if href.starts_with("http") {
        return Some(href.to_string());
    }

    base.join(href).ok().map(|url| url.to_string())
}
