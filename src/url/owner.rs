use url::Url;

/// Derives a repository owner from the repository URL
///
/// The owner is the second-to-last path segment, so `.../owner/repo` gives
/// `owner`. A trailing slash does not count as a segment. This never looks
/// at page content, so it holds for both parsed and degraded results.
///
/// # Returns
///
/// The owner, or an empty string when the URL has fewer than two path
/// segments or cannot be parsed.
///
/// # Examples
///
/// ```
/// use github_crawler::url::owner_from_repo_url;
///
/// assert_eq!(owner_from_repo_url("https://github.com/tokio-rs/tokio"), "tokio-rs");
/// assert_eq!(owner_from_repo_url("not a url"), "");
/// ```
pub fn owner_from_repo_url(repo_url: &str) -> String {
    let Ok(url) = Url::parse(repo_url) else {
        return String::new();
    };

    let segments: Vec<&str> = match url.path_segments() {
        Some(segments) => segments.filter(|s| !s.is_empty()).collect(),
        None => return String::new(),
    };

    if segments.len() < 2 {
        return String::new();
    }

    segments[segments.len() - 2].to_string()
}
