//! URL handling for search results
//!
//! This module resolves result links against the site origin and derives
//! repository owners from repository URLs.

mod owner;
mod resolve;

// Re-export main functions
pub use owner::owner_from_repo_url;
pub use resolve::{resolve_result_url, GITHUB_BASE_URL};
