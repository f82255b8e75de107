//! Input configuration for the crawler
//!
//! This module handles loading, parsing, and validating the JSON input
//! document and turning it into an immutable [`SearchRequest`].
//!
//! # Example
//!
//! ```no_run
//! use github_crawler::config::load_request;
//! use std::path::Path;
//!
//! let request = load_request(Path::new("input.json"), false).unwrap();
//! println!("Searching {} for: {}", request.kind(), request.query());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{InputConfig, SearchKind, SearchRequest};

// Re-export parser functions
pub use parser::{load_input, load_request, parse_input};
pub use validation::validate_proxy_entry;
