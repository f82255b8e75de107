use crate::config::types::{InputConfig, SearchRequest};
use crate::config::validation::{validate, validate_document};
use crate::ConfigError;
use std::path::Path;

/// Loads and validates an input document from the given path
///
/// # Arguments
///
/// * `path` - Path to the JSON input file
///
/// # Returns
///
/// * `Ok(InputConfig)` - Successfully loaded and validated input
/// * `Err(ConfigError)` - Failed to read, parse, or validate the input
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use github_crawler::config::load_input;
///
/// let input = load_input(Path::new("input.json")).unwrap();
/// println!("Keywords: {:?}", input.keywords);
/// ```
pub fn load_input(path: &Path) -> Result<InputConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_input(&content)
}

/// Parses and validates an input document from a JSON string
pub fn parse_input(content: &str) -> Result<InputConfig, ConfigError> {
    // Shape checks run on the raw value so missing fields are reported by name
    let document: serde_json::Value = serde_json::from_str(content)?;
    validate_document(&document)?;

    let input: InputConfig = serde_json::from_value(document)?;
    validate(&input)?;

    Ok(input)
}

/// Loads an input document and turns it into a [`SearchRequest`]
///
/// `force_enrichment` mirrors the `--extra-info` command-line flag: when set,
/// enrichment is requested even if the document leaves it off.
pub fn load_request(path: &Path, force_enrichment: bool) -> Result<SearchRequest, ConfigError> {
    let input = load_input(path)?;
    let request = SearchRequest::from_input(&input)?;

    Ok(if force_enrichment {
        request.with_enrichment()
    } else {
        request
    })
}
