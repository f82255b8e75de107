//! JSON report generation
//!
//! The report carries the original keywords and search type alongside the
//! results and a timestamp. Keys are written in a fixed order:
//! `keywords`, `timestamp`, `search_type`, `results`.

use crate::config::{SearchKind, SearchRequest};
use crate::crawler::SearchResult;
use crate::CrawlerError;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// The document written at the end of a run
#[derive(Debug, Clone, Serialize)]
pub struct SearchReport {
    pub keywords: Vec<String>,
    pub timestamp: DateTime<Utc>,
    pub search_type: SearchKind,
    pub results: Vec<SearchResult>,
}

impl SearchReport {
    /// Creates a report stamped with the current time
    pub fn new(request: &SearchRequest, results: Vec<SearchResult>) -> Self {
        Self::with_timestamp(request, results, Utc::now())
    }

    pub fn with_timestamp(
        request: &SearchRequest,
        results: Vec<SearchResult>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            keywords: request.keywords().to_vec(),
            timestamp,
            search_type: request.kind(),
            results,
        }
    }
}

/// Formats a report as pretty-printed JSON
pub fn format_json_report(report: &SearchReport) -> Result<String, CrawlerError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Writes a report to disk, creating missing parent directories
///
/// # Arguments
///
/// * `report` - The report to write
/// * `output_path` - Path where the JSON file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote the report
/// * `Err(CrawlerError)` - Failed to serialize or write the report
pub fn write_json_report(report: &SearchReport, output_path: &Path) -> Result<(), CrawlerError> {
    let json = format_json_report(report)?;

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;

    Ok(())
}
