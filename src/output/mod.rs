//! Output module for persisting search results
//!
//! This module handles writing the JSON report that records the keywords,
//! search type, timestamp, and results of a run.

mod report;

pub use report::{format_json_report, write_json_report, SearchReport};
