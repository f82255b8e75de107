//! GitHub Crawler main entry point
//!
//! This is the command-line interface for the GitHub search crawler.

use anyhow::Context;
use clap::Parser;
use github_crawler::config::load_request;
use github_crawler::crawler::Crawler;
use github_crawler::output::{format_json_report, write_json_report, SearchReport};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// GitHub Crawler: keyword search with optional repository enrichment
///
/// Reads a JSON input file with keywords, proxies, and a search type, runs
/// one search against GitHub, and writes the results as JSON.
#[derive(Parser, Debug)]
#[command(name = "github-crawler")]
#[command(version = "1.0.0")]
#[command(about = "GitHub search crawler", long_about = None)]
struct Cli {
    /// Path to JSON input file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Path the JSON results are written to
    #[arg(
        long,
        alias = "output_file",
        value_name = "FILE",
        default_value = "data/results.json"
    )]
    output_file: PathBuf,

    /// Fetch owner and language stats for every repository result
    #[arg(long, alias = "extra_info")]
    extra_info: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate input
    tracing::info!("Loading input from: {}", cli.input.display());
    let request = match load_request(&cli.input, cli.extra_info) {
        Ok(request) => {
            tracing::info!(
                "Input loaded: type={}, keywords={:?}, proxies={}, extra info={}",
                request.kind(),
                request.keywords(),
                request.proxies().len(),
                request.enrich()
            );
            request
        }
        Err(e) => {
            tracing::error!("Failed to load input: {}", e);
            return Err(e).context("invalid input file");
        }
    };

    let crawler = Crawler::new(&request)
        .context("failed to build HTTP client")?
        .with_span(tracing::info_span!("search", kind = %request.kind()));
    let results = crawler.execute(&request).await;

    let report = SearchReport::new(&request, results);
    if let Err(e) = write_json_report(&report, &cli.output_file) {
        tracing::error!("Failed to write results: {}", e);
        return Err(e).context("failed to write results");
    }

    tracing::info!(
        "Wrote {} results to {}",
        report.results.len(),
        cli.output_file.display()
    );
    if let Ok(json) = format_json_report(&report) {
        tracing::debug!("Results: {}", json);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("github_crawler=info,warn"),
            1 => EnvFilter::new("github_crawler=debug,info"),
            2 => EnvFilter::new("github_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
