//! # Promo Digest
//!
//! Scrapes a retailer's public promotions page, keeps the offers worth a
//! second look and writes a categorized plain-text digest.
//!
//! ## Usage
//!
//! ```sh
//! promo_digest -k kategorijos.txt -o results
//! ```
//!
//! ## Architecture
//!
//! The application is a single sequential pipeline (see [`pipeline`]):
//! 1. **Fetching**: download the page, retrying with a fixed delay
//! 2. **Extraction**: read category sections and offer cards from the markup
//! 3. **Ranking**: keep big discounts and real special labels, biggest first
//! 4. **Output**: write the text report, and optionally a JSON export

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod categories;
mod cli;
mod config;
mod error;
mod extract;
mod fetch;
mod models;
mod outputs;
mod pipeline;
mod rank;
mod report;
mod utils;

use cli::Cli;
use config::Config;
use fetch::{HttpSource, RetryFetch};
use pipeline::RunContext;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("promo_digest starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = Config::load(args.config.as_deref())?;
    config.apply_cli(&args);

    let source = HttpSource::new(&config.user_agent)?;
    let fetcher = RetryFetch::new(source, config.fetch.max_attempts, config.fetch_delay());
    let ctx = RunContext {
        config,
        categories_path: args.categories,
        output_dir: args.output_dir,
        export_json: args.json,
    };

    match pipeline::run(&ctx, &fetcher).await {
        Ok(summary) => {
            let elapsed = start_time.elapsed();
            info!(
                report = %summary.report_path.display(),
                json = ?summary.json_path,
                total = summary.total_offers,
                notable = summary.notable_offers,
                secs = elapsed.as_secs(),
                millis = elapsed.subsec_millis(),
                "Execution complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Run failed; no report written");
            Err(e.into())
        }
    }
}
