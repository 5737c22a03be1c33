//! Command-line interface definitions for Promo Digest.
//!
//! Flags override values from the optional YAML config file; see
//! [`Config::apply_cli`](crate::config::Config::apply_cli).

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for a single digest run.
///
/// # Examples
///
/// ```sh
/// # Defaults: kategorijos.txt in the working directory, reports under ./results
/// promo_digest
///
/// # Custom config and a JSON export of the notable offers
/// promo_digest -c promo.yaml -k categories.txt -o /var/lib/promo --json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Category list, one name per line, in report order
    #[arg(short = 'k', long, default_value = "kategorijos.txt")]
    pub categories: PathBuf,

    /// Directory the report (and JSON export) is written to
    #[arg(short, long, default_value = "results")]
    pub output_dir: PathBuf,

    /// Promotions page URL (overrides the config file)
    #[arg(long, env = "PROMO_URL")]
    pub url: Option<String>,

    /// Total fetch attempts before giving up
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Seconds to wait between fetch attempts
    #[arg(long)]
    pub delay_secs: Option<u64>,

    /// Also write the notable offers as JSON next to the report
    #[arg(long)]
    pub json: bool,
}
