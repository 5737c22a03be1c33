//! Plain-text digest report.
//!
//! # Layout
//!
//! ```text
//! 50%   Sviestas   Pieno produktai
//!
//! Ačiū kaina   Sūris   Pieno produktai
//!
//!
//! IŠ PASIRINKTŲ KATEGORIJŲ
//! Pieno produktai
//! 50%   Sviestas
//! 10%   Jogurtas
//! Ačiū kaina   Sūris
//! Duona
//! ```
//!
//! The highlighted offers come first, each line followed by a blank line.
//! The listing after the heading covers only the configured categories, in
//! configured order, and every offer in them (notable or not).

use crate::error::DigestError;
use crate::models::{CategoryList, OfferRecord};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Render the full report text.
///
/// # Arguments
///
/// * `notable` - Highlighted offers, already filtered and ranked
/// * `all` - Every extracted offer, in extraction order
/// * `categories` - Categories to list, in listing order
/// * `listing_heading` - Header line opening the category listing
///
/// # Returns
///
/// The complete report. Offers with neither a discount nor a special label
/// contribute no lines; categories missing from `categories` are not listed.
pub fn compose(
    notable: &[&OfferRecord],
    all: &[OfferRecord],
    categories: &CategoryList,
    listing_heading: &str,
) -> String {
    let mut out = String::new();

    for record in notable {
        if let Some(line) = record.discount_line() {
            writeln!(out, "{}   {}\n", line, record.category).unwrap();
        }
        if let Some(line) = record.special_line() {
            writeln!(out, "{}   {}\n", line, record.category).unwrap();
        }
    }

    writeln!(out, "\n{}", listing_heading).unwrap();

    for category in categories.iter() {
        writeln!(out, "{}", category).unwrap();
        for record in all.iter().filter(|r| r.category == category) {
            if let Some(line) = record.discount_line() {
                writeln!(out, "{}", line).unwrap();
            }
            if let Some(line) = record.special_line() {
                writeln!(out, "{}", line).unwrap();
            }
        }
    }

    out
}

/// Path of the report for a run started at `timestamp`.
pub fn report_path(output_dir: &Path, timestamp: &str) -> PathBuf {
    output_dir.join(format!("results_{}.txt", timestamp))
}

/// Write `text` to `path` all at once.
///
/// The text goes to a `.part` sibling first and is renamed into place, so
/// readers never see a half-written report.
///
/// # Arguments
///
/// * `path` - Final report path, see [`report_path`]
/// * `text` - Report text from [`compose`]
///
/// # Errors
///
/// Returns [`DigestError::Io`] if the `.part` file cannot be written or
/// renamed. The `.part` file is removed on either failure.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_report(path: &Path, text: &str) -> Result<(), DigestError> {
    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    if let Err(e) = fs::write(&part, text).await {
        let _ = fs::remove_file(&part).await;
        return Err(DigestError::io(&part, e));
    }
    if let Err(e) = fs::rename(&part, path).await {
        let _ = fs::remove_file(&part).await;
        return Err(DigestError::io(path, e));
    }

    info!(bytes = text.len(), "Wrote report");
    Ok(())
}
