//! JSON export of the notable offers.
//!
//! Consumers get the same ranked list that heads the text report, one
//! object per offer:
//!
//! ```json
//! [{"name":"Milk","discount_percent":40,"special_label":"","category":"Dairy"}]
//! ```

use crate::error::DigestError;
use crate::models::OfferRecord;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Path of the JSON export for a run started at `timestamp`.
pub fn export_path(output_dir: &Path, timestamp: &str) -> PathBuf {
    output_dir.join(format!("results_{}.json", timestamp))
}

/// Serialize `notable` (already ranked) and write it to `path`.
///
/// # Errors
///
/// Returns [`DigestError::Io`] if the file cannot be written; a partially
/// written file is removed first.
#[instrument(level = "info", skip_all, fields(path = %path.display(), count = notable.len()))]
pub async fn write_notable(notable: &[&OfferRecord], path: &Path) -> Result<(), DigestError> {
    let json = serde_json::to_string_pretty(notable)
        .map_err(|e| DigestError::Serialization(e.to_string()))?;

    if let Err(e) = fs::write(path, json).await {
        error!(error = %e, "Failed to write JSON export");
        let _ = fs::remove_file(path).await;
        return Err(DigestError::io(path, e));
    }
    info!("Wrote JSON export");

    Ok(())
}
