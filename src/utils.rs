//! Small helpers for text cleanup, logging and the file system.

use chrono::{DateTime, Local};
use std::fs as stdfs;
use std::io;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Drop line breaks and surrounding whitespace from scraped text.
///
/// Line breaks are removed outright rather than replaced by a space, so
/// `"Milk\n 1 L"` becomes `"Milk 1 L"` and `"\n  -40%\n"` becomes `"-40%"`.
pub fn strip_line_breaks(s: &str) -> String {
    s.chars()
        .filter(|c| *c != '\n' && *c != '\r')
        .collect::<String>()
        .trim()
        .to_string()
}

/// Parse the digits of a discount badge, ignoring everything else.
///
/// `"-40 %"` → `Some(40)`. Returns `None` when there are no digits or the
/// number does not fit in a `u32`.
pub fn digits_to_number(s: &str) -> Option<u32> {
    let digits: String = s.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` bytes (backed off to a char boundary) with
/// `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

/// Timestamp used in report file names, e.g. `2025-05-06_14-03-59`.
pub fn file_timestamp(now: &DateTime<Local>) -> String {
    now.format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Ensure a directory exists and is writable.
///
/// Creates the directory if needed, then creates and removes a scratch file.
///
/// # Arguments
///
/// * `path` - The directory to validate
///
/// # Errors
///
/// Returns the underlying I/O error if the directory cannot be created or
/// the scratch file cannot be written (permission denied, read-only filesystem, ...).
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn ensure_writable_dir(path: &Path) -> io::Result<()> {
    fs::create_dir_all(path).await?;
    let scratch_path = path.join("..__write_check__");
    stdfs::File::create(&scratch_path)?;
    let _ = stdfs::remove_file(&scratch_path);
    info!("Output directory is writable");
    Ok(())
}
