//! Category list loading.

use crate::error::DigestError;
use crate::models::CategoryList;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};

/// Read the category list: one name per line, trimmed, blank lines skipped.
///
/// Any failure to read the file is fatal to the run.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn load_categories(path: &Path) -> Result<CategoryList, DigestError> {
    let raw = fs::read_to_string(path)
        .await
        .map_err(|source| DigestError::CategoryLoadFailed {
            path: path.to_path_buf(),
            source,
        })?;
    let list = parse_categories(&raw);
    if list.is_empty() {
        warn!("Category list is empty; the report listing will have no sections");
    }
    info!(count = list.len(), "Loaded categories");
    Ok(list)
}

pub fn parse_categories(raw: &str) -> CategoryList {
    CategoryList::new(
        raw.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_skips_blank_lines() {
        let list = parse_categories("  Pieno produktai \n\nDuona\r\n   \nMėsa\n");
        assert_eq!(
            list.iter().collect::<Vec<_>>(),
            vec!["Pieno produktai", "Duona", "Mėsa"]
        );
    }

    #[tokio::test]
    async fn test_load_categories_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("kategorijos.txt");
        std::fs::write(&path, "Dairy\nBakery\n").unwrap();

        let list = load_categories(&path).await.unwrap();
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["Dairy", "Bakery"]);
    }

    #[tokio::test]
    async fn test_missing_file_is_category_load_failed() {
        let tmp = tempfile::tempdir().unwrap();
        let err = load_categories(&tmp.path().join("missing.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, DigestError::CategoryLoadFailed { .. }));
    }
}
