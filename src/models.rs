//! Data models shared by every stage of a digest run.
//!
//! - [`OfferRecord`]: one promotional card as extracted from the page
//! - [`CategoryList`]: the configured category order for the full listing
//! - [`RunSummary`]: what a successful run produced
//!
//! All of these are built once per run and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One promotional card on the page.
///
/// `name` and `category` are always non-empty. `discount_percent` and
/// `special_label` are independent of each other: a card may carry either,
/// both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferRecord {
    /// Product or offer title, without line breaks or surrounding whitespace.
    pub name: String,
    /// Numeric discount badge, e.g. `40` for "-40%". `None` when the card has no badge.
    pub discount_percent: Option<u32>,
    /// Non-numeric promotional tag (multi-buy, loyalty price, ...). Empty when absent.
    pub special_label: String,
    /// Heading of the section the card was found in.
    pub category: String,
}

impl OfferRecord {
    /// Discount line for the report, e.g. `"40%   Milk"`.
    pub fn discount_line(&self) -> Option<String> {
        self.discount_percent.map(|pct| format!("{}%   {}", pct, self.name))
    }

    /// Special-label line for the report, e.g. `"2 for 1   Cheese"`.
    pub fn special_line(&self) -> Option<String> {
        if self.special_label.is_empty() {
            None
        } else {
            Some(format!("{}   {}", self.special_label, self.name))
        }
    }
}

/// Ordered category names that drive the full listing of the report.
///
/// Categories missing from this list never appear in the listing, even when
/// the page has offers for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryList {
    names: Vec<String>,
}

impl CategoryList {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunSummary {
    pub report_path: PathBuf,
    pub json_path: Option<PathBuf>,
    pub total_offers: usize,
    pub notable_offers: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(discount: Option<u32>, special: &str) -> OfferRecord {
        OfferRecord {
            name: "Milk".to_string(),
            discount_percent: discount,
            special_label: special.to_string(),
            category: "Dairy".to_string(),
        }
    }

    #[test]
    fn test_discount_line() {
        assert_eq!(
            record(Some(40), "").discount_line(),
            Some("40%   Milk".to_string())
        );
        assert_eq!(record(None, "").discount_line(), None);
    }

    #[test]
    fn test_zero_discount_still_reported() {
        assert_eq!(
            record(Some(0), "").discount_line(),
            Some("0%   Milk".to_string())
        );
    }

    #[test]
    fn test_special_line() {
        assert_eq!(
            record(None, "2 for 1").special_line(),
            Some("2 for 1   Milk".to_string())
        );
        assert_eq!(record(Some(10), "").special_line(), None);
    }

    #[test]
    fn test_offer_record_serialization() {
        let json = serde_json::to_string(&record(Some(35), "")).unwrap();
        assert!(json.contains("\"discount_percent\":35"));
        assert!(json.contains("\"category\":\"Dairy\""));

        let back: OfferRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back.discount_percent, Some(35));
    }

    #[test]
    fn test_category_list_preserves_order() {
        let list = CategoryList::new(vec!["Dairy".into(), "Bakery".into()]);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["Dairy", "Bakery"]);
        assert_eq!(list.len(), 2);
        assert!(!list.is_empty());
    }
}
