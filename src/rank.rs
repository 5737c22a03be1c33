//! Picking and ordering the offers worth highlighting.

use crate::config::RulesConfig;
use crate::models::OfferRecord;
use std::cmp::Reverse;
use tracing::{debug, info, instrument};

/// Selection thresholds and locale phrases.
#[derive(Debug, Clone)]
pub struct NotableRules {
    min_discount: u32,
    multi_buy_marker: String,
    /// Stored lowercased; matched against a lowercased label.
    units_marker: String,
}

impl NotableRules {
    pub fn new(min_discount: u32, multi_buy_marker: &str, units_marker: &str) -> Self {
        Self {
            min_discount,
            multi_buy_marker: multi_buy_marker.to_string(),
            units_marker: units_marker.to_lowercase(),
        }
    }

    /// Whether `record` belongs in the highlighted part of the report.
    ///
    /// Multi-buy offers ("3 vnt. už 5€") are dropped before anything else is
    /// looked at, whatever their discount.
    pub fn is_notable(&self, record: &OfferRecord) -> bool {
        if record.special_label.contains(&self.multi_buy_marker) {
            return false;
        }

        let big_discount = record
            .discount_percent
            .is_some_and(|pct| pct > self.min_discount);
        let real_label = !record.special_label.is_empty()
            && !record
                .special_label
                .to_lowercase()
                .contains(&self.units_marker);

        big_discount || real_label
    }
}

impl From<&RulesConfig> for NotableRules {
    fn from(config: &RulesConfig) -> Self {
        Self::new(
            config.min_discount,
            &config.multi_buy_marker,
            &config.units_marker,
        )
    }
}

/// Filter `records` down to notable offers, biggest discount first.
///
/// The sort is stable: equal discounts keep extraction order, and offers
/// without a discount follow all discounted ones, still in extraction order.
#[instrument(level = "info", skip_all, fields(total = records.len()))]
pub fn select_notable<'r>(
    records: &'r [OfferRecord],
    rules: &NotableRules,
) -> Vec<&'r OfferRecord> {
    let mut notable: Vec<&OfferRecord> = records
        .iter()
        .filter(|r| {
            let keep = rules.is_notable(r);
            if !keep {
                debug!(name = %r.name, category = %r.category, "Not notable");
            }
            keep
        })
        .collect();

    // None < Some(_), so Reverse puts every Some ahead of every None.
    notable.sort_by_key(|r| Reverse(r.discount_percent));

    info!(count = notable.len(), "Selected notable offers");
    notable
}
