//! Run configuration.
//!
//! Everything that depends on the retailer's page (URL, selectors, locale
//! phrases) lives here rather than in the pipeline code, so a page redesign
//! or a different locale is a YAML edit, not a code change.
//!
//! # Example
//!
//! ```yaml
//! url: https://www.maxima.lt/pasiulymai
//! fetch:
//!   max_attempts: 5
//!   delay_secs: 10
//! rules:
//!   min_discount: 40
//! ```
//!
//! Omitted fields fall back to [`Config::default`].

use crate::cli::Cli;
use crate::error::DigestError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Promotions page to scrape.
    pub url: String,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    pub fetch: FetchConfig,
    pub layout: LayoutConfig,
    pub rules: RulesConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Fixed pause between consecutive attempts.
    pub delay_secs: u64,
}

/// CSS selectors describing the page structure.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Offer sections are `<section>` elements whose `id` starts with this.
    pub section_id_prefix: String,
    pub section_heading: String,
    pub card: String,
    pub card_title: String,
    pub discount_badge: String,
    pub special_label: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Discounts strictly above this are notable.
    pub min_discount: u32,
    /// Phrase marking an "N units for price P" offer; such offers are never notable.
    pub multi_buy_marker: String,
    /// Unit abbreviation; special labels containing it (any case) do not count as notable.
    pub units_marker: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Header line that opens the category-grouped listing.
    pub listing_heading: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: "https://www.maxima.lt/pasiulymai".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            fetch: FetchConfig::default(),
            layout: LayoutConfig::default(),
            rules: RulesConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_secs: 5,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            section_id_prefix: "offer_list_multiple".to_string(),
            section_heading: "h2.mb-3.mb-lg-4".to_string(),
            card: "div.card-body.offer-card.d-flex.flex-column".to_string(),
            card_title: "h4.mt-4.text-truncate.text-truncate--2".to_string(),
            discount_badge: "div.discount".to_string(),
            special_label: "div.px-1.px-sm-2.px-lg-250.py-2.text-wrap.d-flex.align-items-center\
                            .justify-content-center.text-center.text-white.h-100.benefit-icon"
                .to_string(),
        }
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            min_discount: 30,
            multi_buy_marker: "vnt. už".to_string(),
            units_marker: "vnt.".to_string(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            listing_heading: "IŠ PASIRINKTŲ KATEGORIJŲ".to_string(),
        }
    }
}

impl Config {
    /// Load the YAML file at `path`, or the defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, DigestError> {
        let Some(path) = path else {
            debug!("No config file given; using built-in defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path).map_err(|e| DigestError::io(path, e))?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, DigestError> {
        serde_yaml::from_str(raw).map_err(|e| DigestError::InvalidConfig(e.to_string()))
    }

    /// Apply command-line overrides on top of the file values.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(url) = &cli.url {
            self.url = url.clone();
        }
        if let Some(max_attempts) = cli.max_attempts {
            self.fetch.max_attempts = max_attempts;
        }
        if let Some(delay_secs) = cli.delay_secs {
            self.fetch.delay_secs = delay_secs;
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), DigestError> {
        if self.fetch.max_attempts == 0 {
            return Err(DigestError::InvalidConfig(
                "fetch.max_attempts must be at least 1".to_string(),
            ));
        }
        url::Url::parse(&self.url)
            .map_err(|e| DigestError::InvalidConfig(format!("url {:?}: {}", self.url, e)))?;
        if self.rules.multi_buy_marker.is_empty() || self.rules.units_marker.is_empty() {
            return Err(DigestError::InvalidConfig(
                "rules markers must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn fetch_delay(&self) -> Duration {
        Duration::from_secs(self.fetch.delay_secs)
    }
}
