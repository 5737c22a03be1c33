//! One digest run, start to finish.
//!
//! Stages run strictly in sequence, each consuming the previous one's output:
//!
//! 1. **Categories**: load the category list (fatal on failure, before any network)
//! 2. **Fetch**: get the promotions page through [`RetryFetch`]
//! 3. **Extract**: turn the markup into [`OfferRecord`]s
//! 4. **Rank**: pick and order the notable offers
//! 5. **Compose**: render the report text
//! 6. **Persist**: write the report (and the optional JSON export)
//!
//! Nothing is written unless every earlier stage succeeded.

use crate::categories::load_categories;
use crate::config::Config;
use crate::error::DigestError;
use crate::extract::{PageLayout, extract_offers};
use crate::fetch::{PageSource, Pause, RetryFetch};
use crate::models::RunSummary;
use crate::outputs::json;
use crate::rank::{NotableRules, select_notable};
use crate::report::{compose, report_path, write_report};
use crate::utils::{ensure_writable_dir, file_timestamp};
use chrono::Local;
use std::path::PathBuf;
use tracing::{info, instrument};

/// Everything a run needs, passed explicitly to each stage.
#[derive(Debug)]
pub struct RunContext {
    pub config: Config,
    pub categories_path: PathBuf,
    pub output_dir: PathBuf,
    pub export_json: bool,
}

impl RunContext {
    /// Compile the page layout and rules up front so a bad config fails
    /// before the network is touched.
    fn prepare(&self) -> Result<(PageLayout, NotableRules), DigestError> {
        self.config.validate()?;
        let layout = PageLayout::compile(&self.config.layout)?;
        let rules = NotableRules::from(&self.config.rules);
        Ok((layout, rules))
    }
}

/// Run the whole pipeline with `fetcher` as the page source.
///
/// # Returns
///
/// Paths of what was written and the offer counts.
///
/// # Errors
///
/// Any [`DigestError`] from a stage. When one is returned, neither the
/// report nor the JSON export is left in the output directory.
pub async fn run<S: PageSource, P: Pause>(
    ctx: &RunContext,
    fetcher: &RetryFetch<S, P>,
) -> Result<RunSummary, DigestError> {
    let timestamp = file_timestamp(&Local::now());
    run_stamped(ctx, fetcher, &timestamp).await
}

#[instrument(level = "info", skip(ctx, fetcher), fields(url = %ctx.config.url))]
async fn run_stamped<S: PageSource, P: Pause>(
    ctx: &RunContext,
    fetcher: &RetryFetch<S, P>,
    timestamp: &str,
) -> Result<RunSummary, DigestError> {
    let (layout, rules) = ctx.prepare()?;

    let categories = load_categories(&ctx.categories_path).await?;
    ensure_writable_dir(&ctx.output_dir)
        .await
        .map_err(|e| DigestError::io(&ctx.output_dir, e))?;

    let markup = fetcher.fetch(&ctx.config.url).await?;

    let all = extract_offers(&markup, &layout)?;
    let notable = select_notable(&all, &rules);
    let text = compose(
        &notable,
        &all,
        &categories,
        &ctx.config.report.listing_heading,
    );

    // The export goes first so the report only appears once everything else succeeded.
    let json_path = if ctx.export_json {
        let path = json::export_path(&ctx.output_dir, timestamp);
        json::write_notable(&notable, &path).await?;
        Some(path)
    } else {
        None
    };

    let report_path = report_path(&ctx.output_dir, timestamp);
    if let Err(e) = write_report(&report_path, &text).await {
        if let Some(path) = &json_path {
            let _ = tokio::fs::remove_file(path).await;
        }
        return Err(e);
    }

    info!(
        total = all.len(),
        notable = notable.len(),
        report = %report_path.display(),
        "Digest complete"
    );

    Ok(RunSummary {
        report_path,
        json_path,
        total_offers: all.len(),
        notable_offers: notable.len(),
    })
}
