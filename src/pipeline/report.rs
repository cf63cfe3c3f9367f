//! Report refresh orchestration.

use std::thread;
use std::time::Duration;

use crate::error::Result;
use crate::models::{Category, Config};
use crate::services::ReportFetcher;
use crate::storage::LocalStore;

/// Refresh one category's report, or all categories when none is given.
///
/// Consecutive categories are separated by the configured request delay to
/// stay under the API's rate limit.
pub fn run_reports(config: &Config, store: &LocalStore, category: Option<Category>) -> Result<()> {
    let fetcher = ReportFetcher::new(config)?;

    match category {
        Some(category) => refresh_category(&fetcher, store, category),
        None => {
            for (index, category) in Category::ALL.into_iter().enumerate() {
                if index > 0 {
                    thread::sleep(Duration::from_millis(config.http.request_delay_ms));
                }
                refresh_category(&fetcher, store, category)?;
            }
            Ok(())
        }
    }
}

fn refresh_category(
    fetcher: &ReportFetcher<'_>,
    store: &LocalStore,
    category: Category,
) -> Result<()> {
    let items = fetcher.fetch(category)?;
    let path = store.write_report(category, &items)?;
    log::info!(
        "Report for category `{category}` saved to `{}` ({} items).",
        path.display(),
        items.len()
    );
    Ok(())
}
