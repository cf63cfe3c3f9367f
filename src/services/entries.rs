// src/services/entries.rs

//! Encyclopedia entry fetcher service.
//!
//! Fetches full entry records in batches from the detail API and untangles
//! the response: entries are grouped by category key, single results
//! collapse to scalars, and `warning` carries "no result" notices for ids
//! the API does not know.

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Category, Config};
use crate::utils::{http, xml};

/// Service for fetching encyclopedia entries from the detail API.
pub struct EntryFetcher<'a> {
    config: &'a Config,
    client: Client,
}

impl<'a> EntryFetcher<'a> {
    /// Create a new entry fetcher with the given configuration.
    pub fn new(config: &'a Config) -> Result<Self> {
        let client = http::create_client(&config.http)?;
        Ok(Self { config, client })
    }

    /// Fetch one batch of entries, all ids in a single request.
    ///
    /// Timeouts are retried up to the configured cap; any other failure is
    /// immediately fatal. Returns the `ann` payload object whose keys are
    /// category names or `warning`.
    pub fn fetch_batch(&self, ids: &[String]) -> Result<Value> {
        let url = format!(
            "{}/encyclopedia/api.xml?title={}",
            self.config.api.host,
            ids.join("/")
        );
        log::info!("Fetching {} entries from {url}", ids.len());

        let body = http::get_text_with_retry(&self.client, &url, self.config.http.max_retries)?;
        let document = xml::xml_to_json(&body)?;

        document
            .as_object()
            .and_then(|root| root.get("ann"))
            .cloned()
            .ok_or_else(|| AppError::report("detail response", "missing `ann` root element"))
    }
}

/// Pick the entries for the requested category out of a detail payload.
///
/// Warnings are logged and skipped; so are entries grouped under any other
/// category key, which guards against the API misrouting categories.
pub fn select_category_entries(payload: Value, category: Category) -> Vec<Value> {
    let Value::Object(groups) = payload else {
        log::warn!("Detail payload is not an object: {payload}");
        return Vec::new();
    };

    let mut selected = Vec::new();
    for (key, group) in groups {
        let values = xml::into_list(group);

        if key == "warning" {
            for warning in values {
                log::warn!("Skipped. Warning: {}", render(&warning));
            }
            continue;
        }

        if key != category.tag() {
            for unexpected in values {
                log::warn!(
                    "Skipped. Unexpected entry type `{key}` for entry `{}`.",
                    render(&unexpected)
                );
            }
            continue;
        }

        selected.extend(values);
    }
    selected
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
