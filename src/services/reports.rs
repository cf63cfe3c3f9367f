// src/services/reports.rs

//! Report listing fetcher service.
//!
//! Downloads the per-category index listings from the reports API and
//! normalizes them into flat [`ReportItem`] sequences. Anime and manga get
//! the extra search-report fields merged in by id; the person listing is
//! fetched in pages because the API refuses `nlist=all` for it.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Category, Config, ReportItem, SearchItem, combine_search_data};
use crate::utils::{self, http, xml};

/// Search report id shared by anime and manga.
const SEARCH_REPORT_ID: u32 = 155;

/// Service for fetching category report listings.
pub struct ReportFetcher<'a> {
    config: &'a Config,
    client: Client,
}

impl<'a> ReportFetcher<'a> {
    /// Create a new report fetcher with the given configuration.
    pub fn new(config: &'a Config) -> Result<Self> {
        let client = http::create_client(&config.http)?;
        Ok(Self { config, client })
    }

    /// Fetch the full report for one category.
    pub fn fetch(&self, category: Category) -> Result<Vec<ReportItem>> {
        if category.paged() {
            return self.fetch_paged(category);
        }

        let url = self.listing_url(category, "all", None);
        let common = self.fetch_common(&url, category)?;

        if !category.has_search_report() {
            return Ok(common);
        }

        let search = self.fetch_search(category)?;
        Ok(combine_search_data(common, search))
    }

    /// Fetch one common listing page.
    fn fetch_common(&self, url: &str, category: Category) -> Result<Vec<ReportItem>> {
        log::info!("Fetching `{category}` listing from {url}");
        let body = http::get_text(&self.client, url)?;
        parse_common_listing(&body, category)
    }

    /// Fetch the search listing carrying gid/entry_type/precision/vintage.
    fn fetch_search(&self, category: Category) -> Result<Vec<SearchItem>> {
        let url = format!(
            "{}/encyclopedia/reports.xml?id={}&nlist=all&type={}",
            self.config.api.host,
            SEARCH_REPORT_ID,
            category.tag()
        );
        log::info!("Fetching `{category}` search listing from {url}");
        let body = http::get_text(&self.client, &url)?;
        parse_search_listing(&body)
    }

    /// Fetch a paged listing.
    ///
    /// Ids are assigned monotonically, so the single item returned by
    /// `nlist=1` approximates the total record count. Pages are then walked
    /// with `nskip`, sleeping between requests to respect rate limits.
    fn fetch_paged(&self, category: Category) -> Result<Vec<ReportItem>> {
        let probe_url = self.listing_url(category, "1", None);
        let probe = self.fetch_common(&probe_url, category)?;

        let newest = probe.first().ok_or_else(|| {
            AppError::report(category.tag(), "probe request returned no items")
        })?;
        let approximate_total: u64 = newest.id.parse().map_err(|_| {
            AppError::report(
                category.tag(),
                format!("probe returned non-numeric id `{}`", newest.id),
            )
        })?;

        let page_size = self.config.api.page_size;
        let mut items = Vec::new();
        let mut offset = 0;
        while offset < approximate_total {
            thread::sleep(Duration::from_millis(self.config.http.request_delay_ms));
            let url = self.listing_url(category, &page_size.to_string(), Some(offset));
            items.extend(self.fetch_common(&url, category)?);
            offset += page_size;
        }
        Ok(items)
    }

    fn listing_url(&self, category: Category, nlist: &str, nskip: Option<u64>) -> String {
        let mut url = format!(
            "{}/encyclopedia/reports.xml?id={}&nlist={}",
            self.config.api.host,
            category.report_id(),
            nlist
        );
        if let Some(offset) = nskip {
            url.push_str(&format!("&nskip={offset}"));
        }
        url
    }
}

/// Parse a common listing document into report items.
///
/// Items without a usable id are dropped with a warning; malformed
/// `date_added` values become null.
pub fn parse_common_listing(body: &str, category: Category) -> Result<Vec<ReportItem>> {
    let document = xml::xml_to_json(body)?;
    let mut items = Vec::new();

    for item in listing_items(&document) {
        let tagged = item.get(category.tag());

        let id = tagged
            .and_then(|t| t.get("+@href"))
            .and_then(Value::as_str)
            .and_then(|href| href.rsplit('=').next())
            .filter(|id| !id.is_empty())
            .map(str::to_string);
        let Some(id) = id else {
            log::warn!("Dropping `{category}` listing item without an id: {item}");
            continue;
        };

        let name = tagged
            .and_then(|t| t.get("+content"))
            .and_then(Value::as_str)
            .map(str::to_string);

        let date_added = item
            .get("date_added")
            .and_then(Value::as_str)
            .and_then(|raw| {
                let converted = utils::xml_datetime_to_iso(raw);
                if converted.is_none() {
                    log::warn!("Malformed date_added `{raw}` for `{category}` item {id}");
                }
                converted
            });

        items.push(ReportItem {
            id,
            name,
            date_added,
            search: None,
        });
    }
    Ok(items)
}

/// Parse a search listing document.
pub fn parse_search_listing(body: &str) -> Result<Vec<SearchItem>> {
    let document = xml::xml_to_json(body)?;

    Ok(listing_items(&document)
        .into_iter()
        .map(|item| SearchItem {
            id: text_child(&item, "id"),
            gid: text_child(&item, "gid"),
            entry_type: text_child(&item, "entry_type"),
            name: text_child(&item, "name"),
            precision: text_child(&item, "precision"),
            vintage: text_child(&item, "vintage"),
        })
        .collect())
}

/// All `<item>` elements of a listing document, regardless of the root
/// element's name.
fn listing_items(document: &Value) -> Vec<Value> {
    document
        .as_object()
        .and_then(|root| root.values().next())
        .and_then(|report| report.get("item"))
        .cloned()
        .map(xml::into_list)
        .unwrap_or_default()
}

fn text_child(item: &Value, tag: &str) -> Option<String> {
    item.get(tag)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
