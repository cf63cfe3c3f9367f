//! Entry update orchestration.
//!
//! Reads a stored report, classifies every item against the local entry
//! store, fetches a bounded batch of missing or outdated entries, stamps
//! provenance, and writes each entry independently. A failure mid-batch
//! leaves earlier entries already written.

use std::path::Path;

use chrono::Utc;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{Category, Config};
use crate::pipeline::classify::{Classified, Classifier, SkipList, UpdateKind};
use crate::pipeline::provenance;
use crate::services::{EntryFetcher, select_category_entries};
use crate::storage::LocalStore;

/// Options for one update run.
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub category: Category,
    pub kind: UpdateKind,
    pub batch_size: usize,
    pub threshold_days: u32,
}

/// Run the update stage for one category.
pub fn run_update(
    config: &Config,
    reports: &LocalStore,
    input: &LocalStore,
    output: &LocalStore,
    blacklist_dir: &Path,
    options: &UpdateOptions,
) -> Result<()> {
    let category = options.category;
    if !category.has_detail_api() {
        return Err(AppError::validation(format!(
            "The detail API does not serve `{category}` entries"
        )));
    }

    let report_path = reports.report_path(category);
    if !report_path.is_file() {
        log::error!(
            "Report not found at {}. Run 'report' first.",
            report_path.display()
        );
        return Err(AppError::config("Report not found"));
    }
    let report = reports.read_report(category)?;

    let skip = SkipList::load(blacklist_dir, category);
    let classifier = Classifier {
        category,
        store: input,
        skip: &skip,
        threshold_days: options.threshold_days,
    };
    let classification = classifier.classify(&report, Utc::now())?;
    log::info!(
        "Classified {} `{category}` items: {} fresh, {} missing, {} outdated, {} skipped, {} broken.",
        classification.len(),
        classification.exist.len(),
        classification.missing.len(),
        classification.outdated.len(),
        classification.skipped.len(),
        classification.broken.len()
    );

    let batch: Vec<&Classified> = classification
        .bucket(options.kind)
        .iter()
        .take(options.batch_size)
        .collect();
    if batch.is_empty() {
        log::info!("No `{}` entries to update.", options.kind);
        return Ok(());
    }

    let ids: Vec<String> = batch.iter().map(|c| c.item.id.clone()).collect();
    let fetcher = EntryFetcher::new(config)?;
    let payload = fetcher.fetch_batch(&ids)?;
    let entries = select_category_entries(payload, category);

    let mut written = 0;
    for mut entry in entries {
        let Some(id) = entry.get("+@id").and_then(Value::as_str).map(str::to_string) else {
            log::warn!("Skipped. Entry without an id: {entry}");
            continue;
        };

        let Some(matched) = batch.iter().find(|c| ids_match(&c.item.id, &id)) else {
            log::warn!("Skipped. Entry `{id}` does not match any requested id.");
            continue;
        };

        let previous = matched
            .file
            .as_deref()
            .map(LocalStore::read_entry)
            .transpose()?;

        let changed = provenance::stamp(&mut entry, &matched.item, previous.as_ref(), Utc::now());
        if changed && previous.is_some() {
            log::info!("File contents changed for {id}.");
        }

        let path = output.write_entry(category, &id, &entry)?;
        log::info!(
            "Encyclopedia entry `{id}` for category `{category}` saved to `{}`.",
            path.display()
        );
        written += 1;
    }

    log::info!(
        "Updated {written} `{}` entries for category `{category}`.",
        options.kind
    );
    Ok(())
}

/// Ids match numerically when both parse; otherwise as raw strings.
fn ids_match(a: &str, b: &str) -> bool {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
