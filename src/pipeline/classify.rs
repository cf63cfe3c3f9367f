//! Freshness classification of report items.
//!
//! A single ordered pass over a stored report partitions every item into
//! exactly one of five buckets:
//!
//! - **broken**: ids with known-invalid XML in the detail API
//! - **skipped**: names matching a per-category keyword exclusion list
//! - **missing**: no local entry file
//! - **outdated**: local file older than the staleness threshold
//! - **exist**: local file still fresh

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::ValueEnum;
use regex::Regex;
use serde_json::Value;

use crate::error::Result;
use crate::models::{Category, ReportItem};
use crate::pipeline::provenance::DATE_LAST_UPDATED_AT;
use crate::storage::LocalStore;
use crate::utils;

const SECONDS_PER_DAY: f64 = 60.0 * 60.0 * 24.0;

/// A report item together with its local entry file, when one exists.
#[derive(Debug, Clone)]
pub struct Classified {
    pub file: Option<PathBuf>,
    pub item: ReportItem,
}

/// Which bucket an update run drains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UpdateKind {
    Missing,
    Outdated,
}

impl fmt::Display for UpdateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdateKind::Missing => f.write_str("missing"),
            UpdateKind::Outdated => f.write_str("outdated"),
        }
    }
}

/// Total, non-overlapping partition of a report.
#[derive(Debug, Default)]
pub struct Classification {
    pub exist: Vec<Classified>,
    pub missing: Vec<Classified>,
    pub outdated: Vec<Classified>,
    pub skipped: Vec<Classified>,
    pub broken: Vec<Classified>,
}

impl Classification {
    /// The bucket an update run selects from.
    pub fn bucket(&self, kind: UpdateKind) -> &[Classified] {
        match kind {
            UpdateKind::Missing => &self.missing,
            UpdateKind::Outdated => &self.outdated,
        }
    }

    /// Total number of classified items across all buckets.
    pub fn len(&self) -> usize {
        self.exist.len()
            + self.missing.len()
            + self.outdated.len()
            + self.skipped.len()
            + self.broken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keyword exclusion list for one category.
///
/// Matches names ending with a `(keyword ...)` marker, case-insensitively.
/// The keyword set comes from `{blacklist_dir}/{category}.json`; a missing
/// or malformed file degrades to an empty list.
#[derive(Debug, Default)]
pub struct SkipList {
    pattern: Option<Regex>,
}

impl SkipList {
    /// Load the keyword list for a category from the blacklist directory.
    pub fn load(dir: &Path, category: Category) -> Self {
        let path = dir.join(format!("{}.json", category.tag()));
        if !path.is_file() {
            return Self::default();
        }

        let keywords: Vec<String> = match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()))
        {
            Ok(keywords) => keywords,
            Err(e) => {
                log::warn!(
                    "Could not read blacklist {}: {}. Using empty list.",
                    path.display(),
                    e
                );
                return Self::default();
            }
        };

        Self::from_keywords(&keywords)
    }

    /// Build a skip list from an in-memory keyword set.
    pub fn from_keywords(keywords: &[String]) -> Self {
        if keywords.is_empty() {
            return Self::default();
        }

        let alternatives = keywords
            .iter()
            .map(|keyword| regex::escape(keyword))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = format!(r"(?i)\((?P<kind>{alternatives}).*?\)\s*$");

        match Regex::new(&pattern) {
            Ok(regex) => Self {
                pattern: Some(regex),
            },
            Err(e) => {
                log::warn!("Invalid blacklist pattern: {e}. Using empty list.");
                Self::default()
            }
        }
    }

    /// The matched keyword, when the name carries an excluded marker.
    pub fn matched_keyword(&self, name: &str) -> Option<String> {
        self.pattern
            .as_ref()?
            .captures(name)?
            .name("kind")
            .map(|m| m.as_str().to_string())
    }
}

/// Classifier for one category's report against its local entry store.
pub struct Classifier<'a> {
    pub category: Category,
    pub store: &'a LocalStore,
    pub skip: &'a SkipList,
    pub threshold_days: u32,
}

impl Classifier<'_> {
    /// Partition the report, in report order.
    pub fn classify(&self, report: &[ReportItem], now: DateTime<Utc>) -> Result<Classification> {
        let mut result = Classification::default();

        for item in report {
            let name = item.name.as_deref().unwrap_or("<unnamed>");

            // Broken ids are unfetchable regardless of anything else.
            if item
                .numeric_id()
                .is_some_and(|id| self.category.broken_ids().contains(&id))
            {
                log::info!("Skipping broken item `{name}` ({}).", item.id);
                result.broken.push(Classified {
                    file: None,
                    item: item.clone(),
                });
                continue;
            }

            if let Some(matched) = item
                .name
                .as_deref()
                .and_then(|name| self.skip.matched_keyword(name))
            {
                log::info!("Skipping `{matched}` item `{name}` ({}).", item.id);
                result.skipped.push(Classified {
                    file: None,
                    item: item.clone(),
                });
                continue;
            }

            let path = self.store.entry_path(self.category, &item.id);
            if !path.is_file() {
                log::info!("File does not exist: {}", path.display());
                result.missing.push(Classified {
                    file: None,
                    item: item.clone(),
                });
                continue;
            }

            let entry = LocalStore::read_entry(&path)?;
            let last_updated = last_updated_at(&path, &entry, now);
            let age_days = (now.timestamp() - last_updated) as f64 / SECONDS_PER_DAY;

            if age_days > f64::from(self.threshold_days) {
                log::info!("File exists (outdated): {}", path.display());
                result.outdated.push(Classified {
                    file: Some(path),
                    item: item.clone(),
                });
            } else {
                log::info!("File exists (fresh): {}", path.display());
                result.exist.push(Classified {
                    file: Some(path),
                    item: item.clone(),
                });
            }
        }

        Ok(result)
    }
}

/// When the entry was last checked, in Unix seconds.
///
/// Prefers the stored `+@date-last-updated-at`; files without it (added by
/// hand) fall back to their filesystem mtime, and if even that is
/// unavailable the entry counts as fresh.
fn last_updated_at(path: &Path, entry: &Value, now: DateTime<Utc>) -> i64 {
    if let Some(raw) = entry.get(DATE_LAST_UPDATED_AT).and_then(Value::as_str) {
        if let Some(timestamp) = utils::iso_to_timestamp(raw) {
            return timestamp;
        }
        log::warn!(
            "Unparseable `{DATE_LAST_UPDATED_AT}` in {}; falling back to file mtime.",
            path.display()
        );
    }

    match fs::metadata(path).and_then(|meta| meta.modified()) {
        Ok(mtime) => DateTime::<Utc>::from(mtime).timestamp(),
        Err(_) => now.timestamp(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn item(id: &str, name: &str) -> ReportItem {
        ReportItem {
            id: id.to_string(),
            name: Some(name.to_string()),
            date_added: Some("2020-01-01T00:00:00Z".to_string()),
            search: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 12, 0, 0).unwrap()
    }

    fn write_entry_updated_at(store: &LocalStore, category: Category, id: &str, updated: &str) {
        let entry = json!({"+@id": id, DATE_LAST_UPDATED_AT: updated});
        store.write_entry(category, id, &entry).unwrap();
    }

    fn iso_days_ago(days: f64) -> String {
        let seconds = (days * SECONDS_PER_DAY) as i64;
        crate::utils::datetime_to_iso(now() - Duration::seconds(seconds))
    }

    #[test]
    fn test_partition_is_total_and_disjoint() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        write_entry_updated_at(&store, Category::Manga, "2", &iso_days_ago(1.0));
        write_entry_updated_at(&store, Category::Manga, "3", &iso_days_ago(60.0));

        let report = vec![
            item("5445", "Broken (OAV)"),
            item("1", "Skipped (live-action movie)"),
            item("2", "Fresh"),
            item("3", "Stale"),
            item("4", "Missing"),
        ];
        let skip = SkipList::from_keywords(&["live-action movie".to_string()]);
        let classifier = Classifier {
            category: Category::Manga,
            store: &store,
            skip: &skip,
            threshold_days: 30,
        };

        let result = classifier.classify(&report, now()).unwrap();
        assert_eq!(result.len(), report.len());

        let mut all_ids = BTreeSet::new();
        for bucket in [
            &result.exist,
            &result.missing,
            &result.outdated,
            &result.skipped,
            &result.broken,
        ] {
            for classified in bucket.iter() {
                assert!(all_ids.insert(classified.item.id.clone()));
            }
        }
        assert_eq!(all_ids.len(), report.len());

        assert_eq!(result.broken[0].item.id, "5445");
        assert_eq!(result.skipped[0].item.id, "1");
        assert_eq!(result.exist[0].item.id, "2");
        assert_eq!(result.outdated[0].item.id, "3");
        assert_eq!(result.missing[0].item.id, "4");
    }

    #[test]
    fn test_classification_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        write_entry_updated_at(&store, Category::Anime, "10", &iso_days_ago(5.0));

        let report = vec![item("10", "Fresh"), item("11", "Missing")];
        let skip = SkipList::default();
        let classifier = Classifier {
            category: Category::Anime,
            store: &store,
            skip: &skip,
            threshold_days: 30,
        };

        let first = classifier.classify(&report, now()).unwrap();
        let second = classifier.classify(&report, now()).unwrap();

        let ids = |bucket: &[Classified]| {
            bucket
                .iter()
                .map(|c| c.item.id.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(&first.exist), ids(&second.exist));
        assert_eq!(ids(&first.missing), ids(&second.missing));
        assert_eq!(ids(&first.outdated), ids(&second.outdated));
    }

    #[test]
    fn test_staleness_boundary_is_strict() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        write_entry_updated_at(&store, Category::Anime, "1", &iso_days_ago(30.0));
        write_entry_updated_at(&store, Category::Anime, "2", &iso_days_ago(30.1));

        let skip = SkipList::default();
        let classifier = Classifier {
            category: Category::Anime,
            store: &store,
            skip: &skip,
            threshold_days: 30,
        };

        let report = vec![item("1", "Exactly at threshold"), item("2", "Past threshold")];
        let result = classifier.classify(&report, now()).unwrap();

        assert_eq!(result.exist.len(), 1);
        assert_eq!(result.exist[0].item.id, "1");
        assert_eq!(result.outdated.len(), 1);
        assert_eq!(result.outdated[0].item.id, "2");
    }

    #[test]
    fn test_broken_precedes_skipped() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        // 5445 is on the manga broken list and its name matches the skip
        // keyword; the broken check wins.
        let report = vec![item("5445", "Something (OAV)")];
        let skip = SkipList::from_keywords(&["OAV".to_string()]);
        let classifier = Classifier {
            category: Category::Manga,
            store: &store,
            skip: &skip,
            threshold_days: 30,
        };

        let result = classifier.classify(&report, now()).unwrap();
        assert_eq!(result.broken.len(), 1);
        assert!(result.skipped.is_empty());
    }

    #[test]
    fn test_skip_keyword_matching() {
        let skip = SkipList::from_keywords(&["OAV".to_string(), "special".to_string()]);

        assert_eq!(
            skip.matched_keyword("Title (OAV 2nd series)").as_deref(),
            Some("OAV")
        );
        assert_eq!(
            skip.matched_keyword("Title (SPECIAL)").as_deref(),
            Some("SPECIAL")
        );
        // The marker must close at the end of the name.
        assert_eq!(skip.matched_keyword("Title (OAV) extras"), None);
        assert_eq!(skip.matched_keyword("Plain title"), None);
    }

    #[test]
    fn test_skip_list_loads_from_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("anime.json"),
            r#"["live-action movie", "musical"]"#,
        )
        .unwrap();

        let skip = SkipList::load(tmp.path(), Category::Anime);
        assert!(skip.matched_keyword("Show (musical)").is_some());
    }

    #[test]
    fn test_malformed_skip_list_degrades_to_empty() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("manga.json"), "not json").unwrap();

        let skip = SkipList::load(tmp.path(), Category::Manga);
        assert_eq!(skip.matched_keyword("Anything (OAV)"), None);
    }

    #[test]
    fn test_file_without_provenance_uses_mtime() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());
        // No +@date-last-updated-at key; the freshly-written file's mtime
        // keeps it in the exist bucket.
        store
            .write_entry(Category::Anime, "7", &json!({"+@id": "7"}))
            .unwrap();

        let skip = SkipList::default();
        let classifier = Classifier {
            category: Category::Anime,
            store: &store,
            skip: &skip,
            threshold_days: 30,
        };

        let result = classifier
            .classify(&[item("7", "Manual entry")], Utc::now())
            .unwrap();
        assert_eq!(result.exist.len(), 1);
    }
}
