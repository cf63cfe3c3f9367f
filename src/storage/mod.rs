//! Local filesystem store for reports and encyclopedia entries.
//!
//! ## Storage Layout
//!
//! ```text
//! {reports_dir}/
//! └── {category}/
//!     └── report.json       # full listing, replaced wholesale
//! {encyclopedia_dir}/
//! └── {category}/
//!     └── {id}.json         # one entry per encyclopedia id
//! ```
//!
//! Files are pretty-printed with a 4-space indent and keep key order as
//! received from the API. Writes go through a temp file and rename so a
//! crash never leaves a half-written target.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::error::Result;
use crate::models::{Category, ReportItem};

/// A directory of per-category JSON files.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Create a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding one category's files.
    pub fn category_dir(&self, category: Category) -> PathBuf {
        self.root.join(category.tag())
    }

    /// Path of a category's report file.
    pub fn report_path(&self, category: Category) -> PathBuf {
        self.category_dir(category).join("report.json")
    }

    /// Path of one entry file.
    pub fn entry_path(&self, category: Category, id: &str) -> PathBuf {
        self.category_dir(category).join(format!("{id}.json"))
    }

    /// Write a category report, replacing any previous content.
    pub fn write_report(&self, category: Category, items: &[ReportItem]) -> Result<PathBuf> {
        let path = self.report_path(category);
        self.write_json(&path, items)?;
        Ok(path)
    }

    /// Read a category report.
    pub fn read_report(&self, category: Category) -> Result<Vec<ReportItem>> {
        let content = fs::read_to_string(self.report_path(category))?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write one entry, replacing any previous content.
    pub fn write_entry(&self, category: Category, id: &str, entry: &Value) -> Result<PathBuf> {
        let path = self.entry_path(category, id);
        self.write_json(&path, entry)?;
        Ok(path)
    }

    /// Read one entry file into a JSON value.
    pub fn read_entry(path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write pretty JSON atomically (write to temp, then rename).
    fn write_json<T: Serialize + ?Sized>(&self, path: &Path, value: &T) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let bytes = to_pretty_json(value)?;
        let tmp = path.with_extension("tmp");
        let mut file = File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.flush()?;
        drop(file);

        fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Serialize with a 4-space indent, matching the files already on disk.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SearchFields;
    use serde_json::json;
    use tempfile::TempDir;

    fn sample_items() -> Vec<ReportItem> {
        vec![ReportItem {
            id: "30".to_string(),
            name: Some("Trigun".to_string()),
            date_added: Some("2020-01-01T00:00:00Z".to_string()),
            search: Some(SearchFields::default()),
        }]
    }

    #[test]
    fn test_report_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let path = store.write_report(Category::Anime, &sample_items()).unwrap();
        assert_eq!(path, tmp.path().join("anime/report.json"));

        let loaded = store.read_report(Category::Anime).unwrap();
        assert_eq!(loaded, sample_items());
    }

    #[test]
    fn test_entry_write_and_read() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let entry = json!({"+@id": "30", "+@name": "Trigun"});
        let path = store.write_entry(Category::Anime, "30", &entry).unwrap();
        assert_eq!(path, store.entry_path(Category::Anime, "30"));

        let loaded = LocalStore::read_entry(&path).unwrap();
        assert_eq!(loaded, entry);
    }

    #[test]
    fn test_write_leaves_no_temp_file() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        store.write_report(Category::Manga, &sample_items()).unwrap();
        assert!(!store.category_dir(Category::Manga).join("report.tmp").exists());
    }

    #[test]
    fn test_pretty_json_uses_four_space_indent() {
        let bytes = to_pretty_json(&json!({"a": {"b": 1}})).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("\n    \"a\""));
        assert!(text.contains("\n        \"b\""));
    }

    #[test]
    fn test_pretty_json_preserves_key_order() {
        let value: Value = serde_json::from_str(r#"{"z": 1, "a": 2, "m": 3}"#).unwrap();
        let text = String::from_utf8(to_pretty_json(&value).unwrap()).unwrap();
        let z = text.find("\"z\"").unwrap();
        let a = text.find("\"a\"").unwrap();
        let m = text.find("\"m\"").unwrap();
        assert!(z < a && a < m);
    }

    #[test]
    fn test_read_missing_entry_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(LocalStore::read_entry(&tmp.path().join("nope.json")).is_err());
    }
}
