//! Pipeline entry points for mirror operations.
//!
//! - `run_reports`: refresh category report listings
//! - `run_update`: fetch and merge missing or outdated encyclopedia entries

pub mod classify;
pub mod provenance;
mod report;
mod update;

pub use classify::{Classification, Classified, Classifier, SkipList, UpdateKind};
pub use report::run_reports;
pub use update::{UpdateOptions, run_update};
