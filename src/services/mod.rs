//! Service layer for the mirror application.
//!
//! This module contains the HTTP-facing logic:
//! - Report listing fetching (`ReportFetcher`)
//! - Encyclopedia entry fetching (`EntryFetcher`)

mod entries;
mod reports;

pub use entries::{EntryFetcher, select_category_entries};
pub use reports::ReportFetcher;
