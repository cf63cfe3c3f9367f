// src/models/mod.rs

//! Domain models for the mirror application.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod category;
mod config;
mod report;

// Re-export all public types
pub use category::Category;
pub use config::{ApiConfig, Config, HttpConfig};
pub use report::{ReportItem, SearchFields, SearchItem, combine_search_data};
