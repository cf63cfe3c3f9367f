//! Encyclopedia category definitions.
//!
//! Every remote endpoint id, XML tag name, and per-category quirk lives in
//! this lookup table so the rest of the code can dispatch on a plain enum.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// An encyclopedia category served by the reports and detail APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Anime,
    Manga,
    Person,
    Company,
}

impl Category {
    /// All categories, in report-refresh order.
    pub const ALL: [Category; 4] = [
        Category::Anime,
        Category::Manga,
        Category::Company,
        Category::Person,
    ];

    /// Lowercase name, also the per-item XML tag in report listings and the
    /// grouping key in detail responses.
    pub fn tag(&self) -> &'static str {
        match self {
            Category::Anime => "anime",
            Category::Manga => "manga",
            Category::Person => "person",
            Category::Company => "company",
        }
    }

    /// Report id for the "recently added" listing endpoint.
    pub fn report_id(&self) -> u32 {
        match self {
            Category::Anime => 148,
            Category::Manga => 149,
            Category::Person => 150,
            Category::Company => 151,
        }
    }

    /// Whether a search-report listing (report id 155) exists for this
    /// category. It carries the gid/entry_type/precision/vintage fields.
    pub fn has_search_report(&self) -> bool {
        matches!(self, Category::Anime | Category::Manga)
    }

    /// Whether the listing must be fetched in pages. The person report
    /// returns HTTP 500 for `nlist=all`.
    pub fn paged(&self) -> bool {
        matches!(self, Category::Person)
    }

    /// Whether the detail API serves this category. Only anime and manga are
    /// reachable through the `title=` query parameter.
    pub fn has_detail_api(&self) -> bool {
        matches!(self, Category::Anime | Category::Manga)
    }

    /// Ids with known-invalid XML in the detail API, skipped up front.
    pub fn broken_ids(&self) -> &'static [u64] {
        match self {
            // 5445: illegal character code U+001A in the response body
            Category::Manga => &[5445],
            _ => &[],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
