//! Report item data structures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One row of a category report listing.
///
/// The search fields are flattened into the same JSON object for anime and
/// manga reports and absent entirely for person and company reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportItem {
    /// Encyclopedia id, extracted from the listing's `href` attribute
    pub id: String,

    /// Display name (missing for a handful of unnamed entries)
    pub name: Option<String>,

    /// Date the entry was added to the encyclopedia, UTC ISO-8601 with a
    /// trailing `Z`; null when the API serves a malformed date
    pub date_added: Option<String>,

    /// Extra fields merged in from the search report (anime/manga only)
    #[serde(flatten)]
    pub search: Option<SearchFields>,
}

impl ReportItem {
    /// Numeric form of the id, when it parses.
    pub fn numeric_id(&self) -> Option<u64> {
        self.id.parse().ok()
    }
}

/// Fields carried by the search report (report id 155).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchFields {
    pub gid: Option<String>,
    pub entry_type: Option<String>,
    pub precision: Option<String>,
    pub vintage: Option<String>,
}

/// One row of the search report listing, keyed by the same ids as the
/// common listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchItem {
    pub id: Option<String>,
    pub gid: Option<String>,
    pub entry_type: Option<String>,
    pub name: Option<String>,
    pub precision: Option<String>,
    pub vintage: Option<String>,
}

/// Left-merge search fields into the common listing by id.
///
/// Every common item keeps its own name and date; ids absent from the search
/// report get all-null search fields.
pub fn combine_search_data(common: Vec<ReportItem>, search: Vec<SearchItem>) -> Vec<ReportItem> {
    let by_id: HashMap<&str, &SearchItem> = search
        .iter()
        .filter_map(|item| item.id.as_deref().map(|id| (id, item)))
        .collect();

    common
        .into_iter()
        .map(|mut item| {
            let fields = match by_id.get(item.id.as_str()) {
                Some(found) => SearchFields {
                    gid: found.gid.clone(),
                    entry_type: found.entry_type.clone(),
                    precision: found.precision.clone(),
                    vintage: found.vintage.clone(),
                },
                None => SearchFields::default(),
            };
            item.search = Some(fields);
            item
        })
        .collect()
}
