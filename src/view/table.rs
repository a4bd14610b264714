use std::collections::HashSet;

use serde::Serialize;

use crate::catalog::{CatalogItem, ItemId};
use crate::controller::ViewMode;
use crate::query::{SortDirection, SortKey, SortSpec};

pub const NO_RECORDS: &str = "No records found";
pub const LOAD_FAILED: &str = "Failed to load data.";
pub const PURCHASE_ONGOING: &str = "Purchase ongoing...";

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeaderCell {
    pub key: SortKey,
    pub label: String,
    pub sort: Option<SortDirection>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableRow {
    pub artist: String,
    pub album: String,
    pub genre: String,
    pub year: String,
    pub purchase_status: Option<String>,
    pub pending: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TableView {
    pub headers: Vec<HeaderCell>,
    pub rows: Vec<TableRow>,
    /// Single full-width row shown instead of `rows`.
    pub placeholder: Option<String>,
    pub count_label: String,
}

pub fn headers(sort: SortSpec) -> Vec<HeaderCell> {
    SortKey::ALL
        .iter()
        .map(|key| HeaderCell {
            key: *key,
            label: key.label().to_string(),
            sort: (sort.key == *key).then_some(sort.direction),
        })
        .collect()
}

pub fn count_label(n: usize, mode: ViewMode) -> String {
    let noun = if mode == ViewMode::Wantlist {
        "want"
    } else {
        "record"
    };
    let plural = if n == 1 { "" } else { "s" };
    format!("{n} {noun}{plural}")
}

/// A wantlist row is pending while it is flagged as being purchased and its
/// release has not shown up in the collection yet.
pub fn is_pending(item: &CatalogItem, mode: ViewMode, collection_ids: &HashSet<ItemId>) -> bool {
    mode == ViewMode::Wantlist
        && item.purchasing
        && item
            .id
            .as_ref()
            .map(|id| !collection_ids.contains(id))
            .unwrap_or(false)
}

pub fn build_row(item: &CatalogItem, pending: bool) -> TableRow {
    TableRow {
        artist: item.artist.clone(),
        album: item.album.clone(),
        genre: item.genre.clone(),
        year: item.year_text(),
        purchase_status: pending.then(|| PURCHASE_ONGOING.to_string()),
        pending,
    }
}

pub fn build_table(
    items: &[&CatalogItem],
    mode: ViewMode,
    collection_ids: &HashSet<ItemId>,
    sort: SortSpec,
) -> TableView {
    if items.is_empty() {
        return TableView {
            headers: headers(sort),
            rows: Vec::new(),
            placeholder: Some(NO_RECORDS.to_string()),
            count_label: count_label(0, mode),
        };
    }
    let rows = items
        .iter()
        .map(|item| build_row(item, is_pending(item, mode, collection_ids)))
        .collect();
    TableView {
        headers: headers(sort),
        rows,
        placeholder: None,
        count_label: count_label(items.len(), mode),
    }
}

pub fn failed_table(sort: SortSpec) -> TableView {
    TableView {
        headers: headers(sort),
        rows: Vec::new(),
        placeholder: Some(LOAD_FAILED.to_string()),
        count_label: String::new(),
    }
}
