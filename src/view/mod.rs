//! Pure view models. Everything here maps loaded data and view state to a
//! renderable description; the `output` module turns that into text, JSON
//! or HTML.

pub mod stats;
pub mod table;

use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::controller::{Theme, ViewMode};

pub use stats::{StatsPanel, StatsView};
pub use table::{TableRow, TableView};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ToggleOption {
    pub value: String,
    pub label: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ScreenBody {
    Table(TableView),
    Stats(StatsView),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Screen {
    pub theme: Theme,
    pub view: ViewMode,
    pub views: Vec<ToggleOption>,
    pub last_updated: Option<String>,
    /// search box and sortable headers; hidden on the stats dashboard
    pub show_controls: bool,
    pub query: String,
    pub body: ScreenBody,
}

pub fn view_options(active: ViewMode) -> Vec<ToggleOption> {
    ViewMode::ALL
        .iter()
        .map(|mode| ToggleOption {
            value: mode.as_str().to_string(),
            label: mode.label().to_string(),
            active: *mode == active,
        })
        .collect()
}

pub fn format_last_updated_in<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let parsed = match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!("failed to format last updated '{raw}': {e}");
            return None;
        }
    };
    let local = parsed.with_timezone(tz);
    Some(format!(
        "Last updated: {}",
        local.format("%b %d, %Y, %H:%M:%S %Z")
    ))
}

/// "Last updated" indicator text in the local time zone, `None` when the
/// timestamp cannot be parsed.
pub fn format_last_updated(raw: &str) -> Option<String> {
    format_last_updated_in(raw, &Local)
}
