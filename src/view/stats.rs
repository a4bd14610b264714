use serde::Serialize;

use crate::stats::{StatsData, StatsSource};

use super::ToggleOption;

pub const NO_DATA: &str = "No data loaded yet.";

// heatmap cells interpolate linearly between these bounds by count / max cell
pub const HEATMAP_COLOR_PERCENT: (f64, f64) = (30.0, 100.0);
pub const HEATMAP_OPACITY: (f64, f64) = (0.35, 1.0);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GenreBar {
    pub name: String,
    pub count: usize,
    pub percent: u32,
    pub scale: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecadeBar {
    pub label: String,
    pub count: usize,
    pub scale: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapCell {
    pub count: usize,
    pub intensity: f64,
    pub color_percent: u32,
    pub opacity: f64,
}

impl HeatmapCell {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HeatmapRow {
    pub genre: String,
    pub cells: Vec<HeatmapCell>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Heatmap {
    pub decades: Vec<String>,
    pub rows: Vec<HeatmapRow>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StatsPanel {
    pub title: String,
    pub sources: Vec<ToggleOption>,
    pub genres: Vec<GenreBar>,
    pub decades: Vec<DecadeBar>,
    /// per release year in first-seen order, unknown years under one label
    pub years: Vec<YearCount>,
    pub heatmap: Heatmap,
    pub total_genre_count: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum StatsView {
    Empty { message: String },
    Ready(StatsPanel),
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn ratio(count: usize, max: usize) -> f64 {
    if max == 0 {
        0.0
    } else {
        count as f64 / max as f64
    }
}

pub fn heatmap_cell(count: usize, max_cell: usize) -> HeatmapCell {
    if count == 0 {
        return HeatmapCell {
            count,
            intensity: 0.0,
            color_percent: 0,
            opacity: 0.0,
        };
    }
    let intensity = ratio(count, max_cell);
    let (color_lo, color_hi) = HEATMAP_COLOR_PERCENT;
    let (alpha_lo, alpha_hi) = HEATMAP_OPACITY;
    HeatmapCell {
        count,
        intensity,
        color_percent: (color_lo + intensity * (color_hi - color_lo)).round() as u32,
        opacity: round_to(alpha_lo + intensity * (alpha_hi - alpha_lo), 2),
    }
}

pub fn source_options(active: StatsSource) -> Vec<ToggleOption> {
    StatsSource::ALL
        .iter()
        .map(|src| ToggleOption {
            value: src.as_str().to_string(),
            label: src.label().to_string(),
            active: *src == active,
        })
        .collect()
}

pub fn build_stats_panel(stats: &StatsData, source: StatsSource) -> StatsPanel {
    let genres = stats
        .genres
        .iter()
        .map(|(name, count)| {
            let percent = if stats.total_genre_count == 0 {
                0
            } else {
                (ratio(*count, stats.total_genre_count) * 100.0).round() as u32
            };
            GenreBar {
                name: name.clone(),
                count: *count,
                percent,
                scale: round_to(ratio(*count, stats.max_genre_count), 3),
            }
        })
        .collect();

    let decades = stats
        .decades
        .iter()
        .map(|(label, count)| DecadeBar {
            label: label.clone(),
            count: *count,
            scale: round_to(ratio(*count, stats.max_decade_count), 3),
        })
        .collect();

    let heatmap_decades: Vec<String> = stats.heatmap_decades().map(str::to_string).collect();
    let rows = stats
        .heatmap_genres()
        .map(|genre| HeatmapRow {
            genre: genre.to_string(),
            cells: heatmap_decades
                .iter()
                .map(|decade| heatmap_cell(stats.matrix.get(genre, decade), stats.max_cell_count))
                .collect(),
        })
        .collect();

    StatsPanel {
        title: format!("{} stats", source.title()),
        sources: source_options(source),
        genres,
        decades,
        years: stats
            .years
            .iter()
            .map(|(year, count)| YearCount {
                year: year.clone(),
                count: *count,
            })
            .collect(),
        heatmap: Heatmap {
            decades: heatmap_decades,
            rows,
        },
        total_genre_count: stats.total_genre_count,
    }
}

pub fn empty_stats() -> StatsView {
    StatsView::Empty {
        message: NO_DATA.to_string(),
    }
}
