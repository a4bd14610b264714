//! Genre and decade aggregation behind the stats dashboard.
//!
//! Every render recomputes the buckets from the loaded items; nothing here is
//! cached or persisted.

use std::collections::HashMap;

use serde::Serialize;

use crate::catalog::{Catalog, CatalogItem};

/// Bucket for blank genres, unparsable years and their decades.
pub const UNKNOWN_LABEL: &str = "Unknown";
/// Synthetic genre that absorbs everything past the top genres.
pub const OTHER_LABEL: &str = "Other";
pub const DEFAULT_TOP_GENRES: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsPolicy {
    pub top_genres: usize,
    pub unknown_label: String,
    pub other_label: String,
}

impl Default for StatsPolicy {
    fn default() -> Self {
        Self {
            top_genres: DEFAULT_TOP_GENRES,
            unknown_label: UNKNOWN_LABEL.to_string(),
            other_label: OTHER_LABEL.to_string(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatsSource {
    Collection,
    Wantlist,
    All,
}

impl StatsSource {
    pub const ALL: [StatsSource; 3] = [
        StatsSource::Collection,
        StatsSource::Wantlist,
        StatsSource::All,
    ];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "collection" => Some(Self::Collection),
            "wantlist" => Some(Self::Wantlist),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatsSource::Collection => "collection",
            StatsSource::Wantlist => "wantlist",
            StatsSource::All => "all",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StatsSource::Collection => "Collection",
            StatsSource::Wantlist => "Wantlist",
            StatsSource::All => "All",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StatsSource::Collection => "Collection",
            StatsSource::Wantlist => "Wantlist",
            StatsSource::All => "All records",
        }
    }

    pub fn items<'a>(&self, catalog: &'a Catalog) -> Vec<&'a CatalogItem> {
        match self {
            StatsSource::Collection => catalog.collection.iter().collect(),
            StatsSource::Wantlist => catalog.wantlist.iter().collect(),
            StatsSource::All => catalog
                .collection
                .iter()
                .chain(catalog.wantlist.iter())
                .collect(),
        }
    }
}

// insertion-ordered counter, first-seen order is the tie-break for rankings
#[derive(Clone, Debug, Default)]
pub struct Tally {
    order: Vec<(String, usize)>,
    index: HashMap<String, usize>,
}

impl Tally {
    pub fn add(&mut self, name: &str) {
        match self.index.get(name) {
            Some(&i) => self.order[i].1 += 1,
            None => {
                self.index.insert(name.to_string(), self.order.len());
                self.order.push((name.to_string(), 1));
            }
        }
    }

    pub fn entries(&self) -> &[(String, usize)] {
        &self.order
    }

    pub fn total(&self) -> usize {
        self.order.iter().map(|(_, c)| c).sum()
    }
}

/// genre -> decade -> count
#[derive(Clone, Debug, Default)]
pub struct GenreDecadeMatrix {
    rows: HashMap<String, HashMap<String, usize>>,
}

impl GenreDecadeMatrix {
    fn add(&mut self, genre: &str, decade: &str) {
        *self
            .rows
            .entry(genre.to_string())
            .or_default()
            .entry(decade.to_string())
            .or_insert(0) += 1;
    }

    pub fn get(&self, genre: &str, decade: &str) -> usize {
        self.rows
            .get(genre)
            .and_then(|row| row.get(decade))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Clone, Debug)]
pub struct StatsData {
    /// top genres by count, followed by the folded remainder if any
    pub genres: Vec<(String, usize)>,
    pub years: Vec<(String, usize)>,
    pub decades: Vec<(String, usize)>,
    pub matrix: GenreDecadeMatrix,
    pub total_genre_count: usize,
    pub max_genre_count: usize,
    pub max_decade_count: usize,
    pub max_cell_count: usize,
}

impl StatsData {
    pub fn heatmap_genres(&self) -> impl Iterator<Item = &str> {
        self.genres.iter().map(|(g, _)| g.as_str())
    }

    pub fn heatmap_decades(&self) -> impl Iterator<Item = &str> {
        self.decades.iter().map(|(d, _)| d.as_str())
    }
}

/// Genres carried by one item: trimmed comma-separated tokens with blanks and
/// the unknown label removed, or just the unknown label when nothing is left.
pub fn item_genres(genre: &str, policy: &StatsPolicy) -> Vec<String> {
    let genres: Vec<String> = genre
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != policy.unknown_label)
        .map(str::to_string)
        .collect();
    if genres.is_empty() {
        vec![policy.unknown_label.clone()]
    } else {
        genres
    }
}

/// `1973` -> `"70s"`. Only the last two digits of the decade are kept.
pub fn decade_label(year: i64) -> String {
    let start = year.div_euclid(10) * 10;
    let digits = start.to_string();
    let tail = if digits.len() > 2 {
        &digits[digits.len() - 2..]
    } else {
        digits.as_str()
    };
    format!("{tail}s")
}

// 50s..90s are the 1900s, anything below 50 wraps into the 2000s, unknown goes last
fn decade_rank(label: &str, unknown_label: &str) -> (u8, i64) {
    if label == unknown_label {
        return (2, 0);
    }
    match crate::catalog::parse_leading_int(label) {
        Some(n) if n < 50 => (0, 100 + n),
        Some(n) => (0, n),
        None => (1, 0),
    }
}

pub fn sort_decades(decades: &mut [(String, usize)], unknown_label: &str) {
    decades.sort_by_key(|(label, _)| decade_rank(label, unknown_label));
}

pub fn build_stats(items: &[&CatalogItem], policy: &StatsPolicy) -> StatsData {
    let mut genre_counts = Tally::default();
    let mut year_counts = Tally::default();
    let mut decade_counts = Tally::default();
    let mut matrix = GenreDecadeMatrix::default();

    for item in items {
        let (year_key, decade) = match item.known_year() {
            Some(year) => (year.to_string(), decade_label(year)),
            None => (policy.unknown_label.clone(), policy.unknown_label.clone()),
        };
        year_counts.add(&year_key);
        decade_counts.add(&decade);

        for genre in item_genres(&item.genre, policy) {
            genre_counts.add(&genre);
            matrix.add(&genre, &decade);
        }
    }

    let total_genre_count = genre_counts.total();

    let mut ranked = genre_counts.entries().to_vec();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let rest = if ranked.len() > policy.top_genres {
        ranked.split_off(policy.top_genres)
    } else {
        Vec::new()
    };
    let other_total: usize = rest.iter().map(|(_, c)| c).sum();
    let mut genres = ranked;
    if other_total > 0 {
        genres.push((policy.other_label.clone(), other_total));
    }

    let max_genre_count = genres.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);

    let mut decades = decade_counts.entries().to_vec();
    sort_decades(&mut decades, &policy.unknown_label);
    let max_decade_count = decades.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);

    let max_cell_count = itertools::iproduct!(genres.iter(), decades.iter())
        .map(|((g, _), (d, _))| matrix.get(g, d))
        .max()
        .unwrap_or(0)
        .max(1);

    StatsData {
        genres,
        years: year_counts.entries().to_vec(),
        decades,
        matrix,
        total_genre_count,
        max_genre_count,
        max_decade_count,
        max_cell_count,
    }
}

pub fn build_source_stats(catalog: &Catalog, source: StatsSource, policy: &StatsPolicy) -> StatsData {
    let items = source.items(catalog);
    build_stats(&items, policy)
}
