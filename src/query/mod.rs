use serde::Serialize;

use crate::catalog::CatalogItem;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Artist,
    Album,
    Genre,
    Year,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [SortKey::Artist, SortKey::Album, SortKey::Genre, SortKey::Year];

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "artist" => Some(Self::Artist),
            "album" | "title" => Some(Self::Album),
            "genre" => Some(Self::Genre),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Artist => "artist",
            SortKey::Album => "album",
            SortKey::Genre => "genre",
            SortKey::Year => "year",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortKey::Artist => "Artist",
            SortKey::Album => "Album",
            SortKey::Genre => "Genre",
            SortKey::Year => "Year",
        }
    }

    fn field_text(&self, item: &CatalogItem) -> String {
        match self {
            SortKey::Artist => item.artist.to_lowercase(),
            SortKey::Album => item.album.to_lowercase(),
            SortKey::Genre => item.genre.to_lowercase(),
            SortKey::Year => item.year_text().to_lowercase(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SortSpec {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            key: SortKey::Artist,
            direction: SortDirection::Asc,
        }
    }
}

impl SortSpec {
    /// Header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    pub fn click(&mut self, key: SortKey) {
        if self.key == key {
            self.direction = self.direction.toggled();
        } else {
            self.key = key;
            self.direction = SortDirection::Asc;
        }
    }
}

pub fn normalize_query(query: &str) -> String {
    query.trim().to_lowercase()
}

pub fn item_matches(item: &CatalogItem, needle: &str) -> bool {
    item.artist.to_lowercase().contains(needle)
        || item.album.to_lowercase().contains(needle)
        || item.genre.to_lowercase().contains(needle)
}

pub fn filter_items<'a>(items: &'a [CatalogItem], query: &str) -> Vec<&'a CatalogItem> {
    let needle = normalize_query(query);
    if needle.is_empty() {
        return items.iter().collect();
    }
    items
        .iter()
        .filter(|item| item_matches(item, &needle))
        .collect()
}

// sort_by is stable, equal keys keep their relative order in both directions
pub fn sort_items(items: &mut Vec<&CatalogItem>, spec: SortSpec) {
    let mut keyed: Vec<(String, &CatalogItem)> = items
        .iter()
        .map(|item| (spec.key.field_text(item), *item))
        .collect();
    keyed.sort_by(|(a, _), (b, _)| match spec.direction {
        SortDirection::Asc => a.cmp(b),
        SortDirection::Desc => b.cmp(a),
    });
    *items = keyed.into_iter().map(|(_, item)| item).collect();
}

pub fn apply<'a>(items: &'a [CatalogItem], query: &str, spec: SortSpec) -> Vec<&'a CatalogItem> {
    let mut view = filter_items(items, query);
    sort_items(&mut view, spec);
    view
}
