use std::collections::HashSet;

use serde::{Deserialize, Serialize};

// an item id as found in the JSON resources. integer and text ids never compare equal,
// so 42 and "42" are different records.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

// the release year, which the sync job writes either as a number or as text
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum YearValue {
    Number(serde_json::Number),
    Text(String),
}

impl YearValue {
    /// Text shown in the year column and used as the sort key.
    /// Zero and empty text are treated as absent.
    pub fn display_text(&self) -> String {
        match self {
            YearValue::Number(n) => match n.as_f64() {
                Some(f) if f == 0.0 => String::new(),
                // 1973.0 reads as 1973
                Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => {
                    format!("{}", f as i64)
                }
                _ => n.to_string(),
            },
            YearValue::Text(s) => s.clone(),
        }
    }

    /// Leading-integer parse of the year. Returns `None` when nothing parses
    /// or the value is not strictly positive.
    pub fn known_year(&self) -> Option<i64> {
        let text = match self {
            YearValue::Number(n) => n.to_string(),
            YearValue::Text(s) => s.clone(),
        };
        parse_leading_int(&text).filter(|y| *y > 0)
    }
}

pub fn parse_leading_int(value: &str) -> Option<i64> {
    let trimmed = value.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let n: i64 = digits.parse().ok()?;
    Some(if negative { -n } else { n })
}

fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn nullable_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

fn nullable_items<'de, D>(deserializer: D) -> Result<Vec<CatalogItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<CatalogItem>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct CatalogItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default, deserialize_with = "nullable_string")]
    pub artist: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub album: String,
    #[serde(default, deserialize_with = "nullable_string")]
    pub genre: String,
    #[serde(default)]
    pub year: Option<YearValue>,
    #[serde(default, deserialize_with = "nullable_bool")]
    pub purchasing: bool,
}

impl CatalogItem {
    pub fn year_text(&self) -> String {
        self.year
            .as_ref()
            .map(YearValue::display_text)
            .unwrap_or_default()
    }

    pub fn known_year(&self) -> Option<i64> {
        self.year.as_ref().and_then(YearValue::known_year)
    }
}

// one JSON resource: the item list plus the time the sync job wrote it
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CatalogMeta {
    #[serde(default, deserialize_with = "nullable_items")]
    pub items: Vec<CatalogItem>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl CatalogMeta {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

/// Everything the loader produced. `collection_ids` is always rebuilt from
/// the collection it was constructed with.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    pub collection: Vec<CatalogItem>,
    pub wantlist: Vec<CatalogItem>,
    pub collection_updated_at: Option<String>,
    pub wantlist_updated_at: Option<String>,
    collection_ids: HashSet<ItemId>,
}

impl Catalog {
    pub fn new(collection: CatalogMeta, wantlist: Option<CatalogMeta>) -> Self {
        let collection_ids = collection
            .items
            .iter()
            .filter_map(|item| item.id.clone())
            .collect();
        let wantlist = wantlist.unwrap_or_default();
        Self {
            collection: collection.items,
            wantlist: wantlist.items,
            collection_updated_at: collection.updated_at,
            wantlist_updated_at: wantlist.updated_at,
            collection_ids,
        }
    }

    pub fn collection_ids(&self) -> &HashSet<ItemId> {
        &self.collection_ids
    }

    pub fn owns(&self, id: &ItemId) -> bool {
        self.collection_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty() && self.wantlist.is_empty()
    }
}
