//! FILENAME: core/catalogue/src/entry.rs
//! PURPOSE: Catalogue entries and the listing parsed from a collection payload.
//! CONTEXT: The collection response lists one JSON-stat dataset stub per
//! table under `link.item`. Each stub carries the table code, title,
//! dimension labels, the time dimension's categories and release flags.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use cube::jsonstat::STATISTIC_LABELS;
use cube::{log_debug, parse_timestamp, repair_text, sanitise_label};

use crate::error::{CatalogueError, Result};

/// One table in the catalogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    pub code: String,
    pub title: String,
    /// Dimension labels, statistic dimension excluded.
    pub variables: Vec<String>,
    pub time_variable: Option<String>,
    /// `"first - last"` time label, or a single label.
    pub date_range: Option<String>,
    pub updated: Option<DateTime<Utc>>,
    pub organisation: String,
    pub exceptional: bool,
}

/// Catalogue entries, most recently updated first once parsed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    entries: Vec<CatalogueEntry>,
}

impl Listing {
    pub fn new(entries: Vec<CatalogueEntry>) -> Self {
        Listing { entries }
    }

    /// Parses a collection payload. Items without a table code are skipped.
    pub fn from_collection(payload: &Value) -> Result<Listing> {
        let items = payload
            .get("link")
            .and_then(|link| link.get("item"))
            .and_then(Value::as_array)
            .ok_or_else(|| CatalogueError::MalformedListing("missing link.item array".into()))?;

        let mut entries: Vec<CatalogueEntry> = items.iter().filter_map(parse_item).collect();
        if entries.len() < items.len() {
            log_debug!(
                "CATALOGUE",
                "skipped {} collection item(s) without a table code",
                items.len() - entries.len()
            );
        }

        // Stable: entries without a timestamp sink to the end in payload order.
        entries.sort_by(|a, b| b.updated.cmp(&a.updated));
        Ok(Listing { entries })
    }

    /// Applies label sanitisation to variables and the time variable.
    pub fn sanitised(&self) -> Listing {
        let entries = self
            .entries
            .iter()
            .map(|entry| CatalogueEntry {
                variables: entry.variables.iter().map(|v| sanitise_label(v)).collect(),
                time_variable: entry.time_variable.as_deref().map(sanitise_label),
                ..entry.clone()
            })
            .collect();
        Listing { entries }
    }

    pub fn entries(&self) -> &[CatalogueEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<CatalogueEntry> {
        self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CatalogueEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry with the given table code, compared case-insensitively.
    pub fn get(&self, code: &str) -> Option<&CatalogueEntry> {
        self.entries.iter().find(|e| e.code.eq_ignore_ascii_case(code))
    }
}

impl FromIterator<CatalogueEntry> for Listing {
    fn from_iter<I: IntoIterator<Item = CatalogueEntry>>(iter: I) -> Self {
        Listing {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a CatalogueEntry;
    type IntoIter = std::slice::Iter<'a, CatalogueEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// ============================================================================
// ITEM PARSING
// ============================================================================

fn parse_item(item: &Value) -> Option<CatalogueEntry> {
    let extension = item.get("extension")?;
    let code = extension.get("matrix")?.as_str()?.to_string();
    let empty = Map::new();
    let dimensions = item
        .get("dimension")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let variables = dimensions
        .iter()
        .map(|(id, dim)| dimension_label(id, dim))
        .filter(|label| !STATISTIC_LABELS.contains(&label.as_str()))
        .collect();

    let time_dimension = item
        .pointer("/role/time/0")
        .and_then(Value::as_str)
        .and_then(|id| dimensions.get(id).map(|dim| (id, dim)));
    let time_variable = time_dimension.map(|(id, dim)| dimension_label(id, dim));
    let date_range = time_dimension.and_then(|(_, dim)| date_range(dim));

    Some(CatalogueEntry {
        code,
        title: repair_text(item.get("label").and_then(Value::as_str).unwrap_or_default()),
        variables,
        time_variable,
        date_range,
        updated: item
            .get("updated")
            .and_then(Value::as_str)
            .and_then(parse_timestamp),
        organisation: extension
            .pointer("/copyright/name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        exceptional: extension
            .get("exceptional")
            .and_then(Value::as_bool)
            .unwrap_or(false),
    })
}

fn dimension_label(id: &str, dimension: &Value) -> String {
    repair_text(dimension.get("label").and_then(Value::as_str).unwrap_or(id))
}

/// First and last category label of the time dimension, in index order
/// when an index is given.
fn date_range(dimension: &Value) -> Option<String> {
    let category = dimension.get("category")?;
    let labels = category.get("label").and_then(Value::as_object);
    let label_of = |code: &str| -> String {
        labels
            .and_then(|l| l.get(code))
            .and_then(Value::as_str)
            .unwrap_or(code)
            .to_string()
    };

    let ordered: Vec<String> = match category.get("index") {
        Some(Value::Array(codes)) => codes.iter().filter_map(Value::as_str).map(label_of).collect(),
        Some(Value::Object(positions)) => {
            let mut codes: Vec<(&String, u64)> = positions
                .iter()
                .filter_map(|(code, pos)| pos.as_u64().map(|p| (code, p)))
                .collect();
            codes.sort_by_key(|(_, p)| *p);
            codes.into_iter().map(|(code, _)| label_of(code)).collect()
        }
        _ => labels?
            .values()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
    };

    match ordered.as_slice() {
        [] => None,
        [only] => Some(only.clone()),
        [first, .., last] => Some(format!("{} - {}", first, last)),
    }
}
