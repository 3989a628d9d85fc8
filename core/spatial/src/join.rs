//! FILENAME: core/spatial/src/join.rs
//! PURPOSE: Left-merges boundary geometry onto pivoted rows.
//! CONTEXT: Rows are matched by the category CODE of the join dimension,
//! read from the row key rather than from a label column, so label
//! variants and dropped columns cannot break the join. Each code must map
//! to exactly one boundary; a code with several would fan rows out.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use cube::{log_debug, log_warn};
use pivot_engine::Table;

use crate::boundary::{BoundarySet, DEFAULT_KEY_PROPERTY};
use crate::error::{Result, SpatialError};

// ============================================================================
// OPTIONS
// ============================================================================

/// What to do with rows whose code has no boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmatchedPolicy {
    /// Fail with every unmatched code.
    Reject,
    /// Keep the rows without geometry. Still fails if no row matches.
    NullGeometry,
}

impl Default for UnmatchedPolicy {
    fn default() -> Self {
        UnmatchedPolicy::Reject
    }
}

impl fmt::Display for UnmatchedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnmatchedPolicy::Reject => "reject",
            UnmatchedPolicy::NullGeometry => "null_geometry",
        })
    }
}

impl FromStr for UnmatchedPolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "reject" => Ok(UnmatchedPolicy::Reject),
            "null_geometry" => Ok(UnmatchedPolicy::NullGeometry),
            _ => Err(format!(
                "Invalid unmatched policy '{}'. Valid options are: \"reject\", \"null_geometry\"",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinOptions {
    #[serde(default)]
    pub policy: UnmatchedPolicy,
    /// GeoJSON feature property holding the category code.
    #[serde(default = "default_key_property")]
    pub key_property: String,
}

fn default_key_property() -> String {
    DEFAULT_KEY_PROPERTY.to_string()
}

impl Default for JoinOptions {
    fn default() -> Self {
        JoinOptions {
            policy: UnmatchedPolicy::default(),
            key_property: default_key_property(),
        }
    }
}

impl JoinOptions {
    pub fn with_policy(mut self, policy: UnmatchedPolicy) -> Self {
        self.policy = policy;
        self
    }
}

// ============================================================================
// GEO TABLE
// ============================================================================

/// A table plus one optional geometry per row and the CRS tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoTable {
    table: Table,
    /// Distinct geometries referenced by rows.
    shapes: Vec<Value>,
    /// Per row, the index into `shapes`.
    row_shapes: Vec<Option<usize>>,
    crs: String,
    join_dimension: usize,
}

impl GeoTable {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    /// Cube index of the dimension the join was keyed on.
    pub fn join_dimension(&self) -> usize {
        self.join_dimension
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn geometry(&self, row: usize) -> Option<&Value> {
        self.row_shapes
            .get(row)
            .copied()
            .flatten()
            .map(|i| &self.shapes[i])
    }

    /// Number of rows with no geometry.
    pub fn unmatched_rows(&self) -> usize {
        self.row_shapes.iter().filter(|s| s.is_none()).count()
    }

    /// The table as a GeoJSON FeatureCollection, one feature per row.
    pub fn to_feature_collection(&self) -> Value {
        let features: Vec<Value> = self
            .table
            .to_records()
            .into_iter()
            .enumerate()
            .map(|(row, properties)| {
                json!({
                    "type": "Feature",
                    "properties": Value::Object(properties),
                    "geometry": self.geometry(row).cloned().unwrap_or(Value::Null),
                })
            })
            .collect();

        let mut collection = Map::new();
        collection.insert("type".to_string(), json!("FeatureCollection"));
        collection.insert(
            "crs".to_string(),
            json!({"type": "name", "properties": {"name": self.crs}}),
        );
        collection.insert("features".to_string(), Value::Array(features));
        Value::Object(collection)
    }
}

// ============================================================================
// JOIN
// ============================================================================

/// Attaches geometry to every row of `table`.
///
/// `join_dimension` names the dimension (code or label) whose category codes
/// key the join; by default it is the dimension the spatial link declares.
pub fn attach(
    table: &Table,
    boundaries: &BoundarySet,
    join_dimension: Option<&str>,
    options: &JoinOptions,
) -> Result<GeoTable> {
    let link = table
        .metadata()
        .spatial_link
        .as_ref()
        .ok_or(SpatialError::NoSpatialLink)?;
    let wanted = join_dimension.unwrap_or(&link.dimension);
    let dimension = table
        .dimensions()
        .iter()
        .position(|d| d.code == wanted || d.label == wanted)
        .filter(|d| table.row_dimensions().contains(d))
        .ok_or_else(|| SpatialError::MissingJoinDimension(wanted.to_string()))?;

    let index = boundaries.index();
    let mut shapes = Vec::new();
    let mut shape_of_boundary = vec![None; boundaries.len()];
    let mut row_shapes = Vec::with_capacity(table.len());
    let mut unmatched: Vec<String> = Vec::new();
    let mut seen_unmatched = FxHashSet::default();

    for row in 0..table.len() {
        let code = table
            .category_code(row, dimension)
            .ok_or_else(|| SpatialError::MissingJoinDimension(wanted.to_string()))?;
        match index.get(code).map(Vec::as_slice) {
            Some([single]) => {
                let shape = *shape_of_boundary[*single].get_or_insert_with(|| {
                    shapes.push(boundaries.boundaries()[*single].geometry.clone());
                    shapes.len() - 1
                });
                row_shapes.push(Some(shape));
            }
            Some(many) => {
                return Err(SpatialError::DataIntegrityError {
                    code: code.to_string(),
                    matches: many.len(),
                })
            }
            None => {
                if seen_unmatched.insert(code) {
                    unmatched.push(code.to_string());
                }
                row_shapes.push(None);
            }
        }
    }

    if !unmatched.is_empty() {
        let nothing_matched = shapes.is_empty();
        if options.policy == UnmatchedPolicy::Reject || nothing_matched {
            return Err(SpatialError::UnmatchedCategory { codes: unmatched });
        }
        log_warn!(
            "SPATIAL",
            "{} code(s) have no boundary and keep a null geometry: {}",
            unmatched.len(),
            unmatched.join(", ")
        );
    }

    log_debug!(
        "SPATIAL",
        "attached {} distinct geometries to {} rows (crs={})",
        shapes.len(),
        row_shapes.len(),
        boundaries.crs()
    );

    Ok(GeoTable {
        table: table.clone(),
        shapes,
        row_shapes,
        crs: boundaries.crs().to_string(),
        join_dimension: dimension,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_parses() {
        assert_eq!(
            "NULL_GEOMETRY".parse::<UnmatchedPolicy>(),
            Ok(UnmatchedPolicy::NullGeometry)
        );
        assert!("drop".parse::<UnmatchedPolicy>().is_err());
        assert_eq!(UnmatchedPolicy::default(), UnmatchedPolicy::Reject);
    }

    #[test]
    fn default_key_property_is_code() {
        assert_eq!(JoinOptions::default().key_property, "code");
    }
}
