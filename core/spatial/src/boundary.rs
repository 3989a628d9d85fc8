//! FILENAME: core/spatial/src/boundary.rs
//! PURPOSE: Boundary files keyed by category code.
//! CONTEXT: Boundaries usually arrive as a GeoJSON FeatureCollection whose
//! features carry the category code in a property (default `code`).
//! Geometry is kept as the raw GeoJSON object: nothing here reads
//! coordinates, and the CRS is passed through as declared.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cube::log_warn;

use crate::error::{Result, SpatialError};

/// WGS84, assumed when a boundary file declares no CRS.
pub const DEFAULT_CRS: &str = "EPSG:4326";

/// Property holding the join code when no other is configured.
pub const DEFAULT_KEY_PROPERTY: &str = "code";

/// One geometry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    pub code: String,
    pub geometry: Value,
}

/// The geometry source of a spatial join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundarySet {
    boundaries: Vec<Boundary>,
    crs: String,
}

impl BoundarySet {
    pub fn new(boundaries: Vec<Boundary>, crs: impl Into<String>) -> Self {
        BoundarySet {
            boundaries,
            crs: crs.into(),
        }
    }

    /// Reads a GeoJSON FeatureCollection, taking each feature's code from
    /// `properties[key_property]`. Features without that property are skipped.
    pub fn from_geojson(geojson: &Value, key_property: &str) -> Result<Self> {
        if geojson.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
            return Err(SpatialError::MalformedBoundaries(
                "expected a GeoJSON FeatureCollection".to_string(),
            ));
        }
        let features = geojson
            .get("features")
            .and_then(Value::as_array)
            .filter(|f| !f.is_empty())
            .ok_or_else(|| {
                SpatialError::MalformedBoundaries("no features found in GeoJSON data".to_string())
            })?;

        let mut boundaries = Vec::with_capacity(features.len());
        let mut skipped = 0;
        for feature in features {
            let code = match feature.get("properties").and_then(|p| p.get(key_property)) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Number(n)) => n.to_string(),
                _ => {
                    skipped += 1;
                    continue;
                }
            };
            boundaries.push(Boundary {
                code,
                geometry: feature.get("geometry").cloned().unwrap_or(Value::Null),
            });
        }

        if boundaries.is_empty() {
            return Err(SpatialError::MalformedBoundaries(format!(
                "no feature has a '{}' property",
                key_property
            )));
        }
        if skipped > 0 {
            log_warn!(
                "SPATIAL",
                "skipped {} feature(s) without a '{}' property",
                skipped,
                key_property
            );
        }
        Ok(BoundarySet::new(boundaries, detect_crs(geojson)))
    }

    pub fn crs(&self) -> &str {
        &self.crs
    }

    pub fn boundaries(&self) -> &[Boundary] {
        &self.boundaries
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Positions of the boundaries carrying each code.
    pub(crate) fn index(&self) -> FxHashMap<&str, Vec<usize>> {
        let mut index: FxHashMap<&str, Vec<usize>> = FxHashMap::default();
        for (i, b) in self.boundaries.iter().enumerate() {
            index.entry(b.code.as_str()).or_default().push(i);
        }
        index
    }
}

impl FromIterator<(String, Value)> for BoundarySet {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let boundaries = iter
            .into_iter()
            .map(|(code, geometry)| Boundary { code, geometry })
            .collect();
        BoundarySet::new(boundaries, DEFAULT_CRS)
    }
}

/// CRS declared by a GeoJSON document: `crs.properties.name`, then
/// `crs.name`, else WGS84.
pub fn detect_crs(geojson: &Value) -> String {
    let crs = geojson.get("crs");
    crs.and_then(|c| c.get("properties"))
        .and_then(|p| p.get("name"))
        .or_else(|| crs.and_then(|c| c.get("name")))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_CRS)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_feature_collection() {
        let geojson = json!({
            "type": "FeatureCollection",
            "crs": {"type": "name", "properties": {"name": "urn:ogc:def:crs:EPSG::2157"}},
            "features": [
                {"type": "Feature", "properties": {"code": "01"}, "geometry": {"type": "Point", "coordinates": [0, 0]}},
                {"type": "Feature", "properties": {"code": 2}, "geometry": null},
                {"type": "Feature", "properties": {"name": "no code"}, "geometry": null}
            ]
        });
        let set = BoundarySet::from_geojson(&geojson, DEFAULT_KEY_PROPERTY).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.boundaries()[1].code, "2");
        assert_eq!(set.crs(), "urn:ogc:def:crs:EPSG::2157");
    }

    #[test]
    fn crs_falls_back_to_wgs84() {
        assert_eq!(detect_crs(&json!({"crs": {"name": "EPSG:3857"}})), "EPSG:3857");
        assert_eq!(detect_crs(&json!({})), DEFAULT_CRS);
    }

    #[test]
    fn rejects_empty_or_foreign_documents() {
        let empty = json!({"type": "FeatureCollection", "features": []});
        assert!(matches!(
            BoundarySet::from_geojson(&empty, "code"),
            Err(SpatialError::MalformedBoundaries(_))
        ));
        let point = json!({"type": "Point", "coordinates": [0, 0]});
        assert!(BoundarySet::from_geojson(&point, "code").is_err());
    }
}
