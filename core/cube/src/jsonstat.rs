//! FILENAME: core/cube/src/jsonstat.rs
//! PURPOSE: The Dimension Index. Turns a JSON-stat 2.0 dataset payload into a `Cube`.
//! CONTEXT: The payload declares dimension order in `id`, cardinalities in
//! `size`, each dimension's categories under `dimension.{id}.category`, and
//! the observations in `value` (a dense array or a sparse object keyed by
//! flat index). Any structural inconsistency is a `MalformedPayload`; the
//! parser never truncates, pads or partially processes a payload.
//!
//! SUPPORTED FIELDS:
//! - category.index as an array of codes or an object of code -> position
//! - category.label (code -> label), category.unit (code -> {label, decimals})
//! - link.enclosure[0].href on a dimension (spatial boundary link)
//! - role.time / role.geo / role.metric
//! - label, updated, note, extension.{matrix, contact, copyright, reasons, flags}

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::error::{CubeError, Result};
use crate::metadata::{
    Contact, Copyright, CubeMetadata, SpatialLink, Unit, GEOGRAPHIC_TAG, TAG_FLAGS,
};
use crate::model::{Category, Cube, Dimension, Observation, Roles};
use crate::radix::RadixIndex;
use crate::text::{clean_note, repair_text};

/// Names the statistic dimension goes by when no `role.metric` is declared.
pub const STATISTIC_LABELS: &[&str] = &["Statistic", "STATISTIC"];

/// Canonical label for the statistic dimension.
pub const STATISTIC_LABEL: &str = "Statistic";

/// Largest cell count a payload may declare. Sparse `value` objects are
/// expanded to the full product, so the check runs before any allocation.
pub const MAX_CELLS: usize = 20_000_000;

// ============================================================================
// ENTRY POINT
// ============================================================================

/// Parses a JSON-stat dataset payload into a validated cube.
pub fn parse(payload: &Value) -> Result<Cube> {
    let root = payload
        .as_object()
        .ok_or_else(|| CubeError::malformed("payload is not a JSON object"))?;

    let ids = parse_ids(root)?;
    let sizes = parse_sizes(root)?;
    if ids.len() != sizes.len() {
        return Err(CubeError::malformed(format!(
            "'id' declares {} dimensions but 'size' declares {}",
            ids.len(),
            sizes.len()
        )));
    }

    let raw_dimensions = root
        .get("dimension")
        .and_then(Value::as_object)
        .ok_or_else(|| CubeError::malformed("missing 'dimension' object"))?;

    let mut dimensions = Vec::with_capacity(ids.len());
    for (id, &size) in ids.iter().zip(&sizes) {
        let raw = raw_dimensions.get(id).ok_or_else(|| {
            CubeError::malformed(format!("dimension '{}' is listed in 'id' but not described", id))
        })?;
        let dimension = parse_dimension(id, raw)?;
        if dimension.len() != size {
            return Err(CubeError::malformed(format!(
                "dimension '{}' declares size {} but has {} categories",
                id,
                size,
                dimension.len()
            )));
        }
        dimensions.push(dimension);
    }

    let radix = RadixIndex::new(&sizes)
        .ok_or_else(|| CubeError::malformed("dimension sizes overflow"))?;
    if radix.len() > MAX_CELLS {
        return Err(CubeError::malformed(format!(
            "dimension sizes {:?} declare {} cells, above the limit of {}",
            sizes,
            radix.len(),
            MAX_CELLS
        )));
    }
    let values = parse_values(root.get("value"), radix.len())?;

    let spatial_link = find_spatial_link(&ids, raw_dimensions, &dimensions);
    let roles = resolve_roles(root, &ids, &dimensions, spatial_link.as_ref())?;
    let metadata = parse_metadata(root, raw_dimensions, &dimensions, roles, spatial_link);

    let cube = Cube::new(dimensions, values, roles, metadata)?;
    log_debug!(
        "CUBE",
        "parsed table={} dims={} values={}",
        cube.metadata().table_code.as_deref().unwrap_or("?"),
        cube.dimensions().len(),
        cube.values().len()
    );
    Ok(cube)
}

// ============================================================================
// STRUCTURE
// ============================================================================

fn parse_ids(root: &Map<String, Value>) -> Result<Vec<String>> {
    let ids = root
        .get("id")
        .and_then(Value::as_array)
        .ok_or_else(|| CubeError::malformed("missing 'id' array"))?;
    ids.iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| CubeError::malformed(format!("non-string dimension id {}", v)))
        })
        .collect()
}

fn parse_sizes(root: &Map<String, Value>) -> Result<Vec<usize>> {
    let sizes = root
        .get("size")
        .and_then(Value::as_array)
        .ok_or_else(|| CubeError::malformed("missing 'size' array"))?;
    sizes
        .iter()
        .map(|v| {
            v.as_u64()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| CubeError::malformed(format!("invalid dimension size {}", v)))
        })
        .collect()
}

fn parse_dimension(id: &str, raw: &Value) -> Result<Dimension> {
    let raw = raw
        .as_object()
        .ok_or_else(|| CubeError::malformed(format!("dimension '{}' is not an object", id)))?;

    let label = raw
        .get("label")
        .and_then(Value::as_str)
        .map(repair_text)
        .unwrap_or_else(|| id.to_string());
    let label = if label == "STATISTIC" {
        STATISTIC_LABEL.to_string()
    } else {
        label
    };

    let category = raw
        .get("category")
        .and_then(Value::as_object)
        .ok_or_else(|| CubeError::malformed(format!("dimension '{}' has no category object", id)))?;
    let labels = category.get("label").and_then(Value::as_object);

    let codes = match category.get("index") {
        Some(Value::Array(items)) => items
            .iter()
            .map(|v| {
                v.as_str().map(str::to_string).ok_or_else(|| {
                    CubeError::malformed(format!("dimension '{}' has a non-string category code", id))
                })
            })
            .collect::<Result<Vec<_>>>()?,
        Some(Value::Object(positions)) => codes_from_positions(id, positions)?,
        Some(other) => {
            return Err(CubeError::malformed(format!(
                "dimension '{}' has an invalid category index {}",
                id, other
            )))
        }
        // Without an index, category order is the order of the label object.
        None => match labels {
            Some(labels) => labels.keys().cloned().collect(),
            None => {
                return Err(CubeError::malformed(format!(
                    "dimension '{}' has neither category index nor labels",
                    id
                )))
            }
        },
    };

    let categories = codes
        .into_iter()
        .map(|code| {
            let label = labels
                .and_then(|l| l.get(&code))
                .and_then(Value::as_str)
                .map(repair_text)
                .unwrap_or_else(|| code.clone());
            Category { code, label }
        })
        .collect();

    Ok(Dimension::new(id, label, categories))
}

/// Orders codes from an object-form index (`{"code": position}`).
/// Positions must form exactly `0..n`.
fn codes_from_positions(id: &str, positions: &Map<String, Value>) -> Result<Vec<String>> {
    let mut slots: Vec<Option<String>> = vec![None; positions.len()];
    for (code, pos) in positions {
        let pos = pos
            .as_u64()
            .and_then(|p| usize::try_from(p).ok())
            .filter(|&p| p < slots.len())
            .ok_or_else(|| {
                CubeError::malformed(format!(
                    "dimension '{}' category '{}' has invalid position {}",
                    id, code, pos
                ))
            })?;
        if slots[pos].replace(code.clone()).is_some() {
            return Err(CubeError::malformed(format!(
                "dimension '{}' assigns position {} twice",
                id, pos
            )));
        }
    }
    // Every slot is filled: n unique positions below n.
    Ok(slots.into_iter().flatten().collect())
}

// ============================================================================
// VALUES
// ============================================================================

fn parse_values(raw: Option<&Value>, expected: usize) -> Result<Vec<Observation>> {
    match raw {
        Some(Value::Array(items)) => {
            if items.len() != expected {
                return Err(CubeError::malformed(format!(
                    "dimension sizes multiply to {} but 'value' has {} entries",
                    expected,
                    items.len()
                )));
            }
            items.iter().map(parse_observation).collect()
        }
        Some(Value::Object(sparse)) => {
            let mut values = vec![None; expected];
            for (key, raw) in sparse {
                let offset = key
                    .parse::<usize>()
                    .ok()
                    .filter(|&o| o < expected)
                    .ok_or_else(|| {
                        CubeError::malformed(format!(
                            "sparse value key '{}' is outside 0..{}",
                            key, expected
                        ))
                    })?;
                values[offset] = parse_observation(raw)?;
            }
            Ok(values)
        }
        Some(other) => Err(CubeError::malformed(format!(
            "'value' must be an array or object, found {}",
            other
        ))),
        None => Err(CubeError::malformed("missing 'value'")),
    }
}

/// Numbers and numeric strings are observations; `null` and status strings
/// such as ".." are the missing sentinel.
fn parse_observation(raw: &Value) -> Result<Observation> {
    match raw {
        Value::Null => Ok(None),
        Value::Number(n) => Ok(n.as_f64().filter(|v| v.is_finite())),
        Value::String(s) => Ok(s.trim().parse::<f64>().ok().filter(|v| v.is_finite())),
        other => Err(CubeError::malformed(format!(
            "unsupported value entry {}",
            other
        ))),
    }
}

// ============================================================================
// ROLES & METADATA
// ============================================================================

fn find_spatial_link(
    ids: &[String],
    raw_dimensions: &Map<String, Value>,
    dimensions: &[Dimension],
) -> Option<SpatialLink> {
    ids.iter().zip(dimensions).find_map(|(id, dim)| {
        let href = raw_dimensions
            .get(id)?
            .get("link")?
            .get("enclosure")?
            .get(0)?
            .get("href")?
            .as_str()?;
        Some(SpatialLink {
            url: href.to_string(),
            dimension: id.clone(),
            dimension_label: dim.label.clone(),
        })
    })
}

fn resolve_roles(
    root: &Map<String, Value>,
    ids: &[String],
    dimensions: &[Dimension],
    spatial_link: Option<&SpatialLink>,
) -> Result<Roles> {
    let role = root.get("role").and_then(Value::as_object);
    let declared = |name: &str| -> Result<Option<usize>> {
        let Some(entries) = role.and_then(|r| r.get(name)).and_then(Value::as_array) else {
            return Ok(None);
        };
        if entries.len() > 1 {
            log_warn!(
                "CUBE",
                "role '{}' lists {} dimensions, using the first",
                name,
                entries.len()
            );
        }
        match entries.first().and_then(Value::as_str) {
            Some(id) => ids.iter().position(|d| d == id).map(Some).ok_or_else(|| {
                CubeError::malformed(format!("role '{}' names unknown dimension '{}'", name, id))
            }),
            None => Ok(None),
        }
    };

    let time = declared("time")?;
    let statistic = match declared("metric")? {
        Some(i) => Some(i),
        None => dimensions.iter().position(|d| {
            STATISTIC_LABELS.contains(&d.code.as_str()) || STATISTIC_LABELS.contains(&d.label.as_str())
        }),
    };
    let geographic = match declared("geo")? {
        Some(i) => Some(i),
        None => spatial_link.and_then(|link| ids.iter().position(|d| *d == link.dimension)),
    };

    Ok(Roles {
        time,
        geographic,
        statistic,
    })
}

fn parse_metadata(
    root: &Map<String, Value>,
    raw_dimensions: &Map<String, Value>,
    dimensions: &[Dimension],
    roles: Roles,
    spatial_link: Option<SpatialLink>,
) -> CubeMetadata {
    let empty = Map::new();
    let extension = root
        .get("extension")
        .and_then(Value::as_object)
        .unwrap_or(&empty);

    let text = |obj: &Map<String, Value>, key: &str| -> Option<String> {
        obj.get(key).and_then(Value::as_str).map(repair_text)
    };
    let flag = |key: &str| extension.get(key).and_then(Value::as_bool).unwrap_or(false);

    let contact = extension
        .get("contact")
        .and_then(Value::as_object)
        .map(|c| Contact {
            name: text(c, "name"),
            email: text(c, "email"),
            phone: text(c, "phone"),
        })
        .unwrap_or_default();

    let copyright = extension
        .get("copyright")
        .and_then(Value::as_object)
        .map(|c| Copyright {
            name: text(c, "name"),
            href: text(c, "href"),
        })
        .unwrap_or_default();

    let notes = root
        .get("note")
        .and_then(Value::as_array)
        .map(|notes| {
            notes
                .iter()
                .filter_map(Value::as_str)
                .filter(|n| !n.trim().is_empty())
                .map(|n| clean_note(&repair_text(n)))
                .collect()
        })
        .unwrap_or_default();

    let reasons = extension
        .get("reasons")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).map(repair_text).collect())
        .unwrap_or_default();

    let mut tags: Vec<String> = TAG_FLAGS
        .iter()
        .filter(|(key, _)| flag(key))
        .map(|(_, tag)| tag.to_string())
        .collect();
    if spatial_link.is_some() {
        tags.push(GEOGRAPHIC_TAG.to_string());
    }

    let units = roles
        .statistic
        .map(|i| parse_units(raw_dimensions, &dimensions[i]))
        .unwrap_or_default();

    let last_updated = root.get("updated").and_then(Value::as_str).and_then(|raw| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            log_warn!("CUBE", "unparseable 'updated' timestamp '{}'", raw);
        }
        parsed
    });

    CubeMetadata {
        table_code: text(extension, "matrix"),
        title: text(root, "label"),
        last_updated,
        notes,
        tags,
        reasons,
        contact,
        copyright,
        exceptional: flag("exceptional"),
        units,
        spatial_link,
    }
}

fn parse_units(raw_dimensions: &Map<String, Value>, statistic: &Dimension) -> Vec<(String, Unit)> {
    let Some(units) = raw_dimensions
        .get(&statistic.code)
        .and_then(|d| d.get("category"))
        .and_then(|c| c.get("unit"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    statistic
        .categories
        .iter()
        .filter_map(|cat| {
            let unit = units.get(&cat.code)?;
            let label = unit.get("label").and_then(Value::as_str)?;
            let decimals = unit
                .get("decimals")
                .and_then(Value::as_u64)
                .and_then(|d| u32::try_from(d).ok());
            Some((
                cat.code.clone(),
                Unit {
                    label: repair_text(label),
                    decimals,
                },
            ))
        })
        .collect()
}

/// Accepts RFC 3339, naive `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC) and bare dates.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DimensionRole;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "class": "dataset",
            "label": "Population by County┴",
            "updated": "2023-06-01T11:00:00Z",
            "note": ["[b]Source:[/b] Census"],
            "id": ["STATISTIC", "TLIST(A1)", "C02196V02652"],
            "size": [2, 2, 3],
            "role": {"time": ["TLIST(A1)"], "metric": ["STATISTIC"]},
            "dimension": {
                "STATISTIC": {
                    "label": "STATISTIC",
                    "category": {
                        "index": ["POP", "PCT"],
                        "label": {"POP": "Population", "PCT": "Percentage"},
                        "unit": {
                            "POP": {"label": "Number", "decimals": 0},
                            "PCT": {"label": "%", "decimals": 1}
                        }
                    }
                },
                "TLIST(A1)": {
                    "label": "Census Year",
                    "category": {"index": {"2016": 0, "2022": 1}, "label": {"2016": "2016", "2022": "2022"}}
                },
                "C02196V02652": {
                    "label": "County",
                    "category": {
                        "index": ["IE0", "01", "02"],
                        "label": {"IE0": "State", "01": "Carlow", "02": "Dublin"}
                    },
                    "link": {"enclosure": [{"type": "application/json", "href": "https://example.org/counties.geojson"}]}
                }
            },
            "value": [1, 2, 3, 4, 5, 6, 0.5, null, "..", "7", 8, 9],
            "extension": {
                "matrix": "FY003A",
                "official": true,
                "copyright": {"name": "Central Statistics Office, Ireland", "href": "https://www.cso.ie"},
                "contact": {"name": "Census", "email": "census@cso.ie", "phone": "+353"}
            }
        })
    }

    #[test]
    fn parses_structure_and_roles() {
        let cube = parse(&sample()).unwrap();
        assert_eq!(cube.dimensions().len(), 3);
        assert_eq!(cube.values().len(), 12);
        assert_eq!(cube.dimensions()[0].label, "Statistic");
        assert_eq!(cube.roles().time, Some(1));
        assert_eq!(cube.roles().statistic, Some(0));
        assert_eq!(cube.roles().geographic, Some(2));
        assert_eq!(
            cube.role_dimension(DimensionRole::Geographic).map(|d| d.code.as_str()),
            Some("C02196V02652")
        );
    }

    #[test]
    fn missing_values_stay_distinct_from_zero() {
        let cube = parse(&sample()).unwrap();
        assert_eq!(cube.values()[6], Some(0.5));
        assert_eq!(cube.values()[7], None);
        assert_eq!(cube.values()[8], None);
        assert_eq!(cube.values()[9], Some(7.0));
    }

    #[test]
    fn object_index_orders_by_position() {
        let mut payload = sample();
        payload["dimension"]["TLIST(A1)"]["category"]["index"] = json!({"2022": 1, "2016": 0});
        let cube = parse(&payload).unwrap();
        let codes: Vec<&str> = cube.dimensions()[1].codes().collect();
        assert_eq!(codes, vec!["2016", "2022"]);
    }

    #[test]
    fn extracts_metadata() {
        let cube = parse(&sample()).unwrap();
        let meta = cube.metadata();
        assert_eq!(meta.table_code.as_deref(), Some("FY003A"));
        assert_eq!(meta.title.as_deref(), Some("Population by CountyÁ"));
        assert_eq!(meta.notes, vec!["Source: Census".to_string()]);
        assert_eq!(
            meta.tags,
            vec!["Official Statistics".to_string(), "Geographic Data".to_string()]
        );
        assert_eq!(meta.unit("PCT").map(|u| u.label.as_str()), Some("%"));
        assert_eq!(meta.unit("PCT").and_then(|u| u.decimals), Some(1));
        assert_eq!(meta.contact.email.as_deref(), Some("census@cso.ie"));
        let link = meta.spatial_link.as_ref().unwrap();
        assert_eq!(link.url, "https://example.org/counties.geojson");
        assert_eq!(link.dimension_label, "County");
        assert!(meta.last_updated.is_some());
    }

    #[test]
    fn size_mismatch_is_malformed() {
        let mut payload = sample();
        payload["value"] = json!([1, 2, 3]);
        assert!(matches!(parse(&payload), Err(CubeError::MalformedPayload(_))));

        let mut payload = sample();
        payload["size"] = json!([2, 2, 4]);
        assert!(matches!(parse(&payload), Err(CubeError::MalformedPayload(_))));
    }

    #[test]
    fn sparse_values_fill_missing() {
        let mut payload = sample();
        payload["value"] = json!({"0": 10, "11": 20});
        let cube = parse(&payload).unwrap();
        assert_eq!(cube.values()[0], Some(10.0));
        assert_eq!(cube.values()[5], None);
        assert_eq!(cube.values()[11], Some(20.0));

        payload["value"] = json!({"12": 1});
        assert!(matches!(parse(&payload), Err(CubeError::MalformedPayload(_))));
    }

    #[test]
    fn oversized_sparse_payload_is_malformed() {
        let codes: Vec<String> = (0..300).map(|i| i.to_string()).collect();
        let dimension = json!({"label": "Big", "category": {"index": codes}});
        let payload = json!({
            "id": ["A", "B", "C"],
            "size": [300, 300, 300],
            "dimension": {"A": dimension.clone(), "B": dimension.clone(), "C": dimension},
            "value": {"0": 1}
        });
        match parse(&payload) {
            Err(CubeError::MalformedPayload(msg)) => assert!(msg.contains("limit"), "{}", msg),
            other => panic!("expected MalformedPayload, got {:?}", other.map(|c| c.values().len())),
        }
    }

    #[test]
    fn duplicate_index_position_is_malformed() {
        let mut payload = sample();
        payload["dimension"]["TLIST(A1)"]["category"]["index"] = json!({"2016": 0, "2022": 0});
        assert!(matches!(parse(&payload), Err(CubeError::MalformedPayload(_))));
    }

    #[test]
    fn statistic_found_by_label_without_metric_role() {
        let mut payload = sample();
        payload["role"] = json!({"time": ["TLIST(A1)"]});
        let cube = parse(&payload).unwrap();
        assert_eq!(cube.roles().statistic, Some(0));
    }

    #[test]
    fn labels_default_to_codes() {
        let mut payload = sample();
        payload["dimension"]["C02196V02652"]["category"]["label"] = json!({"IE0": "State"});
        let cube = parse(&payload).unwrap();
        assert_eq!(cube.dimensions()[2].categories[1].label, "01");
    }

    #[test]
    fn parses_timestamp_variants() {
        assert!(parse_timestamp("2023-06-01T11:00:00Z").is_some());
        assert!(parse_timestamp("2023-06-01T11:00:00").is_some());
        assert!(parse_timestamp("2023-06-01").is_some());
        assert!(parse_timestamp("June 2023").is_none());
    }
}
