//! FILENAME: core/cube/src/metadata.rs
//! PURPOSE: Dataset-level metadata carried alongside a cube.
//! CONTEXT: None of these fields affect reshaping. They are extracted once
//! by the parser and passed through to pivoted tables unmodified.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unit declared for one statistic category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub label: String,
    pub decimals: Option<u32>,
}

/// Reference to the boundary file that geographic categories join against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpatialLink {
    /// Where the boundary file can be fetched from.
    pub url: String,
    /// Code of the dimension whose category codes key the boundaries.
    pub dimension: String,
    /// Display label of that dimension.
    pub dimension_label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Copyright {
    pub name: Option<String>,
    pub href: Option<String>,
}

/// Everything the payload says about the dataset besides its values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CubeMetadata {
    pub table_code: Option<String>,
    pub title: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    pub notes: Vec<String>,
    pub tags: Vec<String>,
    pub reasons: Vec<String>,
    pub contact: Contact,
    pub copyright: Copyright,
    pub exceptional: bool,
    /// Units keyed by statistic category code, in statistic category order.
    pub units: Vec<(String, Unit)>,
    pub spatial_link: Option<SpatialLink>,
}

impl CubeMetadata {
    /// Unit declared for the statistic category with the given code.
    pub fn unit(&self, statistic_code: &str) -> Option<&Unit> {
        self.units
            .iter()
            .find(|(code, _)| code == statistic_code)
            .map(|(_, unit)| unit)
    }

    pub fn has_spatial_link(&self) -> bool {
        self.spatial_link.is_some()
    }
}

/// Classification flags and the tag each one contributes.
pub(crate) const TAG_FLAGS: &[(&str, &str)] = &[
    ("experimental", "Experimental Statistics"),
    ("reservation", "Reservation Statistics"),
    ("archive", "Archive Statistics"),
    ("analytical", "Analytical Statistics"),
    ("official", "Official Statistics"),
];

pub(crate) const GEOGRAPHIC_TAG: &str = "Geographic Data";
