//! FILENAME: core/pivot-engine/src/definition.rs
//! Pivot Definition - The serializable configuration.
//!
//! This module contains the types needed to DESCRIBE a pivot request:
//! which layout to produce and which dimensions get a code ("ID") column.
//! These structures are plain data, serializable, and parse from the
//! strings a caller would type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PivotError;

/// Suffix appended to a dimension label to name its code column.
pub const ID_COLUMN_SUFFIX: &str = " ID";

/// Name of the single value column of a long table.
pub const VALUE_COLUMN: &str = "value";

// ============================================================================
// FORMAT
// ============================================================================

/// Table layouts a cube can be flattened into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PivotFormat {
    /// One row per category combination, one `value` column. Lossless.
    Long,
    /// Time categories promoted to columns.
    Wide,
    /// Statistic categories promoted to columns.
    Tidy,
}

impl Default for PivotFormat {
    fn default() -> Self {
        PivotFormat::Long
    }
}

impl PivotFormat {
    pub const ALL: [PivotFormat; 3] = [PivotFormat::Long, PivotFormat::Wide, PivotFormat::Tidy];

    pub fn as_str(&self) -> &'static str {
        match self {
            PivotFormat::Long => "long",
            PivotFormat::Wide => "wide",
            PivotFormat::Tidy => "tidy",
        }
    }
}

impl fmt::Display for PivotFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PivotFormat {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalised = s.trim().to_lowercase();
        PivotFormat::ALL
            .into_iter()
            .find(|f| f.as_str() == normalised)
            .ok_or_else(|| PivotError::InvalidFormat(s.to_string()))
    }
}

// ============================================================================
// ID COLUMNS
// ============================================================================

/// Which dimensions get a `"<label> ID"` column holding category codes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdColumns {
    None,
    All,
    /// Only the geographic dimension.
    SpatialOnly,
    /// The dimensions with these labels (or codes).
    Only(Vec<String>),
}

impl Default for IdColumns {
    fn default() -> Self {
        IdColumns::None
    }
}

impl FromStr for IdColumns {
    type Err = PivotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" => Ok(IdColumns::None),
            "all" => Ok(IdColumns::All),
            "spatial_only" => Ok(IdColumns::SpatialOnly),
            _ => Err(PivotError::InvalidIdColumns(s.to_string())),
        }
    }
}

impl<S: Into<String>> FromIterator<S> for IdColumns {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        IdColumns::Only(iter.into_iter().map(Into::into).collect())
    }
}

// ============================================================================
// OPTIONS
// ============================================================================

/// Everything a pivot call needs besides the cube.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PivotOptions {
    #[serde(default)]
    pub format: PivotFormat,
    #[serde(default)]
    pub ids: IdColumns,
    /// Type the time dimension's label cells as periods instead of text.
    #[serde(default)]
    pub convert_dates: bool,
}

impl PivotOptions {
    pub fn new(format: PivotFormat) -> Self {
        PivotOptions {
            format,
            ids: IdColumns::None,
            convert_dates: false,
        }
    }

    pub fn with_ids(mut self, ids: IdColumns) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_dates(mut self, convert_dates: bool) -> Self {
        self.convert_dates = convert_dates;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("WIDE".parse::<PivotFormat>().unwrap(), PivotFormat::Wide);
        assert_eq!(" tidy ".parse::<PivotFormat>().unwrap(), PivotFormat::Tidy);
        assert_eq!(
            "pivot".parse::<PivotFormat>().unwrap_err(),
            PivotError::InvalidFormat("pivot".to_string())
        );
    }

    #[test]
    fn id_columns_parse() {
        assert_eq!("Spatial_Only".parse::<IdColumns>().unwrap(), IdColumns::SpatialOnly);
        assert!("some".parse::<IdColumns>().is_err());
        let only: IdColumns = ["County", "Sex"].into_iter().collect();
        assert_eq!(only, IdColumns::Only(vec!["County".into(), "Sex".into()]));
    }

    #[test]
    fn defaults_are_long_without_ids() {
        let options = PivotOptions::default();
        assert_eq!(options.format, PivotFormat::Long);
        assert_eq!(options.ids, IdColumns::None);
        assert!(!options.convert_dates);
    }
}
