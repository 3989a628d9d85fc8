//! FILENAME: core/cache/src/key.rs
//! PURPOSE: Canonical cache keys.
//! CONTEXT: A dataset key is (table code, filter spec, pivot format). The
//! table code is uppercased and `FilterSpec` keeps dimensions and
//! categories in sorted sets, so two requests that differ only in the
//! order filters were written produce equal keys with equal digests.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::NaiveDate;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use cube::FilterSpec;
use pivot_engine::PivotFormat;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheKey {
    /// A dataset payload as requested with filters and an output format.
    Dataset {
        table: String,
        filters: FilterSpec,
        format: PivotFormat,
    },
    /// The catalogue collection, optionally restricted to recent updates.
    Collection { from: Option<NaiveDate> },
    /// A boundary file.
    Boundaries { url: String },
}

impl CacheKey {
    pub fn dataset(table: &str, filters: &FilterSpec, format: PivotFormat) -> Self {
        CacheKey::Dataset {
            table: table.trim().to_uppercase(),
            filters: filters.clone(),
            format,
        }
    }

    pub fn collection(from: Option<NaiveDate>) -> Self {
        CacheKey::Collection { from }
    }

    pub fn boundaries(url: impl Into<String>) -> Self {
        CacheKey::Boundaries { url: url.into() }
    }

    /// Stable 64-bit digest of the key. Deterministic across runs.
    pub fn digest(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Dataset {
                table,
                filters,
                format,
            } => {
                write!(f, "dataset:{}", table)?;
                for (i, (dimension, categories)) in filters.iter().enumerate() {
                    let sep = if i == 0 { '?' } else { '&' };
                    let categories: Vec<&str> = categories.iter().map(String::as_str).collect();
                    write!(f, "{}{}={}", sep, dimension, categories.join(","))?;
                }
                write!(f, "#{}", format)
            }
            CacheKey::Collection { from: Some(date) } => write!(f, "collection:{}", date),
            CacheKey::Collection { from: None } => f.write_str("collection"),
            CacheKey::Boundaries { url } => write!(f, "boundaries:{}", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_order_does_not_change_key() {
        let a = FilterSpec::new()
            .with("Sex", ["2", "1"])
            .with("County", ["Cork", "Dublin"]);
        let b = FilterSpec::new()
            .with("County", ["Dublin", "Cork"])
            .with("Sex", ["1", "2"]);

        let ka = CacheKey::dataset("fy003a", &a, PivotFormat::Long);
        let kb = CacheKey::dataset("FY003A ", &b, PivotFormat::Long);
        assert_eq!(ka, kb);
        assert_eq!(ka.digest(), kb.digest());
        assert_eq!(ka.to_string(), "dataset:FY003A?County=Cork,Dublin&Sex=1,2#long");
    }

    #[test]
    fn format_is_part_of_the_key() {
        let spec = FilterSpec::new();
        assert_ne!(
            CacheKey::dataset("FY003A", &spec, PivotFormat::Long),
            CacheKey::dataset("FY003A", &spec, PivotFormat::Wide)
        );
    }
}
