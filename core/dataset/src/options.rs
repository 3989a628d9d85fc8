//! FILENAME: core/dataset/src/options.rs
//! PURPOSE: What a dataset load should produce.
//! CONTEXT: Plain serializable configuration with defaults, the same way
//! `PivotOptions` describes a pivot. String-valued settings go through the
//! `FromStr` impls of `PivotFormat` and `IdColumns`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use cube::FilterSpec;
use pivot_engine::{IdColumns, PivotFormat, PivotOptions};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetOptions {
    #[serde(default)]
    pub filters: FilterSpec,
    #[serde(default)]
    pub format: PivotFormat,
    #[serde(default)]
    pub ids: IdColumns,
    /// Drop the label and ID columns of filtered dimensions.
    #[serde(default)]
    pub drop_filtered_cols: bool,
    /// Drop national aggregate rows (`IE0`, `Ireland`, `State`).
    #[serde(default)]
    pub drop_national_data: bool,
    /// Normalise labels (see `cube::sanitise_label`).
    #[serde(default)]
    pub sanitise: bool,
    /// Type time labels as periods in long and tidy tables.
    #[serde(default)]
    pub convert_dates: bool,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

fn default_use_cache() -> bool {
    true
}

impl Default for DatasetOptions {
    fn default() -> Self {
        DatasetOptions {
            filters: FilterSpec::default(),
            format: PivotFormat::default(),
            ids: IdColumns::default(),
            drop_filtered_cols: false,
            drop_national_data: false,
            sanitise: false,
            convert_dates: false,
            use_cache: default_use_cache(),
        }
    }
}

impl DatasetOptions {
    pub fn new() -> Self {
        DatasetOptions::default()
    }

    pub fn with_filters(mut self, filters: FilterSpec) -> Self {
        self.filters = filters;
        self
    }

    pub fn with_format(mut self, format: PivotFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets the format from `"long"`, `"wide"` or `"tidy"`.
    pub fn with_format_str(self, format: &str) -> Result<Self> {
        Ok(self.with_format(format.parse()?))
    }

    pub fn with_ids(mut self, ids: IdColumns) -> Self {
        self.ids = ids;
        self
    }

    /// Sets ID columns from `"none"`, `"all"` or `"spatial_only"`.
    pub fn with_ids_str(self, ids: &str) -> Result<Self> {
        Ok(self.with_ids(ids.parse()?))
    }

    pub fn drop_filtered_cols(mut self, drop: bool) -> Self {
        self.drop_filtered_cols = drop;
        self
    }

    pub fn drop_national_data(mut self, drop: bool) -> Self {
        self.drop_national_data = drop;
        self
    }

    pub fn sanitise(mut self, sanitise: bool) -> Self {
        self.sanitise = sanitise;
        self
    }

    pub fn convert_dates(mut self, convert: bool) -> Self {
        self.convert_dates = convert;
        self
    }

    pub fn use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn pivot_options(&self) -> PivotOptions {
        PivotOptions::new(self.format)
            .with_ids(self.ids.clone())
            .with_dates(self.convert_dates)
    }
}

/// How a catalogue listing is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueOptions {
    /// Only tables updated on or after this date.
    #[serde(default)]
    pub from_date: Option<NaiveDate>,
    #[serde(default)]
    pub sanitise: bool,
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
}

impl Default for CatalogueOptions {
    fn default() -> Self {
        CatalogueOptions {
            from_date: None,
            sanitise: false,
            use_cache: default_use_cache(),
        }
    }
}
