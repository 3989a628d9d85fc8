//! FILENAME: core/dataset/src/dataset.rs
//! PURPOSE: One published table, loaded and shaped.
//! CONTEXT: Ties the components together for a caller that only has a
//! table code: payload source (through the cache) -> JSON-stat parse ->
//! optional sanitise -> filter -> optional national-row removal. The
//! resulting cube is kept; `table` and `geo_table` shape it on demand.
//!
//! PIPELINE: source/cache --> cube::parse --> cube::apply --> pivot --> attach

use std::sync::Arc;

use serde_json::Value;

use cube::{log_debug, log_info, Cube, CubeMetadata, DimensionRole, FilterSpec};
use payload_cache::{CacheKey, CachedPayload, PayloadCache};
use pivot_engine::{pivot, PivotOptions, Table};
use spatial::{attach, BoundarySet, GeoTable, JoinOptions};

use crate::error::Result;
use crate::options::DatasetOptions;
use crate::source::PayloadSource;

pub struct Dataset {
    table_code: String,
    options: DatasetOptions,
    /// Filters as applied, after label sanitisation.
    filters: FilterSpec,
    cube: Cube,
    source: Arc<dyn PayloadSource>,
    cache: Option<Arc<PayloadCache>>,
}

impl std::fmt::Debug for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dataset")
            .field("table_code", &self.table_code)
            .field("options", &self.options)
            .field("cube", &self.cube)
            .finish_non_exhaustive()
    }
}

impl Dataset {
    /// Loads `table_code` and applies the load-time options.
    ///
    /// The cache is consulted only when one is given and
    /// `options.use_cache` is set.
    pub fn load(
        table_code: &str,
        options: DatasetOptions,
        source: Arc<dyn PayloadSource>,
        cache: Option<Arc<PayloadCache>>,
    ) -> Result<Dataset> {
        let table_code = table_code.trim().to_uppercase();
        let cache = cache.filter(|_| options.use_cache);

        let key = CacheKey::dataset(&table_code, &options.filters, options.format);
        let payload = fetch_cached(cache.as_deref(), key, || {
            source.fetch_dataset(&table_code)
        })?;

        let (cube, filters) = prepare(&payload, &options)?;
        log_info!(
            "DATASET",
            "loaded {} with {} dimensions and {} values",
            table_code,
            cube.dimensions().len(),
            cube.values().len()
        );

        Ok(Dataset {
            table_code,
            options,
            filters,
            cube,
            source,
            cache,
        })
    }

    pub fn table_code(&self) -> &str {
        &self.table_code
    }

    pub fn options(&self) -> &DatasetOptions {
        &self.options
    }

    /// The parsed, filtered cube.
    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn metadata(&self) -> &CubeMetadata {
        self.cube.metadata()
    }

    pub fn has_spatial_data(&self) -> bool {
        self.metadata().has_spatial_link()
    }

    /// The cube pivoted to the configured format.
    pub fn table(&self) -> Result<Table> {
        self.table_with(&self.options.pivot_options())
    }

    /// The cube pivoted with explicit options. Filtered columns are still
    /// dropped when the dataset was loaded with `drop_filtered_cols`.
    pub fn table_with(&self, options: &PivotOptions) -> Result<Table> {
        let mut table = pivot(&self.cube, options)?;
        self.drop_filtered_columns(&mut table, None);
        Ok(table)
    }

    /// The table with boundary geometry attached. Boundaries come from the
    /// dataset's spatial link, through the cache like the payload itself.
    pub fn geo_table(&self, join_options: &JoinOptions) -> Result<GeoTable> {
        let link = self
            .metadata()
            .spatial_link
            .as_ref()
            .ok_or(spatial::SpatialError::NoSpatialLink)?;

        let geojson = fetch_cached(self.cache.as_deref(), CacheKey::boundaries(&link.url), || {
            self.source.fetch_boundaries(&link.url)
        })?;
        let boundaries = BoundarySet::from_geojson(&geojson, &join_options.key_property)?;

        let table = pivot(&self.cube, &self.options.pivot_options())?;
        let mut geo = attach(&table, &boundaries, None, join_options)?;
        let join_dimension = geo.join_dimension();
        self.drop_filtered_columns(geo.table_mut(), Some(join_dimension));
        Ok(geo)
    }

    /// Cube indices of the dimensions named by the filter spec.
    fn filtered_dimensions(&self) -> Vec<usize> {
        let dimensions = self.cube.dimensions();
        let mut found: Vec<usize> = self
            .filters
            .iter()
            .filter_map(|(key, _)| {
                let by_name = dimensions
                    .iter()
                    .position(|d| d.code == *key || d.label == *key);
                if by_name.is_none() && key.eq_ignore_ascii_case("statistic") {
                    return self.cube.roles().get(DimensionRole::Statistic);
                }
                by_name
            })
            .collect();
        found.sort_unstable();
        found.dedup();
        found
    }

    fn drop_filtered_columns(&self, table: &mut Table, keep: Option<usize>) {
        if !self.options.drop_filtered_cols {
            return;
        }
        for index in self.filtered_dimensions() {
            if Some(index) == keep {
                continue;
            }
            let code = self.cube.dimensions()[index].code.clone();
            if table.drop_columns_for(&code) {
                log_debug!("DATASET", "dropped columns of filtered dimension {}", code);
            }
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// Reads a raw payload from the cache, or fetches and stores it.
pub(crate) fn fetch_cached<F>(
    cache: Option<&PayloadCache>,
    key: CacheKey,
    fetch: F,
) -> Result<Arc<Value>>
where
    F: FnOnce() -> Result<Value>,
{
    if let Some(cache) = cache {
        if let Some(raw) = cache.get(&key).and_then(|e| match e.payload {
            CachedPayload::Raw(raw) => Some(raw),
            CachedPayload::Table(_) => None,
        }) {
            log_debug!("DATASET", "cache hit for {}", key);
            return Ok(raw);
        }
    }

    let payload = Arc::new(fetch()?);
    if let Some(cache) = cache {
        cache.put(key, CachedPayload::Raw(Arc::clone(&payload)));
    }
    Ok(payload)
}

/// Parse, sanitise, filter and drop national rows, in that order.
/// Returns the cube and the filters as applied.
fn prepare(payload: &Value, options: &DatasetOptions) -> Result<(Cube, FilterSpec)> {
    let mut cube = cube::parse(payload)?;
    let mut filters = options.filters.clone();

    if options.sanitise {
        cube = cube.sanitised();
        filters = sanitise_filters(&filters);
    }
    if !filters.is_empty() {
        cube = cube::apply(&cube, &filters)?;
    }
    if options.drop_national_data {
        cube = cube::exclude_national(&cube)?;
    }
    Ok((cube, filters))
}

/// Filters written against original labels still resolve once labels are
/// sanitised. Codes pass through unchanged.
fn sanitise_filters(filters: &FilterSpec) -> FilterSpec {
    filters
        .iter()
        .map(|(dimension, categories)| {
            (
                cube::sanitise_label(dimension),
                categories
                    .iter()
                    .map(|c| cube::sanitise_label(c))
                    .collect::<Vec<_>>(),
            )
        })
        .collect()
}
