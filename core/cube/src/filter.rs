//! FILENAME: core/cube/src/filter.rs
//! PURPOSE: The Filter Engine. Restricts a cube to a subset of categories.
//! CONTEXT: Kept categories stay in the cube's own order, whatever order
//! the request listed them in. The new value array is rebuilt by encoding
//! every surviving tuple against the original radix, because a subset of
//! categories is generally not contiguous in the flat array.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::{CubeError, Result};
use crate::model::{Cube, Dimension, DimensionRole};
use crate::radix::RadixIndex;

/// Codes and labels that identify the national total on a geographic dimension.
pub const NATIONAL_CATEGORIES: &[&str] = &["IE0", "Ireland", "State"];

// ============================================================================
// FILTER SPEC
// ============================================================================

/// Allowed categories per dimension. Dimensions that are absent are unrestricted.
///
/// Both levels are ordered sets, so two specs built in different orders
/// compare and hash identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FilterSpec {
    dimensions: BTreeMap<String, BTreeSet<String>>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or extends) the allowed categories for a dimension.
    pub fn with<I, S>(mut self, dimension: impl Into<String>, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.insert(dimension, categories);
        self
    }

    pub fn insert<I, S>(&mut self, dimension: impl Into<String>, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dimensions
            .entry(dimension.into())
            .or_default()
            .extend(categories.into_iter().map(Into::into));
    }

    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.dimensions.len()
    }

    pub fn get(&self, dimension: &str) -> Option<&BTreeSet<String>> {
        self.dimensions.get(dimension)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &BTreeSet<String>)> {
        self.dimensions.iter()
    }
}

impl<K, I, S> FromIterator<(K, I)> for FilterSpec
where
    K: Into<String>,
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, I)>>(iter: T) -> Self {
        let mut spec = FilterSpec::new();
        for (dimension, categories) in iter {
            spec.insert(dimension, categories);
        }
        spec
    }
}

// ============================================================================
// OPERATIONS
// ============================================================================

/// Keeps only the listed categories of each filtered dimension.
pub fn apply(cube: &Cube, spec: &FilterSpec) -> Result<Cube> {
    if spec.is_empty() {
        return Ok(cube.clone());
    }

    let mut selected: Vec<Option<BTreeSet<usize>>> = vec![None; cube.dimensions().len()];
    for (key, values) in spec.iter() {
        let index = resolve_dimension(cube, key)?;
        let dimension = &cube.dimensions()[index];
        if values.is_empty() {
            return Err(CubeError::EmptyFilterResult {
                dimension: dimension.code.clone(),
            });
        }
        let positions = selected[index].get_or_insert_with(BTreeSet::new);
        for value in values {
            let position = dimension
                .position(value)
                .or_else(|| dimension.position_by_label(value))
                .ok_or_else(|| CubeError::UnknownCategory {
                    dimension: dimension.code.clone(),
                    code: value.clone(),
                })?;
            positions.insert(position);
        }
    }

    let kept: Vec<Vec<usize>> = selected
        .into_iter()
        .zip(cube.dimensions())
        .map(|(positions, dim)| match positions {
            Some(set) => set.into_iter().collect(),
            None => (0..dim.len()).collect(),
        })
        .collect();

    let filtered = select(cube, &kept)?;
    log_debug!(
        "FILTER",
        "filtered {} dimension(s): {} -> {} values",
        spec.len(),
        cube.values().len(),
        filtered.values().len()
    );
    Ok(filtered)
}

/// Drops the categories of one dimension whose code or label is listed.
/// Entries that match nothing are ignored.
pub fn exclude(cube: &Cube, dimension: &str, categories: &[&str]) -> Result<Cube> {
    let index = resolve_dimension(cube, dimension)?;
    let dim = &cube.dimensions()[index];
    let keep: Vec<usize> = dim
        .categories
        .iter()
        .enumerate()
        .filter(|(_, c)| !categories.contains(&c.code.as_str()) && !categories.contains(&c.label.as_str()))
        .map(|(pos, _)| pos)
        .collect();

    if keep.len() == dim.len() {
        return Ok(cube.clone());
    }
    if keep.is_empty() {
        return Err(CubeError::EmptyFilterResult {
            dimension: dim.code.clone(),
        });
    }

    let kept: Vec<Vec<usize>> = cube
        .dimensions()
        .iter()
        .enumerate()
        .map(|(i, d)| if i == index { keep.clone() } else { (0..d.len()).collect() })
        .collect();
    let filtered = select(cube, &kept)?;
    log_debug!(
        "FILTER",
        "excluded {} categories from '{}'",
        dim.len() - keep.len(),
        dim.code
    );
    Ok(filtered)
}

/// Drops the national total from the geographic dimension, if the cube has one.
pub fn exclude_national(cube: &Cube) -> Result<Cube> {
    match cube.role_dimension(DimensionRole::Geographic) {
        Some(geo) => {
            let code = geo.code.clone();
            exclude(cube, &code, NATIONAL_CATEGORIES)
        }
        None => Ok(cube.clone()),
    }
}

/// Finds a dimension by code, then by label. The statistic dimension also
/// answers to "statistic" in any case.
fn resolve_dimension(cube: &Cube, key: &str) -> Result<usize> {
    let dims = cube.dimensions();
    if let Some(i) = dims.iter().position(|d| d.code == key) {
        return Ok(i);
    }
    if let Some(i) = dims.iter().position(|d| d.label == key) {
        return Ok(i);
    }
    if key.eq_ignore_ascii_case("statistic") {
        if let Some(i) = cube.roles().statistic {
            return Ok(i);
        }
    }
    Err(CubeError::UnknownDimension(key.to_string()))
}

/// Builds the sub-cube made of the kept category positions of each dimension.
fn select(cube: &Cube, kept: &[Vec<usize>]) -> Result<Cube> {
    let dimensions: Vec<Dimension> = cube
        .dimensions()
        .iter()
        .zip(kept)
        .map(|(dim, positions)| Dimension {
            code: dim.code.clone(),
            label: dim.label.clone(),
            categories: positions.iter().map(|&p| dim.categories[p].clone()).collect(),
        })
        .collect();

    let sizes: Vec<usize> = kept.iter().map(Vec::len).collect();
    let radix = RadixIndex::new(&sizes)
        .ok_or_else(|| CubeError::malformed("dimension sizes overflow"))?;

    let source = cube.radix();
    let mut original = vec![0; kept.len()];
    let mut values = Vec::with_capacity(radix.len());
    for tuple in radix.tuples() {
        for (slot, (&pos, positions)) in original.iter_mut().zip(tuple.iter().zip(kept)) {
            *slot = positions[pos];
        }
        let offset = source
            .encode(&original)
            .ok_or_else(|| CubeError::malformed("filtered tuple outside source cube"))?;
        values.push(cube.values()[offset]);
    }

    Ok(Cube::from_parts(
        dimensions,
        values,
        *cube.roles(),
        cube.metadata().clone(),
        radix,
    ))
}
