//! FILENAME: core/cube/src/model.rs
//! PURPOSE: Defines the normalized dimensional data structures.
//! CONTEXT: A `Cube` is an ordered list of dimensions plus a flat array of
//! observations addressed by `RadixIndex`. Category order inside a dimension
//! is exactly the order the source payload declared and is never re-sorted.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::{CubeError, Result};
use crate::metadata::CubeMetadata;
use crate::radix::RadixIndex;
use crate::text::sanitise_label;

/// A single cell of the cube. `None` is the "no data" sentinel for missing
/// or redacted values; it is distinct from `Some(0.0)`.
pub type Observation = Option<f64>;

// ============================================================================
// CATEGORY / DIMENSION
// ============================================================================

/// One category of a dimension. The code is used for filtering and joining,
/// the label for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub code: String,
    pub label: String,
}

impl Category {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Category {
            code: code.into(),
            label: label.into(),
        }
    }
}

/// One classification axis of a cube (e.g. time, county, statistic).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    pub code: String,
    pub label: String,
    pub categories: Vec<Category>,
}

impl Dimension {
    pub fn new(code: impl Into<String>, label: impl Into<String>, categories: Vec<Category>) -> Self {
        Dimension {
            code: code.into(),
            label: label.into(),
            categories,
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Position of the category with the given code.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.categories.iter().position(|c| c.code == code)
    }

    /// Position of the category with the given label, only if the label is unique.
    pub fn position_by_label(&self, label: &str) -> Option<usize> {
        let mut matches = self
            .categories
            .iter()
            .enumerate()
            .filter(|(_, c)| c.label == label);
        match (matches.next(), matches.next()) {
            (Some((pos, _)), None) => Some(pos),
            _ => None,
        }
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(|c| c.code.as_str())
    }
}

// ============================================================================
// ROLES
// ============================================================================

/// Semantic role a dimension can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DimensionRole {
    Time,
    Geographic,
    Statistic,
}

/// Indices (into `Cube::dimensions`) of the role-tagged dimensions.
/// Each role is optional and held by at most one dimension.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roles {
    pub time: Option<usize>,
    pub geographic: Option<usize>,
    pub statistic: Option<usize>,
}

impl Roles {
    pub fn get(&self, role: DimensionRole) -> Option<usize> {
        match role {
            DimensionRole::Time => self.time,
            DimensionRole::Geographic => self.geographic,
            DimensionRole::Statistic => self.statistic,
        }
    }

    /// The role held by the dimension at `index`, if any.
    pub fn role_of(&self, index: usize) -> Option<DimensionRole> {
        if self.time == Some(index) {
            Some(DimensionRole::Time)
        } else if self.statistic == Some(index) {
            Some(DimensionRole::Statistic)
        } else if self.geographic == Some(index) {
            Some(DimensionRole::Geographic)
        } else {
            None
        }
    }
}

// ============================================================================
// CUBE
// ============================================================================

/// Normalized multi-dimensional, category-indexed value array.
///
/// Invariant: `values.len()` equals the product of the category counts of
/// all dimensions. Construct through [`Cube::new`], which enforces it.
/// Deserialization goes through the same check; the radix is rebuilt rather
/// than read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCube")]
pub struct Cube {
    dimensions: Vec<Dimension>,
    values: Vec<Observation>,
    roles: Roles,
    metadata: CubeMetadata,
    #[serde(skip_serializing)]
    radix: RadixIndex,
}

/// Serialized form of a cube, before validation.
#[derive(Deserialize)]
struct RawCube {
    dimensions: Vec<Dimension>,
    values: Vec<Observation>,
    #[serde(default)]
    roles: Roles,
    #[serde(default)]
    metadata: CubeMetadata,
}

impl TryFrom<RawCube> for Cube {
    type Error = CubeError;

    fn try_from(raw: RawCube) -> Result<Self> {
        Cube::new(raw.dimensions, raw.values, raw.roles, raw.metadata)
    }
}

impl Cube {
    /// Validates and assembles a cube.
    pub fn new(
        dimensions: Vec<Dimension>,
        values: Vec<Observation>,
        roles: Roles,
        metadata: CubeMetadata,
    ) -> Result<Self> {
        let mut seen_dims = FxHashSet::default();
        for dim in &dimensions {
            if !seen_dims.insert(dim.code.as_str()) {
                return Err(CubeError::malformed(format!(
                    "duplicate dimension '{}'",
                    dim.code
                )));
            }
            let mut seen_codes = FxHashSet::default();
            for cat in &dim.categories {
                if !seen_codes.insert(cat.code.as_str()) {
                    return Err(CubeError::malformed(format!(
                        "duplicate category '{}' in dimension '{}'",
                        cat.code, dim.code
                    )));
                }
            }
        }

        for (role, index) in [
            ("time", roles.time),
            ("geographic", roles.geographic),
            ("statistic", roles.statistic),
        ] {
            if let Some(i) = index {
                if i >= dimensions.len() {
                    return Err(CubeError::malformed(format!(
                        "{} role points at missing dimension #{}",
                        role, i
                    )));
                }
            }
        }
        let tagged: Vec<usize> = [roles.time, roles.geographic, roles.statistic]
            .into_iter()
            .flatten()
            .collect();
        if tagged.iter().collect::<FxHashSet<_>>().len() != tagged.len() {
            return Err(CubeError::malformed(
                "one dimension carries more than one role",
            ));
        }

        let sizes: Vec<usize> = dimensions.iter().map(Dimension::len).collect();
        let radix = RadixIndex::new(&sizes)
            .ok_or_else(|| CubeError::malformed("dimension sizes overflow"))?;
        if radix.len() != values.len() {
            return Err(CubeError::malformed(format!(
                "dimension sizes {:?} multiply to {} but {} values were supplied",
                sizes,
                radix.len(),
                values.len()
            )));
        }

        Ok(Cube {
            dimensions,
            values,
            roles,
            metadata,
            radix,
        })
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn values(&self) -> &[Observation] {
        &self.values
    }

    pub fn roles(&self) -> &Roles {
        &self.roles
    }

    pub fn metadata(&self) -> &CubeMetadata {
        &self.metadata
    }

    /// Index of a dimension by code.
    pub fn dimension_index(&self, code: &str) -> Option<usize> {
        self.dimensions.iter().position(|d| d.code == code)
    }

    pub fn dimension(&self, code: &str) -> Option<&Dimension> {
        self.dimensions.iter().find(|d| d.code == code)
    }

    /// The dimension tagged with `role`, if the cube has one.
    pub fn role_dimension(&self, role: DimensionRole) -> Option<&Dimension> {
        self.roles.get(role).and_then(|i| self.dimensions.get(i))
    }

    pub fn sizes(&self) -> Vec<usize> {
        self.dimensions.iter().map(Dimension::len).collect()
    }

    /// The addressing scheme for this cube's value array.
    pub fn radix(&self) -> &RadixIndex {
        &self.radix
    }

    /// Observation for a tuple of category positions.
    pub fn value_at(&self, tuple: &[usize]) -> Option<Observation> {
        self.radix.encode(tuple).map(|offset| self.values[offset])
    }

    /// Returns a copy with every dimension and category label sanitised.
    /// Codes are left untouched so filters and joins keep working.
    pub fn sanitised(&self) -> Cube {
        let dimensions = self
            .dimensions
            .iter()
            .map(|d| Dimension {
                code: d.code.clone(),
                label: sanitise_label(&d.label),
                categories: d
                    .categories
                    .iter()
                    .map(|c| Category::new(c.code.clone(), sanitise_label(&c.label)))
                    .collect(),
            })
            .collect();
        let mut metadata = self.metadata.clone();
        if let Some(link) = metadata.spatial_link.as_mut() {
            link.dimension_label = sanitise_label(&link.dimension_label);
        }
        Cube {
            dimensions,
            values: self.values.clone(),
            roles: self.roles,
            metadata,
            radix: self.radix.clone(),
        }
    }

    /// Builds a cube from parts that are already known to be consistent.
    pub(crate) fn from_parts(
        dimensions: Vec<Dimension>,
        values: Vec<Observation>,
        roles: Roles,
        metadata: CubeMetadata,
        radix: RadixIndex,
    ) -> Self {
        debug_assert_eq!(radix.len(), values.len());
        Cube {
            dimensions,
            values,
            roles,
            metadata,
            radix,
        }
    }
}
