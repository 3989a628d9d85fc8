//! FILENAME: core/spatial/src/lib.rs
//! Spatial join: boundary geometry for pivoted tables.
//!
//! PIPELINE: GeoJSON --> BoundarySet --> attach(Table) --> GeoTable
//!
//! The join is a pure left-merge keyed by category code. Geometry is
//! opaque here: it is carried, never reprojected or inspected.

pub mod boundary;
pub mod error;
pub mod join;

pub use boundary::{detect_crs, Boundary, BoundarySet, DEFAULT_CRS, DEFAULT_KEY_PROPERTY};
pub use error::{Result, SpatialError};
pub use join::{attach, GeoTable, JoinOptions, UnmatchedPolicy};
