//! FILENAME: core/pivot-engine/src/lib.rs
//! Pivot subsystem: flattens dimensional cubes into tables.
//!
//! This crate depends on `cube` for the data model (Cube, Dimension,
//! metadata) and on nothing above it, so the spatial and dataset crates
//! can share one table type.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the pivot IS)
//! - `table`: Flattened output (WHAT we produce)
//! - `engine`: Pivot and reconstruction (HOW we calculate)

pub mod definition;
pub mod engine;
pub mod error;
pub mod table;

pub use definition::*;
pub use engine::{pivot, reconstruct_cube, reconstruct_values};
pub use error::{PivotError, Result};
pub use table::*;
