//! FILENAME: core/cube/src/lib.rs
//! PURPOSE: Main library entry point for the dimensional cube model.
//! CONTEXT: Parses JSON-stat payloads into a normalized `Cube`, restricts
//! cubes to category subsets, and carries the dataset metadata that the
//! pivot, spatial and dataset crates pass through unmodified.
//!
//! PIPELINE: Raw JSON --> jsonstat::parse --> Cube --> filter::apply --> Cube

#[macro_use]
pub mod logging;

pub mod error;
pub mod filter;
pub mod jsonstat;
pub mod metadata;
pub mod model;
pub mod period;
pub mod radix;
pub mod text;

// Re-export commonly used types at the crate root
pub use error::{CubeError, Result};
pub use filter::{apply, exclude, exclude_national, FilterSpec, NATIONAL_CATEGORIES};
pub use jsonstat::{parse, parse_timestamp, MAX_CELLS, STATISTIC_LABEL};
pub use metadata::{Contact, Copyright, CubeMetadata, SpatialLink, Unit};
pub use model::{Category, Cube, Dimension, DimensionRole, Observation, Roles};
pub use period::{Granularity, Period, UNTYPED_TIME_DIMENSIONS};
pub use radix::RadixIndex;
pub use text::{clean_note, repair_text, sanitise_label};
