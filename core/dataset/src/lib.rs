//! FILENAME: core/dataset/src/lib.rs
//! PURPOSE: Entry point for loading tables and the catalogue.
//! CONTEXT: Callers inject a `PayloadSource` (the transport) and, if they
//! want one, a shared `PayloadCache`. Everything else is pure reshaping
//! done by the cube, pivot-engine, spatial and catalogue crates.

pub mod dataset;
pub mod error;
pub mod listing;
pub mod options;
pub mod source;

pub use dataset::Dataset;
pub use error::{DatasetError, Result};
pub use listing::Catalogue;
pub use options::{CatalogueOptions, DatasetOptions};
pub use source::PayloadSource;
