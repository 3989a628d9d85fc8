//! FILENAME: core/dataset/src/error.rs

use catalogue::CatalogueError;
use cube::CubeError;
use pivot_engine::PivotError;
use spatial::SpatialError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error(transparent)]
    Cube(#[from] CubeError),

    #[error(transparent)]
    Pivot(#[from] PivotError),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// The injected transport could not supply a payload.
    #[error("Source error: {0}")]
    Source(String),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
