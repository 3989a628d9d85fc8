//! FILENAME: core/pivot-engine/src/error.rs

use cube::CubeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PivotError {
    #[error("Cannot pivot to wide format: the dataset has no time dimension")]
    NoTimeDimension,

    #[error("Cannot pivot to tidy format: the dataset has no statistic dimension")]
    NoStatisticDimension,

    #[error("Invalid pivot format '{0}'. Valid options are: \"long\", \"wide\", \"tidy\"")]
    InvalidFormat(String),

    #[error(
        "Invalid ID column option '{0}'. Valid options are: \"all\", \"spatial_only\", \"none\", or a list of dimension labels"
    )]
    InvalidIdColumns(String),

    #[error("ID columns requested for unknown dimensions {requested:?}. Valid dimensions are: {valid:?}")]
    UnknownIdColumn {
        requested: Vec<String>,
        valid: Vec<String>,
    },

    #[error("Cannot rebuild cube from table: {0}")]
    IncompleteTable(String),

    #[error(transparent)]
    Cube(#[from] CubeError),
}

pub type Result<T> = std::result::Result<T, PivotError>;
