//! FILENAME: core/spatial/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpatialError {
    #[error("Dataset has no spatial information available")]
    NoSpatialLink,

    #[error("{} category code(s) have no boundary: {}", codes.len(), codes.join(", "))]
    UnmatchedCategory { codes: Vec<String> },

    #[error("Category code '{code}' matches {matches} boundaries; expected exactly one")]
    DataIntegrityError { code: String, matches: usize },

    #[error("Malformed boundary data: {0}")]
    MalformedBoundaries(String),

    #[error("Join dimension '{0}' is not a row dimension of the table")]
    MissingJoinDimension(String),
}

pub type Result<T> = std::result::Result<T, SpatialError>;
