//! FILENAME: core/catalogue/src/error.rs

use query_parser::ParseError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogueError {
    /// A search field could not be parsed. Names the field.
    #[error("Invalid {field} query: {source}")]
    InvalidQuery { field: String, source: ParseError },

    #[error("Malformed catalogue listing: {0}")]
    MalformedListing(String),
}

pub type Result<T> = std::result::Result<T, CatalogueError>;
