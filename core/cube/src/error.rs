//! FILENAME: core/cube/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CubeError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown dimension: {0}")]
    UnknownDimension(String),

    #[error("Unknown category '{code}' in dimension '{dimension}'")]
    UnknownCategory { dimension: String, code: String },

    #[error("Filter on dimension '{dimension}' selects no categories")]
    EmptyFilterResult { dimension: String },
}

impl CubeError {
    pub fn malformed(message: impl Into<String>) -> Self {
        CubeError::MalformedPayload(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CubeError>;
