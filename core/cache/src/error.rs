//! FILENAME: core/cache/src/error.rs
//! Store faults. `PayloadCache` never hands these to its callers; they
//! are logged and turned into misses.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CacheError {
    #[error("Cache lock poisoned")]
    Poisoned,

    #[error("Cache store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, CacheError>;
