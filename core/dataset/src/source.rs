//! FILENAME: core/dataset/src/source.rs
//! The transport seam. Whatever fetches payloads over the network (or
//! from fixtures) implements `PayloadSource`; this crate never does I/O.

use chrono::NaiveDate;
use serde_json::Value;

use crate::error::Result;

pub trait PayloadSource: Send + Sync {
    /// JSON-stat dataset for a table code (already uppercased).
    fn fetch_dataset(&self, table_code: &str) -> Result<Value>;

    /// GeoJSON boundary file at `url`.
    fn fetch_boundaries(&self, url: &str) -> Result<Value>;

    /// Catalogue collection, optionally only tables updated since `from`.
    fn fetch_collection(&self, from: Option<NaiveDate>) -> Result<Value>;
}
