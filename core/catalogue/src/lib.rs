//! FILENAME: core/catalogue/src/lib.rs
//! PURPOSE: Catalogue listing and search.
//! CONTEXT: Parses the collection payload into a `Listing` of entries and
//! filters it with per-field boolean expressions (see `query_parser`),
//! reference-period overlap and release flags.

pub mod entry;
pub mod error;
pub mod period;
pub mod search;

pub use entry::{CatalogueEntry, Listing};
pub use error::{CatalogueError, Result};
pub use cube::{Granularity, Period};
pub use period::{parse_date_range, TimeRange};
pub use search::{rank, search, CompiledQuery, Matcher, SearchField, SearchQuery};
