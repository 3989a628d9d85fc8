//! FILENAME: core/cache/src/lib.rs
//! PURPOSE: Payload cache shared by dataset and catalogue loading.
//! CONTEXT: Sits between the injected transport and the JSON-stat parser.
//! A miss tells the caller to fetch; the caller then stores what it got.

pub mod cache;
pub mod error;
pub mod key;
pub mod store;

pub use cache::{CacheInfo, PayloadCache};
pub use error::{CacheError, Result};
pub use key::CacheKey;
pub use store::{CacheEntry, CacheStore, CachedPayload, MemoryStore};
