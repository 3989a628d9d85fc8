//! FILENAME: core/dataset/src/listing.rs
//! The catalogue of published tables, fetched through the payload source.

use std::sync::Arc;

use catalogue::{CatalogueEntry, Listing, SearchQuery};
use cube::log_info;
use payload_cache::{CacheKey, PayloadCache};

use crate::dataset::fetch_cached;
use crate::error::Result;
use crate::options::CatalogueOptions;
use crate::source::PayloadSource;

#[derive(Debug, Clone, PartialEq)]
pub struct Catalogue {
    listing: Listing,
}

impl Catalogue {
    pub fn load(
        source: &dyn PayloadSource,
        cache: Option<Arc<PayloadCache>>,
        options: &CatalogueOptions,
    ) -> Result<Catalogue> {
        let cache = cache.filter(|_| options.use_cache);
        let key = CacheKey::collection(options.from_date);
        let payload = fetch_cached(cache.as_deref(), key, || {
            source.fetch_collection(options.from_date)
        })?;

        let mut listing = Listing::from_collection(&payload)?;
        if options.sanitise {
            listing = listing.sanitised();
        }
        log_info!("CATALOGUE", "catalogue lists {} tables", listing.len());
        Ok(Catalogue { listing })
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn entry(&self, code: &str) -> Option<&CatalogueEntry> {
        self.listing.get(code)
    }

    /// Entries matching `query`, most recently updated first.
    pub fn search(&self, query: &SearchQuery) -> Result<Listing> {
        Ok(catalogue::search(&self.listing, query)?)
    }

    /// Entries matching `query`, most relevant first.
    pub fn rank(&self, query: &SearchQuery) -> Result<Listing> {
        Ok(catalogue::rank(&self.listing, query)?)
    }
}
