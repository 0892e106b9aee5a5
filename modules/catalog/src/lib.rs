//! Catalog synchronization engine.
//!
//! Keeps a two-tier in-memory cache — coarse listing entries and full
//! service metadata — consistent with the template bucket. One refresh
//! cycle is a three-stage pipeline (list → listing diff → metadata
//! refresh) run by the [`CatalogSynchronizer`]; the [`IntervalPoller`]
//! repeats it on a fixed schedule without ever blocking foreground reads
//! of the caches.

pub mod cache;
pub mod error;
pub mod listing;
pub mod metadata;
pub mod poller;
pub mod sync;

pub use cache::{KvCache, MemoryCache, LISTINGS_KEY};
pub use error::CatalogError;
pub use listing::{
    BucketDetailsRequest, ListingDiff, ListingUpdater, S3TemplateLister, ServiceLastUpdate,
    ServiceListingEntry, TemplateLister,
};
pub use metadata::{MetadataUpdater, S3MetadataUpdater};
pub use poller::{CatalogPoller, IntervalPoller, PollerContext};
pub use sync::{CatalogSync, CatalogSynchronizer};
