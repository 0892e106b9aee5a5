use std::sync::Arc;

use async_trait::async_trait;
use broker_aws::ObjectStore;
use broker_store::DataStorePort;
use osb_model::Service;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::KvCache;
use crate::error::CatalogError;
use crate::listing::{
    BucketDetailsRequest, ListingDiff, ListingUpdater, S3TemplateLister, ServiceListingEntry,
    TemplateLister,
};
use crate::metadata::{MetadataUpdater, S3MetadataUpdater};

/// One full catalog refresh: list → listing diff → metadata refresh.
#[async_trait]
pub trait CatalogSync: Send + Sync {
    async fn update_catalog(
        &self,
        listing_cache: &dyn KvCache<Vec<ServiceListingEntry>>,
        catalog_cache: &dyn KvCache<Service>,
        source: &BucketDetailsRequest,
        store: &dyn ObjectStore,
        db: &dyn DataStorePort,
    ) -> Result<(), CatalogError>;
}

/// Three injected stages; each stage's failure short-circuits the rest.
/// Bucket-access failures from the lister are translated to the fixed
/// user-facing message here and nowhere else. Cycles are single-flight:
/// overlapping callers queue on an internal mutex instead of racing on
/// cache mutation.
pub struct CatalogSynchronizer {
    lister: Arc<dyn TemplateLister>,
    listing: Arc<dyn ListingUpdater>,
    metadata: Arc<dyn MetadataUpdater>,
    cycle: Mutex<()>,
}

impl CatalogSynchronizer {
    pub fn new(
        lister: Arc<dyn TemplateLister>,
        listing: Arc<dyn ListingUpdater>,
        metadata: Arc<dyn MetadataUpdater>,
    ) -> Self {
        Self {
            lister,
            listing,
            metadata,
            cycle: Mutex::new(()),
        }
    }

    /// Production pipeline: S3 lister, marker diff, S3 metadata updater.
    pub fn production() -> Self {
        Self::new(
            Arc::new(S3TemplateLister),
            Arc::new(ListingDiff),
            Arc::new(S3MetadataUpdater),
        )
    }
}

#[async_trait]
impl CatalogSync for CatalogSynchronizer {
    async fn update_catalog(
        &self,
        listing_cache: &dyn KvCache<Vec<ServiceListingEntry>>,
        catalog_cache: &dyn KvCache<Service>,
        source: &BucketDetailsRequest,
        store: &dyn ObjectStore,
        db: &dyn DataStorePort,
    ) -> Result<(), CatalogError> {
        let _cycle = self.cycle.lock().await;

        let latest = match self.lister.list_templates(source, store).await {
            Ok(latest) => latest,
            Err(CatalogError::Storage(e)) if e.is_bucket_access() => {
                return Err(CatalogError::BucketAccess);
            }
            Err(e) => return Err(e),
        };
        self.listing.listing_update(&latest, listing_cache)?;
        self.metadata
            .metadata_update(listing_cache, catalog_cache, source, store, db)
            .await?;
        debug!(bucket = %source.bucket, "catalog refresh cycle complete");
        Ok(())
    }
}
