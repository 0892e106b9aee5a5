use async_trait::async_trait;
use broker_aws::ObjectStore;
use broker_store::DataStorePort;
use osb_model::Service;
use tracing::debug;

use crate::cache::{KvCache, LISTINGS_KEY};
use crate::error::CatalogError;
use crate::listing::{BucketDetailsRequest, ServiceListingEntry};

/// Third pipeline stage: refresh the metadata cache for every listing
/// entry flagged as needing update.
#[async_trait]
pub trait MetadataUpdater: Send + Sync {
    async fn metadata_update(
        &self,
        listing_cache: &dyn KvCache<Vec<ServiceListingEntry>>,
        catalog_cache: &dyn KvCache<Service>,
        source: &BucketDetailsRequest,
        store: &dyn ObjectStore,
        db: &dyn DataStorePort,
    ) -> Result<(), CatalogError>;
}

/// Fetches each flagged template's definition object, parses it as YAML,
/// merges it into the metadata cache and persists it. A listing flag is
/// cleared only after the matching metadata write succeeded, and the
/// cleared state is written back before the next entry is touched, so a
/// later failure cannot orphan an already-refreshed entry. Processing
/// stops on the first failure.
pub struct S3MetadataUpdater;

#[async_trait]
impl MetadataUpdater for S3MetadataUpdater {
    async fn metadata_update(
        &self,
        listing_cache: &dyn KvCache<Vec<ServiceListingEntry>>,
        catalog_cache: &dyn KvCache<Service>,
        source: &BucketDetailsRequest,
        store: &dyn ObjectStore,
        db: &dyn DataStorePort,
    ) -> Result<(), CatalogError> {
        let mut entries = listing_cache
            .get(LISTINGS_KEY)
            .ok_or(CatalogError::NotFound)?;

        for i in 0..entries.len() {
            if !entries[i].update {
                continue;
            }
            let name = entries[i].name.clone();
            let object = store
                .get_object(&source.bucket, &source.object_key(&name))
                .await?;
            let body = object.body.ok_or(CatalogError::ObjectBodyMissing)?;
            let service: Service = serde_yaml::from_slice(&body)?;
            let service_id = service.id.clone();
            debug!(template = %name, service_id = %service_id, "merging service definition");

            db.put_service_definition(&service).await?;
            catalog_cache.set(&service_id, service);

            entries[i].update = false;
            listing_cache.set(LISTINGS_KEY, entries.clone());
        }
        Ok(())
    }
}
