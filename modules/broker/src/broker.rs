use std::sync::Arc;

use broker_aws::{ClientFactory, ObjectStore};
use broker_store::DataStorePort;
use catalog::{
    BucketDetailsRequest, CatalogPoller, CatalogSync, MemoryCache, PollerContext,
    ServiceListingEntry,
};
use osb_model::Service;
use tokio::task::JoinHandle;
use tracing::info;
use uuid::Uuid;

use crate::config::{BrokerConfig, BrokerOptions};
use crate::error::BrokerError;
use crate::tenant::derive_tenant_uuid;

/// The provisioning control-plane aggregate.
pub struct Broker {
    pub(crate) config: BrokerConfig,
    pub(crate) account_id: String,
    pub(crate) tenant_uuid: Uuid,
    pub(crate) listing_cache: Arc<MemoryCache<Vec<ServiceListingEntry>>>,
    pub(crate) catalog_cache: Arc<MemoryCache<Service>>,
    pub(crate) source: BucketDetailsRequest,
    pub(crate) factory: Arc<dyn ClientFactory>,
    pub(crate) object_store: Arc<dyn ObjectStore>,
    pub(crate) data_store: Arc<dyn DataStorePort>,
    pub(crate) synchronizer: Arc<dyn CatalogSync>,
    poller_task: JoinHandle<()>,
}

impl Broker {
    /// Fail-fast construction. Every step must succeed or the first error
    /// is returned and no broker exists: resolve identity → derive the
    /// tenant partition → normalize configuration → one synchronous
    /// catalog pass → start the poller.
    pub async fn new(
        options: BrokerOptions,
        factory: Arc<dyn ClientFactory>,
        synchronizer: Arc<dyn CatalogSync>,
        poller: Arc<dyn CatalogPoller>,
    ) -> Result<Broker, BrokerError> {
        let account_id = factory.identity_resolver().account_id().await?;
        let tenant_uuid = derive_tenant_uuid(&account_id, &options.broker_id);
        info!(%account_id, tenant = %tenant_uuid, "resolved broker identity");

        let config = BrokerConfig::from_options(options);
        let source = BucketDetailsRequest::new(
            config.s3_bucket.clone(),
            config.s3_key.clone(),
            config.template_filter.clone(),
        );
        let listing_cache = Arc::new(MemoryCache::new());
        let catalog_cache = Arc::new(MemoryCache::new());
        let object_store = factory.object_store();
        let data_store = factory.data_store(tenant_uuid);

        synchronizer
            .update_catalog(
                listing_cache.as_ref(),
                catalog_cache.as_ref(),
                &source,
                object_store.as_ref(),
                data_store.as_ref(),
            )
            .await?;
        info!(services = catalog_cache.len(), "catalog bootstrap complete");

        let poller_task = poller.start(PollerContext {
            listing_cache: listing_cache.clone(),
            catalog_cache: catalog_cache.clone(),
            source: source.clone(),
            store: object_store.clone(),
            db: data_store.clone(),
            synchronizer: synchronizer.clone(),
        });

        Ok(Broker {
            config,
            account_id,
            tenant_uuid,
            listing_cache,
            catalog_cache,
            source,
            factory,
            object_store,
            data_store,
            synchronizer,
            poller_task,
        })
    }

    /// Run one catalog refresh now, ahead of the poller's schedule.
    /// Serialized against background cycles by the synchronizer itself.
    pub async fn refresh_catalog(&self) -> Result<(), BrokerError> {
        self.synchronizer
            .update_catalog(
                self.listing_cache.as_ref(),
                self.catalog_cache.as_ref(),
                &self.source,
                self.object_store.as_ref(),
                self.data_store.as_ref(),
            )
            .await?;
        Ok(())
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    pub fn tenant_uuid(&self) -> Uuid {
        self.tenant_uuid
    }

    /// Stop the background poller. Foreground operations stay usable.
    pub fn shutdown(&self) {
        self.poller_task.abort();
    }
}

impl Drop for Broker {
    fn drop(&mut self) {
        self.poller_task.abort();
    }
}
