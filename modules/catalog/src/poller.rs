use std::sync::Arc;
use std::time::Duration;

use broker_aws::ObjectStore;
use broker_store::DataStorePort;
use osb_model::Service;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::warn;

use crate::cache::MemoryCache;
use crate::listing::{BucketDetailsRequest, ServiceListingEntry};
use crate::sync::CatalogSync;

/// Everything one refresh cycle needs; owned by the poller task.
#[derive(Clone)]
pub struct PollerContext {
    pub listing_cache: Arc<MemoryCache<Vec<ServiceListingEntry>>>,
    pub catalog_cache: Arc<MemoryCache<Service>>,
    pub source: BucketDetailsRequest,
    pub store: Arc<dyn ObjectStore>,
    pub db: Arc<dyn DataStorePort>,
    pub synchronizer: Arc<dyn CatalogSync>,
}

/// Drives the synchronizer on its own schedule for the life of the
/// process.
pub trait CatalogPoller: Send + Sync {
    fn start(&self, ctx: PollerContext) -> JoinHandle<()>;
}

/// Fixed-interval poller. A failed cycle is logged and retried on the next
/// tick; nothing terminates the task short of process shutdown. Cycles
/// never overlap: the loop awaits each one before the next tick fires.
pub struct IntervalPoller {
    interval: Duration,
}

impl IntervalPoller {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl CatalogPoller for IntervalPoller {
    fn start(&self, ctx: PollerContext) -> JoinHandle<()> {
        let period = self.interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately and the bootstrap pass
            // already ran, so skip it.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if let Err(error) = ctx
                    .synchronizer
                    .update_catalog(
                        ctx.listing_cache.as_ref(),
                        ctx.catalog_cache.as_ref(),
                        &ctx.source,
                        ctx.store.as_ref(),
                        ctx.db.as_ref(),
                    )
                    .await
                {
                    warn!(%error, "catalog refresh cycle failed; retrying on the next tick");
                }
            }
        })
    }
}
