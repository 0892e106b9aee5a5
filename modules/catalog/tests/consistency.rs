//! Property test for the cache-consistency invariant: after any successful
//! synchronization cycle, every listing entry whose needs-update flag is
//! cleared has a matching metadata-cache entry.

mod support;

use std::sync::Arc;

use broker_store::MemoryDataStore;
use catalog::{
    BucketDetailsRequest, CatalogSync, CatalogSynchronizer, KvCache, MemoryCache, ServiceListingEntry,
    LISTINGS_KEY,
};
use osb_model::Service;
use proptest::prelude::*;
use support::{service_yaml, MockObjectStore};

const NAMES: [&str; 5] = ["alpha", "beta", "gamma", "delta", "epsilon"];

fn service_id(name: &str) -> String {
    format!("svc-{name}")
}

/// One publish event: which template family changes and its new revision.
fn arb_publish() -> impl Strategy<Value = (usize, u32)> {
    (0..NAMES.len(), 1u32..50)
}

fn arb_batches() -> impl Strategy<Value = Vec<Vec<(usize, u32)>>> {
    prop::collection::vec(prop::collection::vec(arb_publish(), 0..4), 1..6)
}

fn assert_invariant(
    listing_cache: &MemoryCache<Vec<ServiceListingEntry>>,
    catalog_cache: &MemoryCache<Service>,
) {
    let entries = listing_cache.get(LISTINGS_KEY).unwrap_or_default();
    for entry in entries.iter().filter(|e| !e.update) {
        assert!(
            catalog_cache.get(&service_id(&entry.name)).is_some(),
            "entry {} is cleared but has no metadata-cache entry",
            entry.name
        );
    }
}

proptest! {
    #[test]
    fn cleared_entries_always_have_metadata(batches in arb_batches()) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listing_cache: MemoryCache<Vec<ServiceListingEntry>> = MemoryCache::new();
            let catalog_cache: MemoryCache<Service> = MemoryCache::new();
            let store = Arc::new(MockObjectStore::new());
            let db = MemoryDataStore::new();
            let source = BucketDetailsRequest::new("bucket", "templates/", "/metadata");
            let sync = CatalogSynchronizer::production();

            for batch in batches {
                for (idx, revision) in batch {
                    let name = NAMES[idx];
                    store.put(
                        &source.object_key(name),
                        Some(service_yaml(&service_id(name), name, &format!("rev {revision}")).as_bytes()),
                        i64::from(revision),
                    );
                }

                sync.update_catalog(&listing_cache, &catalog_cache, &source, store.as_ref(), &db)
                    .await
                    .unwrap();
                assert_invariant(&listing_cache, &catalog_cache);

                // a successful cycle leaves nothing pending
                let entries = listing_cache.get(LISTINGS_KEY).unwrap_or_default();
                assert!(entries.iter().all(|e| !e.update));
            }
        });
    }
}
