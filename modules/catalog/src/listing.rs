use async_trait::async_trait;
use broker_aws::ObjectStore;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{KvCache, LISTINGS_KEY};
use crate::error::CatalogError;

/// Bucket coordinates handed to every refresh cycle. Not persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketDetailsRequest {
    pub bucket: String,
    pub prefix: String,
    pub filter: String,
}

impl BucketDetailsRequest {
    pub fn new(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        filter: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
            filter: filter.into(),
        }
    }

    /// Object key a service family's definition lives under:
    /// `<prefix><name><filter>`.
    pub fn object_key(&self, name: &str) -> String {
        format!("{}{}{}", self.prefix, name, self.filter)
    }
}

/// A template family as last seen in the bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceLastUpdate {
    pub name: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// One listing-cache entry; `update` marks a pending metadata refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceListingEntry {
    pub name: String,
    pub update: bool,
    pub last_modified: Option<DateTime<Utc>>,
}

/// First pipeline stage: enumerate candidate templates.
#[async_trait]
pub trait TemplateLister: Send + Sync {
    async fn list_templates(
        &self,
        source: &BucketDetailsRequest,
        store: &dyn ObjectStore,
    ) -> Result<Vec<ServiceLastUpdate>, CatalogError>;
}

/// Lists objects under the prefix and keeps those matching the name
/// filter, recovering the family name from the key.
pub struct S3TemplateLister;

#[async_trait]
impl TemplateLister for S3TemplateLister {
    async fn list_templates(
        &self,
        source: &BucketDetailsRequest,
        store: &dyn ObjectStore,
    ) -> Result<Vec<ServiceLastUpdate>, CatalogError> {
        let objects = store.list_objects(&source.bucket, &source.prefix).await?;
        let mut found = Vec::new();
        for object in objects {
            let Some(stripped) = object.key.strip_prefix(source.prefix.as_str()) else {
                continue;
            };
            let Some(name) = stripped.strip_suffix(source.filter.as_str()) else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            found.push(ServiceLastUpdate {
                name: name.to_string(),
                last_modified: object.last_modified,
            });
        }
        found.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(bucket = %source.bucket, templates = found.len(), "listed templates");
        Ok(found)
    }
}

/// Second pipeline stage: fold a fresh listing into the listing cache.
pub trait ListingUpdater: Send + Sync {
    fn listing_update(
        &self,
        latest: &[ServiceLastUpdate],
        cache: &dyn KvCache<Vec<ServiceListingEntry>>,
    ) -> Result<(), CatalogError>;
}

/// Marks entries new or changed since the last cycle as needing update;
/// entries whose modification marker is unchanged keep their flag as-is,
/// so an already-refreshed entry stays cleared and a failed one stays
/// pending.
pub struct ListingDiff;

impl ListingUpdater for ListingDiff {
    fn listing_update(
        &self,
        latest: &[ServiceLastUpdate],
        cache: &dyn KvCache<Vec<ServiceListingEntry>>,
    ) -> Result<(), CatalogError> {
        let previous = cache.get(LISTINGS_KEY).unwrap_or_default();
        let mut merged = Vec::with_capacity(latest.len());
        for current in latest {
            let update = match previous.iter().find(|e| e.name == current.name) {
                Some(entry) if entry.last_modified == current.last_modified => entry.update,
                _ => true,
            };
            merged.push(ServiceListingEntry {
                name: current.name.clone(),
                update,
                last_modified: current.last_modified,
            });
        }
        cache.set(LISTINGS_KEY, merged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::cache::MemoryCache;

    fn ts(secs: i64) -> Option<DateTime<Utc>> {
        Some(Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn update(name: &str, secs: i64) -> ServiceLastUpdate {
        ServiceLastUpdate {
            name: name.to_string(),
            last_modified: ts(secs),
        }
    }

    #[test]
    fn object_key_concatenates_prefix_name_filter() {
        let source = BucketDetailsRequest::new("bucket", "templates/", "/metadata");
        assert_eq!(source.object_key("redis"), "templates/redis/metadata");
    }

    #[test]
    fn new_entries_are_flagged_for_update() {
        let cache: MemoryCache<Vec<ServiceListingEntry>> = MemoryCache::new();
        ListingDiff
            .listing_update(&[update("redis", 10)], &cache)
            .unwrap();

        let entries = cache.get(LISTINGS_KEY).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].update);
    }

    #[test]
    fn unchanged_cleared_entries_stay_cleared() {
        let cache: MemoryCache<Vec<ServiceListingEntry>> = MemoryCache::new();
        cache.set(
            LISTINGS_KEY,
            vec![ServiceListingEntry {
                name: "redis".to_string(),
                update: false,
                last_modified: ts(10),
            }],
        );

        ListingDiff
            .listing_update(&[update("redis", 10)], &cache)
            .unwrap();
        let entries = cache.get(LISTINGS_KEY).unwrap();
        assert!(!entries[0].update);
    }

    #[test]
    fn modified_entries_are_reflagged() {
        let cache: MemoryCache<Vec<ServiceListingEntry>> = MemoryCache::new();
        cache.set(
            LISTINGS_KEY,
            vec![ServiceListingEntry {
                name: "redis".to_string(),
                update: false,
                last_modified: ts(10),
            }],
        );

        ListingDiff
            .listing_update(&[update("redis", 20)], &cache)
            .unwrap();
        let entries = cache.get(LISTINGS_KEY).unwrap();
        assert!(entries[0].update);
        assert_eq!(entries[0].last_modified, ts(20));
    }

    #[test]
    fn pending_entries_stay_pending_when_unchanged() {
        let cache: MemoryCache<Vec<ServiceListingEntry>> = MemoryCache::new();
        cache.set(
            LISTINGS_KEY,
            vec![ServiceListingEntry {
                name: "redis".to_string(),
                update: true,
                last_modified: ts(10),
            }],
        );

        ListingDiff
            .listing_update(&[update("redis", 10)], &cache)
            .unwrap();
        assert!(cache.get(LISTINGS_KEY).unwrap()[0].update);
    }

    #[test]
    fn removed_templates_drop_out_of_the_listing() {
        let cache: MemoryCache<Vec<ServiceListingEntry>> = MemoryCache::new();
        cache.set(
            LISTINGS_KEY,
            vec![ServiceListingEntry {
                name: "gone".to_string(),
                update: false,
                last_modified: ts(10),
            }],
        );

        ListingDiff
            .listing_update(&[update("kept", 10)], &cache)
            .unwrap();
        let entries = cache.get(LISTINGS_KEY).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "kept");
    }
}
