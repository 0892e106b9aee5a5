#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use broker_aws::{FetchedObject, ObjectStore, ObjectSummary, StorageError};
use bytes::Bytes;
use chrono::{DateTime, TimeZone, Utc};

/// One stored mock object; `body: None` models a response that arrived
/// without content.
#[derive(Clone)]
pub struct MockObject {
    pub body: Option<Bytes>,
    pub last_modified: Option<DateTime<Utc>>,
}

/// In-memory object store with failure injection.
#[derive(Default)]
pub struct MockObjectStore {
    objects: Mutex<BTreeMap<String, MockObject>>,
    list_error: Mutex<Option<StorageError>>,
    get_error: Mutex<Option<StorageError>>,
    get_calls: AtomicUsize,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, body: Option<&[u8]>, modified_secs: i64) {
        self.objects.lock().unwrap().insert(
            key.to_string(),
            MockObject {
                body: body.map(Bytes::copy_from_slice),
                last_modified: Some(Utc.timestamp_opt(modified_secs, 0).unwrap()),
            },
        );
    }

    pub fn fail_list_with(&self, error: StorageError) {
        *self.list_error.lock().unwrap() = Some(error);
    }

    pub fn fail_get_with(&self, error: StorageError) {
        *self.get_error.lock().unwrap() = Some(error);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }
}

fn clone_error(error: &StorageError) -> StorageError {
    match error {
        StorageError::NoSuchBucket(m) => StorageError::NoSuchBucket(m.clone()),
        StorageError::AccessDenied(m) => StorageError::AccessDenied(m.clone()),
        StorageError::Service(m) => StorageError::Service(m.clone()),
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get_object(&self, _bucket: &str, key: &str) -> Result<FetchedObject, StorageError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.get_error.lock().unwrap().as_ref() {
            return Err(clone_error(error));
        }
        let objects = self.objects.lock().unwrap();
        match objects.get(key) {
            Some(object) => Ok(FetchedObject {
                body: object.body.clone(),
            }),
            None => Err(StorageError::Service(format!("NoSuchKey: {key}"))),
        }
    }

    async fn list_objects(
        &self,
        _bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectSummary>, StorageError> {
        if let Some(error) = self.list_error.lock().unwrap().as_ref() {
            return Err(clone_error(error));
        }
        let objects = self.objects.lock().unwrap();
        Ok(objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, object)| ObjectSummary {
                key: key.clone(),
                last_modified: object.last_modified,
            })
            .collect())
    }
}

/// Minimal valid service-definition YAML for a template family.
pub fn service_yaml(service_id: &str, name: &str, description: &str) -> String {
    format!("id: {service_id}\nname: {name}\ndescription: {description}\nbindable: true\n")
}
