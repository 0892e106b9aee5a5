use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::StorageError;

/// One object returned by [`ObjectStore::get_object`]. The body stays
/// optional so a response that arrived without content is observable as
/// its own condition.
#[derive(Debug, Clone, Default)]
pub struct FetchedObject {
    pub body: Option<Bytes>,
}

/// One entry of an object listing.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectSummary {
    pub key: String,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Object-storage access contract.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError>;

    /// Full (paginated) listing of every object under `prefix`.
    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectSummary>, StorageError>;
}

/// S3 adapter.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<FetchedObject, StorageError> {
        let out = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(classify_sdk_error)?;
        let data = out
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Service(format!("failed to read object body: {e}")))?;
        Ok(FetchedObject {
            body: Some(data.into_bytes()),
        })
    }

    async fn list_objects(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<ObjectSummary>, StorageError> {
        let mut summaries = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let mut req = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(token) = continuation.take() {
                req = req.continuation_token(token);
            }
            let page = req.send().await.map_err(classify_sdk_error)?;
            for obj in page.contents() {
                let Some(key) = obj.key() else { continue };
                summaries.push(ObjectSummary {
                    key: key.to_string(),
                    last_modified: obj
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                });
            }
            match page.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }
        debug!(bucket, prefix, count = summaries.len(), "listed objects");
        Ok(summaries)
    }
}

/// Classify SDK failures by service error code so the catalog layer can
/// recognize bucket-access problems structurally.
fn classify_sdk_error<E>(err: SdkError<E>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let code = err.as_service_error().and_then(|e| e.code()).map(str::to_owned);
    let message = DisplayErrorContext(&err).to_string();
    match code.as_deref() {
        Some("NoSuchBucket") => StorageError::NoSuchBucket(message),
        Some("AccessDenied") | Some("AllAccessDisabled") => StorageError::AccessDenied(message),
        _ => StorageError::Service(message),
    }
}
