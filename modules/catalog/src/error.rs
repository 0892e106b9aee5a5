use broker_aws::StorageError;
use broker_store::StoreError;
use thiserror::Error;

/// Failures of one catalog refresh cycle.
///
/// Messages propagate unmodified through the pipeline with one exception:
/// the synchronizer maps bucket-access storage failures to the fixed
/// [`CatalogError::BucketAccess`] text. Parse failures stay transparent so
/// the parser's native message reaches the caller verbatim.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A cache entry that must exist was absent.
    #[error("not found")]
    NotFound,

    #[error("s3 object body missing")]
    ObjectBodyMissing,

    #[error(transparent)]
    Parse(#[from] serde_yaml::Error),

    #[error("Cannot access S3 Bucket, either it does not exist or the IAM user/role the broker is configured to use has no access to the bucket")]
    BucketAccess,

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// Free-form failure from an injected pipeline stage.
    #[error("{0}")]
    Stage(String),
}

impl CatalogError {
    pub fn stage(message: impl Into<String>) -> Self {
        Self::Stage(message.into())
    }
}
