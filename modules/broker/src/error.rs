use broker_aws::{AwsError, IdentityError};
use broker_store::StoreError;
use catalog::CatalogError;
use thiserror::Error;

/// Failures of broker construction and of the lifecycle operations.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error("service {0} not found in catalog")]
    ServiceNotFound(String),

    #[error("service instance {0} not found")]
    InstanceNotFound(String),

    #[error("service binding {0} not found")]
    BindingNotFound(String),

    #[error("service instance {0} already exists with different attributes")]
    InstanceConflict(String),

    #[error("service binding {0} already exists for another instance")]
    BindingConflict(String),
}
