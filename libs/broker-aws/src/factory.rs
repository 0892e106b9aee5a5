use std::sync::Arc;

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sts::error::DisplayErrorContext;
use broker_store::{DataStorePort, DynamoDataStore};
use tracing::info;
use uuid::Uuid;

use crate::error::AwsError;
use crate::identity::{IdentityResolver, StsIdentityResolver};
use crate::object_store::{ObjectStore, S3ObjectStore};
use crate::params::{ParamStore, SsmParamStore};
use crate::stack_ops::{CfnStackOps, StackOps};

const ASSUME_ROLE_SESSION_NAME: &str = "stackbroker";

/// One producer per backing service. Production wiring binds AWS SDK
/// clients; tests bind stubs. No producer performs network I/O — client
/// allocation only.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    fn object_store(&self) -> Arc<dyn ObjectStore>;
    fn identity_resolver(&self) -> Arc<dyn IdentityResolver>;
    fn stack_ops(&self) -> Arc<dyn StackOps>;
    fn param_store(&self) -> Arc<dyn ParamStore>;
    fn data_store(&self, tenant: Uuid) -> Arc<dyn DataStorePort>;

    /// Stack orchestration bound to assumed cross-account credentials.
    /// This is the one producer that talks to the network (STS).
    async fn assume_role(&self, role_arn: &str) -> Result<Arc<dyn StackOps>, AwsError>;
}

/// Production factory over one resolved SDK config.
pub struct AwsClientFactory {
    config: SdkConfig,
    table_name: String,
    storage_region: Option<String>,
}

impl AwsClientFactory {
    pub fn new(config: SdkConfig, table_name: impl Into<String>) -> Self {
        Self {
            config,
            table_name: table_name.into(),
            storage_region: None,
        }
    }

    /// Pin the object-store client to the template bucket's region when it
    /// differs from the broker's own.
    pub fn with_storage_region(mut self, region: impl Into<String>) -> Self {
        self.storage_region = Some(region.into());
        self
    }
}

#[async_trait]
impl ClientFactory for AwsClientFactory {
    fn object_store(&self) -> Arc<dyn ObjectStore> {
        let mut builder = aws_sdk_s3::config::Builder::from(&self.config);
        if let Some(region) = &self.storage_region {
            builder = builder.region(aws_sdk_s3::config::Region::new(region.clone()));
        }
        let client = aws_sdk_s3::Client::from_conf(builder.build());
        Arc::new(S3ObjectStore::new(client))
    }

    fn identity_resolver(&self) -> Arc<dyn IdentityResolver> {
        Arc::new(StsIdentityResolver::new(aws_sdk_sts::Client::new(
            &self.config,
        )))
    }

    fn stack_ops(&self) -> Arc<dyn StackOps> {
        Arc::new(CfnStackOps::new(aws_sdk_cloudformation::Client::new(
            &self.config,
        )))
    }

    fn param_store(&self) -> Arc<dyn ParamStore> {
        Arc::new(SsmParamStore::new(aws_sdk_ssm::Client::new(&self.config)))
    }

    fn data_store(&self, tenant: Uuid) -> Arc<dyn DataStorePort> {
        Arc::new(DynamoDataStore::new(
            aws_sdk_dynamodb::Client::new(&self.config),
            &self.table_name,
            tenant,
        ))
    }

    async fn assume_role(&self, role_arn: &str) -> Result<Arc<dyn StackOps>, AwsError> {
        let sts = aws_sdk_sts::Client::new(&self.config);
        let out = sts
            .assume_role()
            .role_arn(role_arn)
            .role_session_name(ASSUME_ROLE_SESSION_NAME)
            .send()
            .await
            .map_err(|e| AwsError::AssumeRole {
                role_arn: role_arn.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        let creds = out.credentials().ok_or_else(|| AwsError::AssumeRole {
            role_arn: role_arn.to_string(),
            message: "assume role response carried no credentials".to_string(),
        })?;
        let assumed = aws_credential_types::Credentials::new(
            creds.access_key_id(),
            creds.secret_access_key(),
            Some(creds.session_token().to_string()),
            None,
            "stackbroker-assumed-role",
        );
        let conf = aws_sdk_cloudformation::config::Builder::from(&self.config)
            .credentials_provider(assumed)
            .build();
        info!(role_arn, "assumed role for cross-account stack operations");
        Ok(Arc::new(CfnStackOps::new(
            aws_sdk_cloudformation::Client::from_conf(conf),
        )))
    }
}
