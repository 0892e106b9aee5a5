use async_trait::async_trait;
use aws_sdk_sts::error::DisplayErrorContext;

use crate::error::IdentityError;

/// Resolves the cloud account id bound to the active credentials.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn account_id(&self) -> Result<String, IdentityError>;
}

/// STS-backed resolver using `GetCallerIdentity`.
pub struct StsIdentityResolver {
    client: aws_sdk_sts::Client,
}

impl StsIdentityResolver {
    pub fn new(client: aws_sdk_sts::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IdentityResolver for StsIdentityResolver {
    async fn account_id(&self) -> Result<String, IdentityError> {
        let out = self
            .client
            .get_caller_identity()
            .send()
            .await
            .map_err(|e| IdentityError::new(DisplayErrorContext(&e).to_string()))?;
        out.account()
            .map(str::to_owned)
            .ok_or_else(|| IdentityError::new("caller identity carries no account id"))
    }
}
