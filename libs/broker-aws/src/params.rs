use async_trait::async_trait;
use aws_sdk_ssm::error::DisplayErrorContext;

use crate::error::AwsError;

/// Parameter-store lookup contract. Provision parameters whose values carry
/// the `ssm:` prefix are resolved through this port.
#[async_trait]
pub trait ParamStore: Send + Sync {
    async fn get_parameter(&self, name: &str) -> Result<String, AwsError>;
}

/// SSM Parameter Store adapter.
pub struct SsmParamStore {
    client: aws_sdk_ssm::Client,
}

impl SsmParamStore {
    pub fn new(client: aws_sdk_ssm::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ParamStore for SsmParamStore {
    async fn get_parameter(&self, name: &str) -> Result<String, AwsError> {
        let out = self
            .client
            .get_parameter()
            .name(name)
            .with_decryption(true)
            .send()
            .await
            .map_err(|e| AwsError::Service(DisplayErrorContext(&e).to_string()))?;
        out.parameter()
            .and_then(|p| p.value())
            .map(str::to_owned)
            .ok_or_else(|| AwsError::ParameterNotFound {
                name: name.to_string(),
            })
    }
}
