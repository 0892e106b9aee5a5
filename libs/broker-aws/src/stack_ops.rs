use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_cloudformation::error::DisplayErrorContext;
use aws_sdk_cloudformation::types::{Capability, Parameter};
use tracing::info;

use crate::error::AwsError;

/// Stack orchestration contract. The broker hands this port stack
/// identifiers and template references; lifecycle execution beyond that is
/// the collaborator's business.
#[async_trait]
pub trait StackOps: Send + Sync {
    /// Launch a stack and return its identifier.
    async fn create_stack(
        &self,
        stack_name: &str,
        template_url: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, AwsError>;

    async fn delete_stack(&self, stack_id: &str) -> Result<(), AwsError>;

    /// Raw status string of the stack, e.g. `CREATE_IN_PROGRESS`.
    async fn stack_status(&self, stack_id: &str) -> Result<String, AwsError>;

    /// Stack outputs as a key → value mapping.
    async fn stack_outputs(&self, stack_id: &str) -> Result<HashMap<String, String>, AwsError>;
}

/// CloudFormation adapter.
pub struct CfnStackOps {
    client: aws_sdk_cloudformation::Client,
}

impl CfnStackOps {
    pub fn new(client: aws_sdk_cloudformation::Client) -> Self {
        Self { client }
    }

    async fn describe(
        &self,
        stack_id: &str,
    ) -> Result<aws_sdk_cloudformation::types::Stack, AwsError> {
        let out = self
            .client
            .describe_stacks()
            .stack_name(stack_id)
            .send()
            .await
            .map_err(|e| AwsError::Service(DisplayErrorContext(&e).to_string()))?;
        out.stacks()
            .first()
            .cloned()
            .ok_or_else(|| AwsError::StackNotFound {
                stack_id: stack_id.to_string(),
            })
    }
}

#[async_trait]
impl StackOps for CfnStackOps {
    async fn create_stack(
        &self,
        stack_name: &str,
        template_url: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, AwsError> {
        let parameters: Vec<Parameter> = params
            .iter()
            .map(|(key, value)| {
                Parameter::builder()
                    .parameter_key(key)
                    .parameter_value(value)
                    .build()
            })
            .collect();
        let out = self
            .client
            .create_stack()
            .stack_name(stack_name)
            .template_url(template_url)
            .capabilities(Capability::CapabilityNamedIam)
            .set_parameters(Some(parameters))
            .send()
            .await
            .map_err(|e| AwsError::Service(DisplayErrorContext(&e).to_string()))?;
        let stack_id = out
            .stack_id()
            .ok_or_else(|| AwsError::Service("create stack returned no stack id".to_string()))?;
        info!(stack_name, stack_id, "stack creation started");
        Ok(stack_id.to_string())
    }

    async fn delete_stack(&self, stack_id: &str) -> Result<(), AwsError> {
        self.client
            .delete_stack()
            .stack_name(stack_id)
            .send()
            .await
            .map_err(|e| AwsError::Service(DisplayErrorContext(&e).to_string()))?;
        info!(stack_id, "stack deletion started");
        Ok(())
    }

    async fn stack_status(&self, stack_id: &str) -> Result<String, AwsError> {
        let stack = self.describe(stack_id).await?;
        Ok(stack
            .stack_status()
            .map(|s| s.as_str().to_string())
            .unwrap_or_default())
    }

    async fn stack_outputs(&self, stack_id: &str) -> Result<HashMap<String, String>, AwsError> {
        let stack = self.describe(stack_id).await?;
        let mut outputs = HashMap::new();
        for output in stack.outputs() {
            if let (Some(key), Some(value)) = (output.output_key(), output.output_value()) {
                outputs.insert(key.to_string(), value.to_string());
            }
        }
        Ok(outputs)
    }
}
