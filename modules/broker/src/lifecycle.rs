use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use broker_aws::arn::{TARGET_ACCOUNT_ID_PARAM, TARGET_ROLE_NAME_PARAM};
use broker_aws::{build_role_arn, StackOps};
use catalog::KvCache;
use osb_model::{Service, ServiceBinding, ServiceInstance};
use tracing::{info, instrument};

use crate::broker::Broker;
use crate::error::BrokerError;

/// Parameter values carrying this prefix are resolved through the
/// parameter store before reaching the stack.
const SSM_VALUE_PREFIX: &str = "ssm:";

/// Where a stack operation currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    InProgress,
    Succeeded,
    Failed,
}

impl fmt::Display for OperationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OperationState::InProgress => "in progress",
            OperationState::Succeeded => "succeeded",
            OperationState::Failed => "failed",
        };
        f.write_str(s)
    }
}

fn operation_state(stack_status: &str) -> OperationState {
    match stack_status {
        s if s.ends_with("_IN_PROGRESS") => OperationState::InProgress,
        "CREATE_COMPLETE" | "UPDATE_COMPLETE" | "DELETE_COMPLETE" => OperationState::Succeeded,
        _ => OperationState::Failed,
    }
}

impl Broker {
    /// Snapshot of the offerable service definitions, ordered by name.
    pub fn catalog(&self) -> Vec<Service> {
        let mut services = self.catalog_cache.values();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        services
    }

    /// Create a stack for a new service instance and record it.
    ///
    /// Re-provisioning an existing instance with identical attributes is
    /// idempotent; with different attributes it is a conflict.
    #[instrument(skip(self, params))]
    pub async fn provision(
        &self,
        instance_id: &str,
        service_id: &str,
        plan_id: &str,
        params: HashMap<String, String>,
    ) -> Result<ServiceInstance, BrokerError> {
        let service = self
            .catalog_cache
            .get(service_id)
            .ok_or_else(|| BrokerError::ServiceNotFound(service_id.to_string()))?;

        if let Some(existing) = self.data_store.get_service_instance(instance_id).await? {
            if existing.service_id == service_id
                && existing.plan_id == plan_id
                && existing.params == params
            {
                return Ok(existing);
            }
            return Err(BrokerError::InstanceConflict(instance_id.to_string()));
        }

        let resolved = self.resolve_params(&params).await?;
        let stack_ops = self.stack_ops_for(&params).await?;
        let stack_params: HashMap<String, String> = resolved
            .into_iter()
            .filter(|(key, _)| !is_broker_param(key))
            .collect();

        let stack_name = format!("{}-{}", service.name, instance_id);
        let template_url = self.template_url(&service.name);
        let stack_id = stack_ops
            .create_stack(&stack_name, &template_url, &stack_params)
            .await?;

        let instance = ServiceInstance {
            id: instance_id.to_string(),
            service_id: service_id.to_string(),
            plan_id: plan_id.to_string(),
            params,
            stack_id,
        };
        self.data_store.put_service_instance(&instance).await?;
        info!(instance_id, stack_id = %instance.stack_id, "provisioned service instance");
        Ok(instance)
    }

    /// Delete the instance's stack; the record goes away only once the
    /// delete call was accepted.
    #[instrument(skip(self))]
    pub async fn deprovision(&self, instance_id: &str) -> Result<(), BrokerError> {
        let instance = self
            .data_store
            .get_service_instance(instance_id)
            .await?
            .ok_or_else(|| BrokerError::InstanceNotFound(instance_id.to_string()))?;

        let stack_ops = self.stack_ops_for(&instance.params).await?;
        stack_ops.delete_stack(&instance.stack_id).await?;
        self.data_store.delete_service_instance(instance_id).await?;
        info!(instance_id, "deprovisioned service instance");
        Ok(())
    }

    /// Expose the instance's stack outputs as binding credentials.
    #[instrument(skip(self, _params))]
    pub async fn bind(
        &self,
        binding_id: &str,
        instance_id: &str,
        _params: HashMap<String, String>,
    ) -> Result<ServiceBinding, BrokerError> {
        let instance = self
            .data_store
            .get_service_instance(instance_id)
            .await?
            .ok_or_else(|| BrokerError::InstanceNotFound(instance_id.to_string()))?;

        if let Some(existing) = self.data_store.get_service_binding(binding_id).await? {
            if existing.instance_id == instance_id {
                return Ok(existing);
            }
            return Err(BrokerError::BindingConflict(binding_id.to_string()));
        }

        let stack_ops = self.stack_ops_for(&instance.params).await?;
        let outputs = stack_ops.stack_outputs(&instance.stack_id).await?;
        let credentials = outputs
            .into_iter()
            .map(|(key, value)| (key, serde_json::Value::String(value)))
            .collect();

        let binding = ServiceBinding {
            id: binding_id.to_string(),
            instance_id: instance_id.to_string(),
            credentials,
        };
        self.data_store.put_service_binding(&binding).await?;
        info!(binding_id, instance_id, "bound service instance");
        Ok(binding)
    }

    #[instrument(skip(self))]
    pub async fn unbind(&self, binding_id: &str) -> Result<(), BrokerError> {
        self.data_store
            .get_service_binding(binding_id)
            .await?
            .ok_or_else(|| BrokerError::BindingNotFound(binding_id.to_string()))?;
        self.data_store.delete_service_binding(binding_id).await?;
        info!(binding_id, "unbound service instance");
        Ok(())
    }

    /// Map the instance's stack status to a broker operation state.
    #[instrument(skip(self))]
    pub async fn last_operation(&self, instance_id: &str) -> Result<OperationState, BrokerError> {
        let instance = self
            .data_store
            .get_service_instance(instance_id)
            .await?
            .ok_or_else(|| BrokerError::InstanceNotFound(instance_id.to_string()))?;
        let stack_ops = self.stack_ops_for(&instance.params).await?;
        let status = stack_ops.stack_status(&instance.stack_id).await?;
        Ok(operation_state(&status))
    }

    /// Stack orchestration for the request: the broker's own account, or
    /// the target account via an assumed role when `target_role_name` is
    /// present.
    async fn stack_ops_for(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<Arc<dyn StackOps>, BrokerError> {
        if params.contains_key(TARGET_ROLE_NAME_PARAM) {
            let role_arn = build_role_arn(params, &self.account_id);
            Ok(self.factory.assume_role(&role_arn).await?)
        } else {
            Ok(self.factory.stack_ops())
        }
    }

    async fn resolve_params(
        &self,
        params: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>, BrokerError> {
        let mut resolved = HashMap::with_capacity(params.len());
        for (key, value) in params {
            let value = match value.strip_prefix(SSM_VALUE_PREFIX) {
                Some(name) => self.factory.param_store().get_parameter(name).await?,
                None => value.clone(),
            };
            resolved.insert(key.clone(), value);
        }
        Ok(resolved)
    }

    fn template_url(&self, service_name: &str) -> String {
        format!(
            "https://{}.s3.{}.amazonaws.com/{}",
            self.source.bucket,
            self.config.s3_region,
            self.source.object_key(service_name)
        )
    }
}

fn is_broker_param(key: &str) -> bool {
    key == TARGET_ROLE_NAME_PARAM || key == TARGET_ACCOUNT_ID_PARAM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_status_maps_to_operation_state() {
        assert_eq!(operation_state("CREATE_IN_PROGRESS"), OperationState::InProgress);
        assert_eq!(operation_state("DELETE_IN_PROGRESS"), OperationState::InProgress);
        assert_eq!(operation_state("CREATE_COMPLETE"), OperationState::Succeeded);
        assert_eq!(operation_state("UPDATE_COMPLETE"), OperationState::Succeeded);
        assert_eq!(operation_state("ROLLBACK_COMPLETE"), OperationState::Failed);
        assert_eq!(operation_state("CREATE_FAILED"), OperationState::Failed);
    }

    #[test]
    fn operation_state_display_matches_the_protocol_wording() {
        assert_eq!(OperationState::InProgress.to_string(), "in progress");
        assert_eq!(OperationState::Succeeded.to_string(), "succeeded");
        assert_eq!(OperationState::Failed.to_string(), "failed");
    }

    #[test]
    fn broker_params_are_excluded_from_stack_parameters() {
        assert!(is_broker_param(TARGET_ROLE_NAME_PARAM));
        assert!(is_broker_param(TARGET_ACCOUNT_ID_PARAM));
        assert!(!is_broker_param("InstanceSize"));
    }
}
