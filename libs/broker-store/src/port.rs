use async_trait::async_trait;
use osb_model::{Service, ServiceBinding, ServiceInstance};

use crate::error::StoreError;

/// Table-store access contract.
///
/// Lookups return `Ok(None)` when the record is absent; absence is an
/// observable condition the caller decides how to treat, not an error of
/// the port itself.
#[async_trait]
pub trait DataStorePort: Send + Sync {
    async fn put_service_definition(&self, service: &Service) -> Result<(), StoreError>;
    async fn get_service_definition(&self, id: &str) -> Result<Option<Service>, StoreError>;

    async fn put_service_instance(&self, instance: &ServiceInstance) -> Result<(), StoreError>;
    async fn get_service_instance(&self, id: &str) -> Result<Option<ServiceInstance>, StoreError>;
    async fn delete_service_instance(&self, id: &str) -> Result<(), StoreError>;

    async fn put_service_binding(&self, binding: &ServiceBinding) -> Result<(), StoreError>;
    async fn get_service_binding(&self, id: &str) -> Result<Option<ServiceBinding>, StoreError>;
    async fn delete_service_binding(&self, id: &str) -> Result<(), StoreError>;

    async fn get_param(&self, name: &str) -> Result<Option<String>, StoreError>;
    async fn put_param(&self, name: &str, value: &str) -> Result<(), StoreError>;
}

/// Record namespaces within one tenant partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Definition,
    Instance,
    Binding,
    Param,
}

impl RecordKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecordKind::Definition => "definition",
            RecordKind::Instance => "instance",
            RecordKind::Binding => "binding",
            RecordKind::Param => "param",
        }
    }
}

/// Composite sort key: `<kind>#<id>` keeps the four record namespaces
/// disjoint inside one tenant partition.
pub fn record_id(kind: RecordKind, id: &str) -> String {
    format!("{}#{}", kind.as_str(), id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_ids_are_namespaced_by_kind() {
        assert_eq!(record_id(RecordKind::Instance, "abc"), "instance#abc");
        assert_eq!(record_id(RecordKind::Binding, "abc"), "binding#abc");
        assert_ne!(
            record_id(RecordKind::Instance, "abc"),
            record_id(RecordKind::Definition, "abc")
        );
    }
}
