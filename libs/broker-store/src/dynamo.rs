use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use osb_model::{Service, ServiceBinding, ServiceInstance};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::port::{record_id, DataStorePort, RecordKind};

const ATTR_TENANT: &str = "tenant";
const ATTR_ID: &str = "id";
const ATTR_PAYLOAD: &str = "payload";

/// DynamoDB-backed persistence.
///
/// Item layout: partition key `tenant` (the broker's tenant UUID), sort key
/// `id` (`<kind>#<record id>`), and the record serialized as a JSON string
/// in `payload`. The table schema beyond these three attributes is not this
/// adapter's concern.
pub struct DynamoDataStore {
    client: aws_sdk_dynamodb::Client,
    table: String,
    tenant: Uuid,
}

impl DynamoDataStore {
    pub fn new(client: aws_sdk_dynamodb::Client, table: impl Into<String>, tenant: Uuid) -> Self {
        Self {
            client,
            table: table.into(),
            tenant,
        }
    }

    async fn put_record<T: Serialize + Sync>(
        &self,
        kind: RecordKind,
        id: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(value)?;
        self.client
            .put_item()
            .table_name(&self.table)
            .item(ATTR_TENANT, AttributeValue::S(self.tenant.to_string()))
            .item(ATTR_ID, AttributeValue::S(record_id(kind, id)))
            .item(ATTR_PAYLOAD, AttributeValue::S(payload))
            .send()
            .await
            .map_err(|e| StoreError::Service(DisplayErrorContext(&e).to_string()))?;
        debug!(kind = kind.as_str(), id, "stored record");
        Ok(())
    }

    async fn get_record<T: DeserializeOwned>(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        let out = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(ATTR_TENANT, AttributeValue::S(self.tenant.to_string()))
            .key(ATTR_ID, AttributeValue::S(record_id(kind, id)))
            .send()
            .await
            .map_err(|e| StoreError::Service(DisplayErrorContext(&e).to_string()))?;

        let Some(item) = out.item else {
            return Ok(None);
        };
        let payload = item
            .get(ATTR_PAYLOAD)
            .and_then(|v| v.as_s().ok())
            .ok_or_else(|| StoreError::Malformed {
                id: record_id(kind, id),
                reason: "payload attribute missing or not a string".to_string(),
            })?;
        Ok(Some(serde_json::from_str(payload)?))
    }

    async fn delete_record(&self, kind: RecordKind, id: &str) -> Result<(), StoreError> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key(ATTR_TENANT, AttributeValue::S(self.tenant.to_string()))
            .key(ATTR_ID, AttributeValue::S(record_id(kind, id)))
            .send()
            .await
            .map_err(|e| StoreError::Service(DisplayErrorContext(&e).to_string()))?;
        debug!(kind = kind.as_str(), id, "deleted record");
        Ok(())
    }
}

#[async_trait]
impl DataStorePort for DynamoDataStore {
    async fn put_service_definition(&self, service: &Service) -> Result<(), StoreError> {
        self.put_record(RecordKind::Definition, &service.id, service)
            .await
    }

    async fn get_service_definition(&self, id: &str) -> Result<Option<Service>, StoreError> {
        self.get_record(RecordKind::Definition, id).await
    }

    async fn put_service_instance(&self, instance: &ServiceInstance) -> Result<(), StoreError> {
        self.put_record(RecordKind::Instance, &instance.id, instance)
            .await
    }

    async fn get_service_instance(&self, id: &str) -> Result<Option<ServiceInstance>, StoreError> {
        self.get_record(RecordKind::Instance, id).await
    }

    async fn delete_service_instance(&self, id: &str) -> Result<(), StoreError> {
        self.delete_record(RecordKind::Instance, id).await
    }

    async fn put_service_binding(&self, binding: &ServiceBinding) -> Result<(), StoreError> {
        self.put_record(RecordKind::Binding, &binding.id, binding)
            .await
    }

    async fn get_service_binding(&self, id: &str) -> Result<Option<ServiceBinding>, StoreError> {
        self.get_record(RecordKind::Binding, id).await
    }

    async fn delete_service_binding(&self, id: &str) -> Result<(), StoreError> {
        self.delete_record(RecordKind::Binding, id).await
    }

    async fn get_param(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.get_record(RecordKind::Param, name).await
    }

    async fn put_param(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.put_record(RecordKind::Param, name, &value.to_string())
            .await
    }
}
