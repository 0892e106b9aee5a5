use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use osb_model::{Service, ServiceBinding, ServiceInstance};

use crate::error::StoreError;
use crate::port::{record_id, DataStorePort, RecordKind};

/// In-memory implementation of the persistence port.
///
/// Same JSON-payload record layout as the DynamoDB adapter, held in a
/// process-local map. Used by tests and local development runs.
#[derive(Default)]
pub struct MemoryDataStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn put<T: serde::Serialize>(
        &self,
        kind: RecordKind,
        id: &str,
        value: &T,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(value)?;
        self.records
            .lock()
            .expect("memory store lock poisoned")
            .insert(record_id(kind, id), payload);
        Ok(())
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        kind: RecordKind,
        id: &str,
    ) -> Result<Option<T>, StoreError> {
        let records = self.records.lock().expect("memory store lock poisoned");
        match records.get(&record_id(kind, id)) {
            Some(payload) => Ok(Some(serde_json::from_str(payload)?)),
            None => Ok(None),
        }
    }

    fn delete(&self, kind: RecordKind, id: &str) {
        self.records
            .lock()
            .expect("memory store lock poisoned")
            .remove(&record_id(kind, id));
    }
}

#[async_trait]
impl DataStorePort for MemoryDataStore {
    async fn put_service_definition(&self, service: &Service) -> Result<(), StoreError> {
        self.put(RecordKind::Definition, &service.id, service)
    }

    async fn get_service_definition(&self, id: &str) -> Result<Option<Service>, StoreError> {
        self.get(RecordKind::Definition, id)
    }

    async fn put_service_instance(&self, instance: &ServiceInstance) -> Result<(), StoreError> {
        self.put(RecordKind::Instance, &instance.id, instance)
    }

    async fn get_service_instance(&self, id: &str) -> Result<Option<ServiceInstance>, StoreError> {
        self.get(RecordKind::Instance, id)
    }

    async fn delete_service_instance(&self, id: &str) -> Result<(), StoreError> {
        self.delete(RecordKind::Instance, id);
        Ok(())
    }

    async fn put_service_binding(&self, binding: &ServiceBinding) -> Result<(), StoreError> {
        self.put(RecordKind::Binding, &binding.id, binding)
    }

    async fn get_service_binding(&self, id: &str) -> Result<Option<ServiceBinding>, StoreError> {
        self.get(RecordKind::Binding, id)
    }

    async fn delete_service_binding(&self, id: &str) -> Result<(), StoreError> {
        self.delete(RecordKind::Binding, id);
        Ok(())
    }

    async fn get_param(&self, name: &str) -> Result<Option<String>, StoreError> {
        self.get(RecordKind::Param, name)
    }

    async fn put_param(&self, name: &str, value: &str) -> Result<(), StoreError> {
        self.put(RecordKind::Param, name, &value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn instance_lifecycle() {
        let store = MemoryDataStore::new();
        let instance = ServiceInstance {
            id: "inst-1".to_string(),
            service_id: "svc-1".to_string(),
            plan_id: "plan-1".to_string(),
            params: HashMap::new(),
            stack_id: "stack-1".to_string(),
        };

        assert!(store.get_service_instance("inst-1").await.unwrap().is_none());

        store.put_service_instance(&instance).await.unwrap();
        let loaded = store.get_service_instance("inst-1").await.unwrap().unwrap();
        assert_eq!(loaded, instance);

        store.delete_service_instance("inst-1").await.unwrap();
        assert!(store.get_service_instance("inst-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn kinds_do_not_collide() {
        let store = MemoryDataStore::new();
        store.put_param("inst-1", "just-a-param").await.unwrap();
        assert!(store.get_service_instance("inst-1").await.unwrap().is_none());
        assert_eq!(
            store.get_param("inst-1").await.unwrap().as_deref(),
            Some("just-a-param")
        );
    }
}
