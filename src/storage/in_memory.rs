//! In-memory record store for tests and local development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::core::{Record, RecordStore};

/// Thread-safe in-memory record store.
///
/// Uses RwLock for thread-safe access; patch merges round-trip the record
/// through `serde_json::Value`, the same representation the MongoDB
/// backend stores, so both backends apply patches identically.
#[derive(Clone)]
pub struct InMemoryRecordStore<T> {
    records: Arc<RwLock<HashMap<Uuid, T>>>,
}

impl<T> InMemoryRecordStore<T> {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl<T> Default for InMemoryRecordStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> InMemoryRecordStore<T> {
    fn merge(record: &T, patch: &Value) -> Result<T> {
        let mut json = serde_json::to_value(record)
            .map_err(|e| anyhow!("Failed to serialize record: {}", e))?;

        let obj = json
            .as_object_mut()
            .ok_or_else(|| anyhow!("Record did not serialize to an object"))?;
        let patch_obj = patch
            .as_object()
            .ok_or_else(|| anyhow!("Expected patch to be a JSON object"))?;

        for (field, value) in patch_obj {
            obj.insert(field.clone(), value.clone());
        }

        serde_json::from_value(json)
            .map_err(|e| anyhow!("Failed to deserialize patched record: {}", e))
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for InMemoryRecordStore<T> {
    async fn create(&self, record: T) -> Result<T> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        records.insert(record.id(), record.clone());

        Ok(record)
    }

    async fn create_many(&self, batch: Vec<T>) -> Result<Vec<T>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        for record in &batch {
            records.insert(record.id(), record.clone());
        }

        Ok(batch)
    }

    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<T>> {
        let records = self
            .records
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(records.values().cloned().collect())
    }

    async fn update(&self, id: &Uuid, patch: Value) -> Result<Option<T>> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(current) = records.get(id) else {
            return Ok(None);
        };

        let updated = Self::merge(current, &patch)?;
        records.insert(*id, updated.clone());

        Ok(Some(updated))
    }

    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let mut records = self
            .records
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        Ok(records.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        id: Uuid,
        material_details: Option<String>,
        qty: Option<f64>,
    }

    impl Record for Sample {
        fn resource_name() -> &'static str {
            "samples"
        }

        fn resource_label() -> &'static str {
            "Sample"
        }

        fn collection() -> &'static str {
            "samples"
        }

        fn id(&self) -> Uuid {
            self.id
        }
    }

    fn sample() -> Sample {
        Sample {
            id: Uuid::new_v4(),
            material_details: Some("cement".to_string()),
            qty: Some(4.0),
        }
    }

    #[tokio::test]
    async fn create_then_get_roundtrips() {
        let store = InMemoryRecordStore::new();
        let record = store.create(sample()).await.unwrap();

        let fetched = store.get(&record.id).await.unwrap();
        assert_eq!(fetched, Some(record));
    }

    #[tokio::test]
    async fn get_unknown_id_returns_none() {
        let store: InMemoryRecordStore<Sample> = InMemoryRecordStore::new();
        assert!(store.get(&Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_returns_all_records() {
        let store = InMemoryRecordStore::new();
        store.create(sample()).await.unwrap();
        store.create(sample()).await.unwrap();

        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn create_many_returns_batch_in_input_order() {
        let store = InMemoryRecordStore::new();
        let batch = vec![sample(), sample(), sample()];
        let ids: Vec<Uuid> = batch.iter().map(|r| r.id).collect();

        let created = store.create_many(batch).await.unwrap();
        let created_ids: Vec<Uuid> = created.iter().map(|r| r.id).collect();
        assert_eq!(created_ids, ids);
        assert_eq!(store.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_merges_only_patched_fields() {
        let store = InMemoryRecordStore::new();
        let record = store.create(sample()).await.unwrap();

        let updated = store
            .update(&record.id, json!({"qty": 9.5}))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.qty, Some(9.5));
        assert_eq!(updated.material_details, Some("cement".to_string()));
        assert_eq!(updated.id, record.id);
    }

    #[tokio::test]
    async fn update_unknown_id_returns_none() {
        let store: InMemoryRecordStore<Sample> = InMemoryRecordStore::new();
        let result = store.update(&Uuid::new_v4(), json!({"qty": 1})).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reports_whether_record_existed() {
        let store = InMemoryRecordStore::new();
        let record = store.create(sample()).await.unwrap();

        assert!(store.delete(&record.id).await.unwrap());
        assert!(!store.delete(&record.id).await.unwrap());
        assert!(store.get(&record.id).await.unwrap().is_none());
    }
}
