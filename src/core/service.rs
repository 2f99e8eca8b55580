//! The store abstraction the resource handlers talk to.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use uuid::Uuid;

use crate::core::record::Record;

/// A store handle as injected into routers.
pub type SharedStore<T> = Arc<dyn RecordStore<T>>;

/// Async CRUD surface over one record collection.
///
/// Implementations are storage-specific; handlers only ever see
/// `Arc<dyn RecordStore<T>>`, so backends can be swapped without touching
/// the HTTP layer. Absence is data rather than an error: `get` and
/// `update` return `None` and `delete` returns `false` when no record
/// matches, leaving the 404 mapping to the caller. Anything else that goes
/// wrong is an opaque storage failure.
#[async_trait]
pub trait RecordStore<T: Record>: Send + Sync {
    /// Insert a record and return the stored version.
    async fn create(&self, record: T) -> Result<T>;

    /// Insert a batch of records and return the stored versions, in input
    /// order. Callers validate the whole batch before handing it over.
    async fn create_many(&self, records: Vec<T>) -> Result<Vec<T>>;

    /// Fetch a record by id.
    async fn get(&self, id: &Uuid) -> Result<Option<T>>;

    /// List all records, store-native order.
    async fn list(&self) -> Result<Vec<T>>;

    /// Shallow-merge `patch` (a JSON object of field updates) into the
    /// record and return the updated version.
    async fn update(&self, id: &Uuid, patch: Value) -> Result<Option<T>>;

    /// Remove a record; returns whether anything was deleted.
    async fn delete(&self, id: &Uuid) -> Result<bool>;
}
