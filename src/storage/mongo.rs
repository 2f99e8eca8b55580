//! MongoDB storage backend using the official async driver.
//!
//! Each record type gets its own collection, named by `T::collection()`.
//!
//! # Serialization strategy
//!
//! Records are serialized via `serde_json::Value` as an intermediate
//! format, then converted to BSON documents. This keeps UUIDs stored as
//! strings and timestamps as RFC 3339 strings, mirroring the wire format.
//! The `id` field is mapped to MongoDB's `_id` convention.

use std::collections::HashMap;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::Database;
use mongodb::bson::{Bson, Document, doc};
use serde_json::Value;
use uuid::Uuid;

use crate::core::{Record, RecordStore};

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a serde_json::Value (expected to be an Object) into a BSON
/// Document, renaming `id` → `_id` for MongoDB convention.
fn json_to_document(json: Value) -> Result<Document> {
    let bson_val = mongodb::bson::to_bson(&json)
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    let mut doc = match bson_val {
        Bson::Document(d) => d,
        _ => return Err(anyhow!("Expected BSON document, got non-object")),
    };

    if let Some(id) = doc.remove("id") {
        doc.insert("_id", id);
    }

    Ok(doc)
}

/// Convert a BSON Document back into a serde_json::Value, renaming
/// `_id` → `id` for the record convention.
fn document_to_json(mut doc: Document) -> Value {
    if let Some(id) = doc.remove("_id") {
        doc.insert("id", id);
    }

    Bson::Document(doc).into_relaxed_extjson()
}

/// Convert a UUID to its BSON string representation for queries.
fn uuid_bson(id: &Uuid) -> Bson {
    Bson::String(id.to_string())
}

// ---------------------------------------------------------------------------
// MongoRecordStore<T>
// ---------------------------------------------------------------------------

/// Record store backed by MongoDB, one collection per record type.
///
/// Holds a `mongodb::Database` handle; the driver manages pooling and
/// concurrency, so the store is freely shared across request handlers.
#[derive(Clone, Debug)]
pub struct MongoRecordStore<T> {
    database: Database,
    _marker: std::marker::PhantomData<T>,
}

impl<T> MongoRecordStore<T> {
    /// Create a new store over the given database handle.
    pub fn new(database: Database) -> Self {
        Self {
            database,
            _marker: std::marker::PhantomData,
        }
    }

    /// The underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }
}

impl<T: Record> MongoRecordStore<T> {
    fn collection(&self) -> mongodb::Collection<Document> {
        self.database.collection(T::collection())
    }

    fn record_to_document(record: &T) -> Result<Document> {
        let json = serde_json::to_value(record)
            .map_err(|e| anyhow!("Failed to serialize record: {}", e))?;
        json_to_document(json)
    }

    fn document_to_record(doc: Document) -> Result<T> {
        let json = document_to_json(doc);
        serde_json::from_value(json)
            .map_err(|e| anyhow!("Failed to deserialize record from document: {}", e))
    }

    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Document>> {
        self.collection()
            .find_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to get record: {}", e))
    }
}

#[async_trait]
impl<T: Record> RecordStore<T> for MongoRecordStore<T> {
    /// Insert the record and read it back to return the stored version.
    async fn create(&self, record: T) -> Result<T> {
        let doc = Self::record_to_document(&record)?;
        let id = record.id();

        self.collection()
            .insert_one(doc)
            .await
            .map_err(|e| anyhow!("Failed to create record: {}", e))?;

        let stored = self
            .find_by_id(&id)
            .await?
            .ok_or_else(|| anyhow!("Record not found after insert"))?;

        Self::document_to_record(stored)
    }

    /// Bulk-insert a pre-validated batch, returning the stored versions in
    /// input order.
    async fn create_many(&self, records: Vec<T>) -> Result<Vec<T>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let docs: Vec<Document> = records
            .iter()
            .map(Self::record_to_document)
            .collect::<Result<_>>()?;

        self.collection()
            .insert_many(docs)
            .await
            .map_err(|e| anyhow!("Failed to create records: {}", e))?;

        let ids: Vec<Bson> = records.iter().map(|r| uuid_bson(&r.id())).collect();
        let cursor = self
            .collection()
            .find(doc! { "_id": { "$in": ids } })
            .await
            .map_err(|e| anyhow!("Failed to read back created records: {}", e))?;

        let stored: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect created records: {}", e))?;

        // find() returns store order; hand records back in input order.
        let mut by_id: HashMap<Uuid, T> = stored
            .into_iter()
            .map(|d| {
                let record = Self::document_to_record(d)?;
                Ok((record.id(), record))
            })
            .collect::<Result<_>>()?;

        records
            .iter()
            .map(|r| {
                by_id
                    .remove(&r.id())
                    .ok_or_else(|| anyhow!("Record not found after bulk insert"))
            })
            .collect()
    }

    /// Fetch a record by id; `Ok(None)` if it does not exist.
    async fn get(&self, id: &Uuid) -> Result<Option<T>> {
        match self.find_by_id(id).await? {
            Some(d) => Ok(Some(Self::document_to_record(d)?)),
            None => Ok(None),
        }
    }

    /// List all records, store-native order.
    async fn list(&self) -> Result<Vec<T>> {
        let cursor = self
            .collection()
            .find(doc! {})
            .await
            .map_err(|e| anyhow!("Failed to list records: {}", e))?;

        let docs: Vec<Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect records: {}", e))?;

        docs.into_iter().map(Self::document_to_record).collect()
    }

    /// Shallow-merge `patch` into the stored document via `$set`.
    ///
    /// Returns `Ok(None)` when no document matched the id.
    async fn update(&self, id: &Uuid, patch: Value) -> Result<Option<T>> {
        let set_doc = match mongodb::bson::to_bson(&patch)
            .map_err(|e| anyhow!("Failed to convert patch to BSON: {}", e))?
        {
            Bson::Document(d) => d,
            _ => return Err(anyhow!("Expected patch to be a JSON object")),
        };

        // An empty $set is a driver error; an empty patch just reads back.
        if !set_doc.is_empty() {
            let result = self
                .collection()
                .update_one(doc! { "_id": uuid_bson(id) }, doc! { "$set": set_doc })
                .await
                .map_err(|e| anyhow!("Failed to update record: {}", e))?;

            if result.matched_count == 0 {
                return Ok(None);
            }
        }

        match self.find_by_id(id).await? {
            Some(d) => Ok(Some(Self::document_to_record(d)?)),
            None => Ok(None),
        }
    }

    /// Delete a record by id; returns whether a document matched.
    async fn delete(&self, id: &Uuid) -> Result<bool> {
        let result = self
            .collection()
            .delete_one(doc! { "_id": uuid_bson(id) })
            .await
            .map_err(|e| anyhow!("Failed to delete record: {}", e))?;

        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // -----------------------------------------------------------------------
    // json_to_document
    // -----------------------------------------------------------------------

    #[test]
    fn json_to_document_renames_id_to_underscore_id() {
        let input = json!({"id": "abc", "materialDetails": "cement"});
        let doc = json_to_document(input).unwrap();

        assert!(doc.contains_key("_id"), "document should contain _id");
        assert!(!doc.contains_key("id"), "document should not contain id");
        assert_eq!(doc.get_str("_id").unwrap(), "abc");
    }

    #[test]
    fn json_to_document_preserves_other_fields() {
        let input = json!({"id": "abc", "materialDetails": "cement", "qty": 42});
        let doc = json_to_document(input).unwrap();

        assert_eq!(doc.get_str("materialDetails").unwrap(), "cement");
        assert_eq!(doc.get_i64("qty").unwrap(), 42);
    }

    #[test]
    fn json_to_document_non_object_returns_error() {
        let result = json_to_document(json!("string"));

        assert!(result.is_err());
        let err_msg = result.unwrap_err().to_string();
        assert!(
            err_msg.contains("non-object"),
            "error should mention non-object, got: {err_msg}"
        );
    }

    // -----------------------------------------------------------------------
    // document_to_json
    // -----------------------------------------------------------------------

    #[test]
    fn document_to_json_renames_underscore_id_to_id() {
        let doc = doc! { "_id": "abc", "companyName": "Acme" };
        let json = document_to_json(doc);

        assert_eq!(json["id"], "abc");
        assert!(json.get("_id").is_none(), "json should not contain _id");
    }

    #[test]
    fn document_to_json_preserves_fields() {
        let doc = doc! { "_id": "abc", "companyName": "Acme", "qty": 42 };
        let json = document_to_json(doc);

        assert_eq!(json["companyName"], "Acme");
        assert_eq!(json["qty"], 42);
    }

    // -----------------------------------------------------------------------
    // roundtrip
    // -----------------------------------------------------------------------

    #[test]
    fn json_document_roundtrip() {
        let original = json!({"id": "round", "unit": "m"});
        let doc = json_to_document(original).unwrap();

        assert!(doc.contains_key("_id"));
        assert!(!doc.contains_key("id"));

        let back = document_to_json(doc);
        assert_eq!(back["id"], "round");
        assert_eq!(back["unit"], "m");
        assert!(back.get("_id").is_none());
    }

    // -----------------------------------------------------------------------
    // uuid_bson
    // -----------------------------------------------------------------------

    #[test]
    fn uuid_bson_returns_string() {
        let id = Uuid::new_v4();
        let bson = uuid_bson(&id);

        match bson {
            Bson::String(s) => assert_eq!(s, id.to_string()),
            other => panic!("expected Bson::String, got: {other:?}"),
        }
    }
}
