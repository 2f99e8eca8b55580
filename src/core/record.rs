//! The record contract satisfied by all five resource types.

use serde::Serialize;
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// Base trait for every stored record type.
///
/// A record is a flat document with a service-assigned UUID. The trait
/// carries only what routing, storage and error messages need: naming and
/// the id. The `Serialize`/`DeserializeOwned` bounds let stores round-trip
/// records through `serde_json::Value` regardless of backend.
pub trait Record: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
    /// The plural resource name used in URLs (e.g. "quotations").
    fn resource_name() -> &'static str;

    /// The label used in client-facing messages (e.g. "Quotation").
    fn resource_label() -> &'static str;

    /// The collection this record type is stored in.
    fn collection() -> &'static str;

    /// The unique identifier assigned at creation.
    fn id(&self) -> Uuid;
}
