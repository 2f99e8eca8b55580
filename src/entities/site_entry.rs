//! Daily site log entries.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::core::validation::{
    check_required, object_payload, parse_date, parse_id, string_field, trimmed,
};
use crate::core::{ApiError, Record, SharedStore};

/// One day's site log: free-text material movement and labour notes.
///
/// `date` defaults to the creation time when the caller omits it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub id: Uuid,
    pub material_in: String,
    pub material_out: String,
    pub labour_entry: String,
    pub date: DateTime<Utc>,
}

impl Record for SiteEntry {
    fn resource_name() -> &'static str {
        "siteEntries"
    }

    fn resource_label() -> &'static str {
        "Site entry"
    }

    fn collection() -> &'static str {
        "site_entries"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

const REQUIRED: &[&str] = &["materialIn", "materialOut", "labourEntry"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SiteEntryPayload {
    material_in: String,
    material_out: String,
    labour_entry: String,
    date: Option<String>,
}

fn build(payload: SiteEntryPayload) -> Result<SiteEntry, ApiError> {
    let date = match payload.date.as_deref() {
        Some(raw) => parse_date("date", raw)?,
        None => Utc::now(),
    };
    Ok(SiteEntry {
        id: Uuid::new_v4(),
        material_in: trimmed(payload.material_in),
        material_out: trimmed(payload.material_out),
        labour_entry: trimmed(payload.labour_entry),
        date,
    })
}

fn build_patch(body: Value) -> Result<Map<String, Value>, ApiError> {
    let map = object_payload(body)?;
    let mut patch = Map::new();

    for (field, value) in map {
        match field.as_str() {
            "materialIn" | "materialOut" | "labourEntry" => {
                let text = trimmed(string_field(&field, &value)?);
                patch.insert(field, Value::String(text));
            }
            "date" => {
                let date = parse_date(&field, &string_field(&field, &value)?)?;
                patch.insert(field, Value::String(date.to_rfc3339()));
            }
            _ => {}
        }
    }

    Ok(patch)
}

/// Routes for this resource, mounted at `/siteEntries`.
pub fn router(store: SharedStore<SiteEntry>) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .with_state(store)
}

async fn list(
    State(store): State<SharedStore<SiteEntry>>,
) -> Result<Json<Vec<SiteEntry>>, ApiError> {
    Ok(Json(store.list().await?))
}

async fn create(
    State(store): State<SharedStore<SiteEntry>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<SiteEntry>), ApiError> {
    check_required(&body, REQUIRED)?;
    let payload: SiteEntryPayload = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid site entry payload: {e}")))?;

    let created = store.create(build(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(
    State(store): State<SharedStore<SiteEntry>>,
    Path(id): Path<String>,
) -> Result<Json<SiteEntry>, ApiError> {
    let id = parse_id(&id, SiteEntry::resource_label())?;
    store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(SiteEntry::resource_label()))
}

async fn update(
    State(store): State<SharedStore<SiteEntry>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<SiteEntry>, ApiError> {
    let id = parse_id(&id, SiteEntry::resource_label())?;
    let patch = build_patch(body)?;
    store
        .update(&id, Value::Object(patch))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(SiteEntry::resource_label()))
}

async fn remove(
    State(store): State<SharedStore<SiteEntry>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, SiteEntry::resource_label())?;
    if store.delete(&id).await? {
        Ok(Json(json!({ "message": "Site entry deleted" })))
    } else {
        Err(ApiError::not_found(SiteEntry::resource_label()))
    }
}
