//! Material outward register.
//!
//! Mirrors the inward register: bulk-first creation, no required fields.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::core::validation::{
    number_field, object_payload, parse_date, parse_id, string_field, trimmed, trimmed_opt,
};
use crate::core::{ApiError, Record, SharedStore};

/// One line of the material outward register.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialOut {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub material_details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amt: Option<f64>,
}

impl Record for MaterialOut {
    fn resource_name() -> &'static str {
        "materialout"
    }

    fn resource_label() -> &'static str {
        "Material-out entry"
    }

    fn collection() -> &'static str {
        "material_out"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialOutPayload {
    date: Option<String>,
    material_details: Option<String>,
    qty: Option<f64>,
    amt: Option<f64>,
}

fn build(payload: MaterialOutPayload) -> Result<MaterialOut, ApiError> {
    Ok(MaterialOut {
        id: Uuid::new_v4(),
        date: payload
            .date
            .as_deref()
            .map(|raw| parse_date("date", raw))
            .transpose()?,
        material_details: trimmed_opt(payload.material_details),
        qty: payload.qty,
        amt: payload.amt,
    })
}

fn build_patch(body: Value) -> Result<Map<String, Value>, ApiError> {
    let map = object_payload(body)?;
    let mut patch = Map::new();

    for (field, value) in map {
        match field.as_str() {
            "materialDetails" => {
                if value.is_null() {
                    patch.insert(field, Value::Null);
                } else {
                    let text = trimmed(string_field(&field, &value)?);
                    patch.insert(field, Value::String(text));
                }
            }
            "date" => {
                if value.is_null() {
                    patch.insert(field, Value::Null);
                } else {
                    let date = parse_date(&field, &string_field(&field, &value)?)?;
                    patch.insert(field, Value::String(date.to_rfc3339()));
                }
            }
            "qty" | "amt" => {
                if !value.is_null() {
                    number_field(&field, &value)?;
                }
                patch.insert(field, value);
            }
            _ => {}
        }
    }

    Ok(patch)
}

/// Routes for this resource, mounted at `/materialout`.
pub fn router(store: SharedStore<MaterialOut>) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .with_state(store)
}

async fn list(
    State(store): State<SharedStore<MaterialOut>>,
) -> Result<Json<Vec<MaterialOut>>, ApiError> {
    Ok(Json(store.list().await?))
}

async fn create(
    State(store): State<SharedStore<MaterialOut>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Vec<MaterialOut>>), ApiError> {
    let Value::Array(items) = body else {
        return Err(ApiError::Validation(
            "Invalid input data, expected a non-empty array".to_string(),
        ));
    };
    if items.is_empty() {
        return Err(ApiError::Validation(
            "Invalid input data, expected a non-empty array".to_string(),
        ));
    }

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        let payload: MaterialOutPayload = serde_json::from_value(item)
            .map_err(|e| ApiError::Validation(format!("Invalid material-out payload: {e}")))?;
        records.push(build(payload)?);
    }

    let created = store.create_many(records).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(
    State(store): State<SharedStore<MaterialOut>>,
    Path(id): Path<String>,
) -> Result<Json<MaterialOut>, ApiError> {
    let id = parse_id(&id, MaterialOut::resource_label())?;
    store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(MaterialOut::resource_label()))
}

async fn update(
    State(store): State<SharedStore<MaterialOut>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<MaterialOut>, ApiError> {
    let id = parse_id(&id, MaterialOut::resource_label())?;
    let patch = build_patch(body)?;
    store
        .update(&id, Value::Object(patch))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(MaterialOut::resource_label()))
}

async fn remove(
    State(store): State<SharedStore<MaterialOut>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, MaterialOut::resource_label())?;
    if store.delete(&id).await? {
        Ok(Json(json!({ "message": "Material-out entry deleted" })))
    } else {
        Err(ApiError::not_found(MaterialOut::resource_label()))
    }
}
