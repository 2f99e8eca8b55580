//! Material inward register.
//!
//! Unlike the other resources, material registers are bulk-first: POST
//! takes a non-empty array of entries and inserts the whole batch or
//! nothing. No field is required; rows are often filled in incrementally.

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

/// One line of the material inward register.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialIn {
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

impl Record for MaterialIn {
    fn resource_name() -> &'static str {
        "materialin"
    }

    fn resource_label() -> &'static str {
        "Material-in entry"
    }

    fn collection() -> &'static str {
        "material_in"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MaterialInPayload {
    date: Option<String>,
    material_details: Option<String>,
    qty: Option<f64>,
    amt: Option<f64>,
}

fn build(payload: MaterialInPayload) -> Result<MaterialIn, ApiError> {
    Ok(MaterialIn {
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

/// Every field is optional, so `null` is allowed everywhere and clears
/// the field.
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

/// Routes for this resource, mounted at `/materialin`.
pub fn router(store: SharedStore<MaterialIn>) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .with_state(store)
}

async fn list(
    State(store): State<SharedStore<MaterialIn>>,
) -> Result<Json<Vec<MaterialIn>>, ApiError> {
    Ok(Json(store.list().await?))
}

/// Bulk create: the body must be a non-empty array. The whole batch is
/// validated before the first insert, so a bad entry rejects everything.
async fn create(
    State(store): State<SharedStore<MaterialIn>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Vec<MaterialIn>>), ApiError> {
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
        let payload: MaterialInPayload = serde_json::from_value(item)
            .map_err(|e| ApiError::Validation(format!("Invalid material-in payload: {e}")))?;
        records.push(build(payload)?);
    }

    let created = store.create_many(records).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(
    State(store): State<SharedStore<MaterialIn>>,
    Path(id): Path<String>,
) -> Result<Json<MaterialIn>, ApiError> {
    let id = parse_id(&id, MaterialIn::resource_label())?;
    store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(MaterialIn::resource_label()))
}

async fn update(
    State(store): State<SharedStore<MaterialIn>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<MaterialIn>, ApiError> {
    let id = parse_id(&id, MaterialIn::resource_label())?;
    let patch = build_patch(body)?;
    store
        .update(&id, Value::Object(patch))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(MaterialIn::resource_label()))
}

async fn remove(
    State(store): State<SharedStore<MaterialIn>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, MaterialIn::resource_label())?;
    if store.delete(&id).await? {
        Ok(Json(json!({ "message": "Material-in entry deleted" })))
    } else {
        Err(ApiError::not_found(MaterialIn::resource_label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_accepts_fully_empty_payload() {
        let record = build(MaterialInPayload {
            date: None,
            material_details: None,
            qty: None,
            amt: None,
        })
        .unwrap();

        assert!(record.date.is_none());
        assert!(record.qty.is_none());
    }

    #[test]
    fn build_trims_details_and_parses_date() {
        let record = build(MaterialInPayload {
            date: Some("2024-03-01".to_string()),
            material_details: Some(" cement bags ".to_string()),
            qty: Some(0.0),
            amt: Some(0.0),
        })
        .unwrap();

        assert_eq!(record.material_details.as_deref(), Some("cement bags"));
        assert_eq!(record.qty, Some(0.0));
        assert_eq!(
            record.date.unwrap().to_rfc3339(),
            "2024-03-01T00:00:00+00:00"
        );
    }

    #[test]
    fn empty_optional_fields_stay_off_the_wire() {
        let record = build(MaterialInPayload {
            date: None,
            material_details: None,
            qty: None,
            amt: None,
        })
        .unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("date").is_none());
        assert!(json.get("qty").is_none());
        assert!(json.get("id").is_some());
    }

    #[test]
    fn patch_allows_null_to_clear_fields() {
        let patch = build_patch(json!({"materialDetails": null, "qty": null})).unwrap();
        assert!(patch["materialDetails"].is_null());
        assert!(patch["qty"].is_null());
    }

    #[test]
    fn patch_validates_present_values() {
        assert!(build_patch(json!({"qty": "three"})).is_err());
        assert!(build_patch(json!({"date": "not-a-date"})).is_err());
    }
}
