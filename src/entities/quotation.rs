//! Quotation records and routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use uuid::Uuid;

use crate::core::validation::{
    check_required, number_field, object_payload, parse_date, parse_id, string_field, trimmed,
};
use crate::core::{ApiError, Record, SharedStore};

/// A quotation line offered to a customer.
///
/// `total` is derived from `qty * rate` when the caller does not supply it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quotation {
    pub id: Uuid,
    pub company_name: String,
    pub date: DateTime<Utc>,
    pub description: String,
    pub unit: String,
    pub qty: f64,
    pub rate: f64,
    pub total: f64,
}

impl Record for Quotation {
    fn resource_name() -> &'static str {
        "quotations"
    }

    fn resource_label() -> &'static str {
        "Quotation"
    }

    fn collection() -> &'static str {
        "quotations"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

const REQUIRED: &[&str] = &["companyName", "date", "description", "unit", "qty", "rate"];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotationPayload {
    company_name: String,
    date: String,
    description: String,
    unit: String,
    qty: f64,
    rate: f64,
    total: Option<f64>,
}

fn build(payload: QuotationPayload) -> Result<Quotation, ApiError> {
    let qty = payload.qty;
    let rate = payload.rate;
    Ok(Quotation {
        id: Uuid::new_v4(),
        company_name: trimmed(payload.company_name),
        date: parse_date("date", &payload.date)?,
        description: trimmed(payload.description),
        unit: trimmed(payload.unit),
        qty,
        rate,
        total: payload.total.unwrap_or(qty * rate),
    })
}

/// Sanitize a PUT body into a patch document: strings trimmed, the date
/// parsed, numbers type-checked. Unknown fields and the id are dropped.
fn build_patch(body: Value) -> Result<Map<String, Value>, ApiError> {
    let map = object_payload(body)?;
    let mut patch = Map::new();

    for (field, value) in map {
        match field.as_str() {
            "companyName" | "description" | "unit" => {
                let text = trimmed(string_field(&field, &value)?);
                patch.insert(field, Value::String(text));
            }
            "date" => {
                let date = parse_date(&field, &string_field(&field, &value)?)?;
                patch.insert(field, Value::String(date.to_rfc3339()));
            }
            "qty" | "rate" | "total" => {
                number_field(&field, &value)?;
                patch.insert(field, value);
            }
            _ => {}
        }
    }

    Ok(patch)
}

/// Routes for this resource, mounted at `/quotations`.
pub fn router(store: SharedStore<Quotation>) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .with_state(store)
}

async fn list(
    State(store): State<SharedStore<Quotation>>,
) -> Result<Json<Vec<Quotation>>, ApiError> {
    Ok(Json(store.list().await?))
}

async fn create(
    State(store): State<SharedStore<Quotation>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Quotation>), ApiError> {
    check_required(&body, REQUIRED)?;
    let payload: QuotationPayload = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid quotation payload: {e}")))?;

    let created = store.create(build(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(
    State(store): State<SharedStore<Quotation>>,
    Path(id): Path<String>,
) -> Result<Json<Quotation>, ApiError> {
    let id = parse_id(&id, Quotation::resource_label())?;
    store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(Quotation::resource_label()))
}

async fn update(
    State(store): State<SharedStore<Quotation>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Quotation>, ApiError> {
    let id = parse_id(&id, Quotation::resource_label())?;
    let patch = build_patch(body)?;
    store
        .update(&id, Value::Object(patch))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(Quotation::resource_label()))
}

async fn remove(
    State(store): State<SharedStore<Quotation>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, Quotation::resource_label())?;
    if store.delete(&id).await? {
        Ok(Json(json!({ "message": "Quotation deleted" })))
    } else {
        Err(ApiError::not_found(Quotation::resource_label()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> QuotationPayload {
        QuotationPayload {
            company_name: "  Acme  ".to_string(),
            date: "2024-01-01".to_string(),
            description: " pipe ".to_string(),
            unit: "m".to_string(),
            qty: 5.0,
            rate: 10.0,
            total: None,
        }
    }

    #[test]
    fn build_trims_strings_and_computes_total() {
        let quotation = build(payload()).unwrap();
        assert_eq!(quotation.company_name, "Acme");
        assert_eq!(quotation.description, "pipe");
        assert_eq!(quotation.total, 50.0);
    }

    #[test]
    fn build_keeps_supplied_total() {
        let mut input = payload();
        input.total = Some(47.5);
        assert_eq!(build(input).unwrap().total, 47.5);
    }

    #[test]
    fn build_rejects_bad_date() {
        let mut input = payload();
        input.date = "yesterday".to_string();
        assert!(build(input).is_err());
    }

    #[test]
    fn record_serializes_camel_case() {
        let quotation = build(payload()).unwrap();
        let json = serde_json::to_value(&quotation).unwrap();
        assert!(json.get("companyName").is_some());
        assert!(json.get("company_name").is_none());
        assert_eq!(json["id"], quotation.id.to_string());
    }

    #[test]
    fn patch_trims_and_parses() {
        let patch = build_patch(json!({
            "companyName": "  New Co ",
            "date": "2024-02-03",
            "rate": 12.5
        }))
        .unwrap();

        assert_eq!(patch["companyName"], "New Co");
        assert_eq!(patch["rate"], 12.5);
        assert_eq!(patch["date"], "2024-02-03T00:00:00+00:00");
    }

    #[test]
    fn patch_rejects_null_required_field() {
        assert!(build_patch(json!({"companyName": null})).is_err());
    }

    #[test]
    fn patch_accepts_zero_qty() {
        let patch = build_patch(json!({"qty": 0})).unwrap();
        assert_eq!(patch["qty"], 0);
    }

    #[test]
    fn patch_drops_id_and_unknown_fields() {
        let patch = build_patch(json!({"id": "x", "_id": "y", "bogus": 1, "unit": "kg"})).unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch["unit"], "kg");
    }

    #[test]
    fn patch_rejects_array_body() {
        assert!(build_patch(json!([1, 2])).is_err());
    }
}
