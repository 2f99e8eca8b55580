//! Tax invoice records and routes.
//!
//! The widest schema of the five resources; every field is required on
//! creation. `totalPrice` is supplied by the caller, not derived, because
//! invoices may carry rounding or negotiated amounts.

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

/// An issued tax invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxInvoice {
    pub id: Uuid,
    pub invoice_no: String,
    pub work_order_no: String,
    pub invoice_date: DateTime<Utc>,
    pub item_description: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub total_price: f64,
    pub tax_rate: f64,
    pub invoice_status: String,
    pub due_date: DateTime<Utc>,
}

impl Record for TaxInvoice {
    fn resource_name() -> &'static str {
        "taxInvoices"
    }

    fn resource_label() -> &'static str {
        "Tax invoice"
    }

    fn collection() -> &'static str {
        "tax_invoices"
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

const REQUIRED: &[&str] = &[
    "invoiceNo",
    "workOrderNo",
    "invoiceDate",
    "itemDescription",
    "quantity",
    "unitPrice",
    "totalPrice",
    "taxRate",
    "invoiceStatus",
    "dueDate",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaxInvoicePayload {
    invoice_no: String,
    work_order_no: String,
    invoice_date: String,
    item_description: String,
    quantity: f64,
    unit_price: f64,
    total_price: f64,
    tax_rate: f64,
    invoice_status: String,
    due_date: String,
}

fn build(payload: TaxInvoicePayload) -> Result<TaxInvoice, ApiError> {
    Ok(TaxInvoice {
        id: Uuid::new_v4(),
        invoice_no: trimmed(payload.invoice_no),
        work_order_no: trimmed(payload.work_order_no),
        invoice_date: parse_date("invoiceDate", &payload.invoice_date)?,
        item_description: trimmed(payload.item_description),
        quantity: payload.quantity,
        unit_price: payload.unit_price,
        total_price: payload.total_price,
        tax_rate: payload.tax_rate,
        invoice_status: trimmed(payload.invoice_status),
        due_date: parse_date("dueDate", &payload.due_date)?,
    })
}

fn build_patch(body: Value) -> Result<Map<String, Value>, ApiError> {
    let map = object_payload(body)?;
    let mut patch = Map::new();

    for (field, value) in map {
        match field.as_str() {
            "invoiceNo" | "workOrderNo" | "itemDescription" | "invoiceStatus" => {
                let text = trimmed(string_field(&field, &value)?);
                patch.insert(field, Value::String(text));
            }
            "invoiceDate" | "dueDate" => {
                let date = parse_date(&field, &string_field(&field, &value)?)?;
                patch.insert(field, Value::String(date.to_rfc3339()));
            }
            "quantity" | "unitPrice" | "totalPrice" | "taxRate" => {
                number_field(&field, &value)?;
                patch.insert(field, value);
            }
            _ => {}
        }
    }

    Ok(patch)
}

/// Routes for this resource, mounted at `/taxInvoices`.
pub fn router(store: SharedStore<TaxInvoice>) -> Router {
    Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(remove))
        .with_state(store)
}

async fn list(
    State(store): State<SharedStore<TaxInvoice>>,
) -> Result<Json<Vec<TaxInvoice>>, ApiError> {
    Ok(Json(store.list().await?))
}

async fn create(
    State(store): State<SharedStore<TaxInvoice>>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<TaxInvoice>), ApiError> {
    check_required(&body, REQUIRED)?;
    let payload: TaxInvoicePayload = serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid tax invoice payload: {e}")))?;

    let created = store.create(build(payload)?).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn get_one(
    State(store): State<SharedStore<TaxInvoice>>,
    Path(id): Path<String>,
) -> Result<Json<TaxInvoice>, ApiError> {
    let id = parse_id(&id, TaxInvoice::resource_label())?;
    store
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(TaxInvoice::resource_label()))
}

async fn update(
    State(store): State<SharedStore<TaxInvoice>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<TaxInvoice>, ApiError> {
    let id = parse_id(&id, TaxInvoice::resource_label())?;
    let patch = build_patch(body)?;
    store
        .update(&id, Value::Object(patch))
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(TaxInvoice::resource_label()))
}

async fn remove(
    State(store): State<SharedStore<TaxInvoice>>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&id, TaxInvoice::resource_label())?;
    if store.delete(&id).await? {
        Ok(Json(json!({ "message": "Tax invoice deleted" })))
    } else {
        Err(ApiError::not_found(TaxInvoice::resource_label()))
    }
}
