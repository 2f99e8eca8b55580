//! HTTP composition root.
//!
//! Builds the full application router from explicitly constructed store
//! handles. Nothing here is global: tests hand in in-memory stores, the
//! binary hands in Mongo-backed ones over a shared database handle.

use std::sync::Arc;

use anyhow::Result;
use axum::routing::get;
use axum::{Json, Router};
use mongodb::Database;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::core::{Record, SharedStore};
use crate::entities::material_in::{self, MaterialIn};
use crate::entities::material_out::{self, MaterialOut};
use crate::entities::quotation::{self, Quotation};
use crate::entities::site_entry::{self, SiteEntry};
use crate::entities::tax_invoice::{self, TaxInvoice};
use crate::storage::{InMemoryRecordStore, MongoRecordStore};

/// The store handles the router is composed from, one per resource.
pub struct AppStores {
    pub material_in: SharedStore<MaterialIn>,
    pub material_out: SharedStore<MaterialOut>,
    pub quotations: SharedStore<Quotation>,
    pub site_entries: SharedStore<SiteEntry>,
    pub tax_invoices: SharedStore<TaxInvoice>,
}

impl AppStores {
    /// Mongo-backed stores over a shared database handle.
    pub fn mongo(database: &Database) -> Self {
        Self {
            material_in: Arc::new(MongoRecordStore::new(database.clone())),
            material_out: Arc::new(MongoRecordStore::new(database.clone())),
            quotations: Arc::new(MongoRecordStore::new(database.clone())),
            site_entries: Arc::new(MongoRecordStore::new(database.clone())),
            tax_invoices: Arc::new(MongoRecordStore::new(database.clone())),
        }
    }

    /// In-memory stores, for tests and local development.
    pub fn in_memory() -> Self {
        Self {
            material_in: Arc::new(InMemoryRecordStore::new()),
            material_out: Arc::new(InMemoryRecordStore::new()),
            quotations: Arc::new(InMemoryRecordStore::new()),
            site_entries: Arc::new(InMemoryRecordStore::new()),
            tax_invoices: Arc::new(InMemoryRecordStore::new()),
        }
    }
}

fn base_path<T: Record>() -> String {
    format!("/{}", T::resource_name())
}

/// Build the full application router: the five resource routers at their
/// base paths, liveness probes, CORS and request tracing.
pub fn build_router(stores: AppStores) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .nest(
            &base_path::<MaterialIn>(),
            material_in::router(stores.material_in),
        )
        .nest(
            &base_path::<MaterialOut>(),
            material_out::router(stores.material_out),
        )
        .nest(
            &base_path::<Quotation>(),
            quotation::router(stores.quotations),
        )
        .nest(
            &base_path::<SiteEntry>(),
            site_entry::router(stores.site_entries),
        )
        .nest(
            &base_path::<TaxInvoice>(),
            tax_invoice::router(stores.tax_invoices),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "sitebook"
    }))
}

/// Bind the listener and serve until shutdown.
pub async fn serve(router: Router, port: u16) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router).await?;
    Ok(())
}
