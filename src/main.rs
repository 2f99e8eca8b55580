use anyhow::{Context, Result};
use mongodb::Client;
use mongodb::bson::doc;
use tracing_subscriber::EnvFilter;

use sitebook::config::AppConfig;
use sitebook::server::{self, AppStores};

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = AppConfig::from_env()?;

    let client = Client::with_uri_str(&config.mongo_uri)
        .await
        .context("MongoDB connection error")?;
    let database = client.database(&config.database);

    // The driver connects lazily; ping so a bad URI fails startup instead
    // of the first request.
    database
        .run_command(doc! { "ping": 1 })
        .await
        .context("MongoDB connection error")?;
    tracing::info!("MongoDB connected");

    let app = server::build_router(AppStores::mongo(&database));
    server::serve(app, config.port).await
}
