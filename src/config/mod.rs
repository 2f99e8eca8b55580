//! Environment configuration, read once at startup.

use std::env;

use anyhow::{Context, Result};
use tracing::info;

/// Runtime configuration for the service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port (`PORT`, default 5000).
    pub port: u16,
    /// MongoDB connection string (`MONGO_URI`, required).
    pub mongo_uri: String,
    /// Database name (`MONGO_DB`, default "sitebook").
    pub database: String,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// Fails when `MONGO_URI` is absent or `PORT` is not a valid port
    /// number; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            Err(_) => {
                info!("PORT not set, using default: 5000");
                5000
            }
        };

        let mongo_uri = env::var("MONGO_URI").context("MONGO_URI must be set")?;

        let database = env::var("MONGO_DB").unwrap_or_else(|_| {
            info!("MONGO_DB not set, using default: sitebook");
            "sitebook".to_string()
        });

        Ok(Self {
            port,
            mongo_uri,
            database,
        })
    }
}
