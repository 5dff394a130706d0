//! Service entry point.
//!
//! Loads `.env`, initializes tracing, reads the service settings, and
//! serves the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use dialogsum_core::{ProviderRouter, Settings};
use dialogsum_web::{AppState, WebConfig, WebServer};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("info");

    let settings = Arc::new(Settings::from_env());
    tracing::info!(
        app = %settings.app_name,
        provider = %settings.model_provider,
        "starting service"
    );

    let router = ProviderRouter::new(Arc::clone(&settings))
        .context("failed to build provider router")?;
    let state = Arc::new(AppState { settings, router });

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000);
    let config = WebConfig {
        bind_addr: "0.0.0.0".into(),
        port,
    };

    WebServer::new(config, state)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!(e))?;

    Ok(())
}

/// Initialize the tracing subscriber, honoring `RUST_LOG` when set.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
