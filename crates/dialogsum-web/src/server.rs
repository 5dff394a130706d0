//! Web server setup and startup.
//!
//! [`WebServer`] composes the Axum router, applies the CORS allow-list and
//! body-size limit, and starts the HTTP listener.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower_http::cors::CorsLayer;

use crate::WebConfig;
use crate::api;
use crate::state::AppState;

/// Uploaded export files can be large; match the original 25 MB cap.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

/// The dialogsum web server.
pub struct WebServer {
    config: WebConfig,
    state: Arc<AppState>,
}

impl WebServer {
    /// Create a new web server over shared application state.
    pub fn new(config: WebConfig, state: Arc<AppState>) -> Self {
        Self { config, state }
    }

    /// Return the `host:port` string this server will bind to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.config.bind_addr, self.config.port)
    }

    /// Build the Axum router with all routes registered.
    ///
    /// Public so tests can serve the same router on an ephemeral port.
    pub fn router(&self) -> Router {
        let origins: Vec<HeaderValue> = self
            .state
            .settings
            .cors_origin_list()
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        let cors = CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true);

        Router::new()
            .route("/api/health", get(api::health))
            .route("/api/parse", post(api::parse))
            .route("/api/summarize", post(api::summarize))
            .route("/api/summarize-batch", post(api::summarize_batch))
            .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
            .layer(cors)
            .with_state(Arc::clone(&self.state))
    }

    /// Start the server and block until it is shut down.
    ///
    /// # Errors
    ///
    /// Returns an error if the TCP listener cannot be bound.
    pub async fn start(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.addr();
        let router = self.router();

        tracing::info!(addr = %addr, "starting web server");

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
