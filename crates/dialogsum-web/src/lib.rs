//! HTTP API for the dialog summarization service.
//!
//! Exposes the engine from `dialogsum-core` over a small REST surface:
//!
//! - `GET  /api/health` -- liveness plus the configured default provider.
//! - `POST /api/parse` -- normalize an uploaded dialog-export JSON file.
//! - `POST /api/summarize` -- summarize one dialog.
//! - `POST /api/summarize-batch` -- summarize a list of dialogs sequentially.

pub mod api;
pub mod server;
pub mod state;

pub use server::WebServer;
pub use state::AppState;

/// Web server configuration.
#[derive(Debug, Clone)]
pub struct WebConfig {
    /// The address to bind the HTTP server to.
    pub bind_addr: String,
    /// The port to listen on.
    pub port: u16,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            port: 8000,
        }
    }
}
