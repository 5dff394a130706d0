//! Shared application state.
//!
//! [`AppState`] is wrapped in an `Arc` and shared across all request
//! handlers. Settings are read-only after startup; the provider router
//! carries no per-request state, so nothing here is mutated by requests.

use std::sync::Arc;

use dialogsum_core::{ProviderRouter, Settings};

/// Shared state accessible from every Axum handler.
pub struct AppState {
    /// Service-wide defaults, loaded once from the environment.
    pub settings: Arc<Settings>,

    /// Dispatches summarize calls to the selected provider.
    pub router: ProviderRouter,
}
