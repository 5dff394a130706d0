//! REST API route handlers.
//!
//! Payload shapes match the original service exactly. Every engine error is
//! mapped to an HTTP status plus a `{"detail": <message>}` body; raw
//! transport errors never reach the caller.

use std::sync::Arc;

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use dialogsum_core::logging::to_log_json;
use dialogsum_core::{Dialog, ModelConfig, PromptConfig, SummarizeError, load_dialogs};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Request body for `POST /api/summarize`.
#[derive(Debug, Deserialize)]
pub struct SummarizeRequest {
    pub dialog: Dialog,
    pub prompt: PromptConfig,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub model: Option<ModelConfig>,
}

/// Response body for `POST /api/summarize`.
#[derive(Debug, Serialize)]
pub struct SummarizeResponse {
    pub summary: String,
    pub latency_ms: u64,
    pub provider: &'static str,
}

/// Request body for `POST /api/summarize-batch`.
#[derive(Debug, Deserialize)]
pub struct BatchSummarizeRequest {
    pub dialogs: Vec<Dialog>,
    pub prompt: PromptConfig,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
    #[serde(default)]
    pub model: Option<ModelConfig>,
}

/// One item of a batch response.
#[derive(Debug, Serialize)]
pub struct BatchSummarizeResponseItem {
    pub dialog_id: String,
    pub summary: String,
    pub latency_ms: u64,
    pub provider: &'static str,
}

/// Response body for `POST /api/summarize-batch`.
#[derive(Debug, Serialize)]
pub struct BatchSummarizeResponse {
    pub items: Vec<BatchSummarizeResponseItem>,
}

/// Response body for `POST /api/parse`.
#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub dialogs: Vec<Dialog>,
}

// ---------------------------------------------------------------------------
// GET /api/health
// ---------------------------------------------------------------------------

/// Liveness plus the configured default provider.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "provider": state.settings.model_provider,
    }))
}

// ---------------------------------------------------------------------------
// POST /api/parse
// ---------------------------------------------------------------------------

/// Normalize uploaded dialog-export JSON into the internal dialog shape.
pub async fn parse(body: Bytes) -> impl IntoResponse {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"detail": format!("Failed to parse JSON: {e}")})),
            );
        }
    };

    match load_dialogs(&payload) {
        Ok(dialogs) => {
            let response = ParseResponse { dialogs };
            (StatusCode::OK, Json(json!(response)))
        }
        Err(e) => error_response(&e),
    }
}

// ---------------------------------------------------------------------------
// POST /api/summarize
// ---------------------------------------------------------------------------

/// Summarize one dialog with the selected provider.
pub async fn summarize(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SummarizeRequest>,
) -> impl IntoResponse {
    let request_id = short_request_id();
    tracing::info!(
        id = %request_id,
        dialog_id = %request.dialog.dialog_id,
        model = %to_log_json(&json!(request.model)),
        "model request"
    );

    let result = state
        .router
        .summarize(
            &request.dialog,
            &request.prompt,
            request.model.as_ref(),
            request.parameters.as_ref(),
        )
        .await;

    match result {
        Ok(summary) => {
            tracing::info!(
                id = %request_id,
                provider = summary.provider,
                latency_ms = summary.latency_ms,
                "model response"
            );
            let response = SummarizeResponse {
                summary: summary.summary,
                latency_ms: summary.latency_ms,
                provider: summary.provider,
            };
            (StatusCode::OK, Json(json!(response)))
        }
        Err(e) => {
            tracing::error!(id = %request_id, error = %e, "model error");
            error_response(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// POST /api/summarize-batch
// ---------------------------------------------------------------------------

/// Summarize a list of dialogs sequentially with shared prompt/overrides.
///
/// Fails the whole batch on the first error: no partial results are
/// returned.
pub async fn summarize_batch(
    State(state): State<Arc<AppState>>,
    Json(request): Json<BatchSummarizeRequest>,
) -> impl IntoResponse {
    let request_id = short_request_id();
    tracing::info!(
        id = %request_id,
        dialog_count = request.dialogs.len(),
        "batch request"
    );

    let result = state
        .router
        .summarize_batch(
            &request.dialogs,
            &request.prompt,
            request.model.as_ref(),
            request.parameters.as_ref(),
        )
        .await;

    match result {
        Ok(items) => {
            tracing::info!(id = %request_id, items = items.len(), "batch response");
            let response = BatchSummarizeResponse {
                items: items
                    .into_iter()
                    .map(|item| BatchSummarizeResponseItem {
                        dialog_id: item.dialog_id,
                        summary: item.summary,
                        latency_ms: item.latency_ms,
                        provider: item.provider,
                    })
                    .collect(),
            };
            (StatusCode::OK, Json(json!(response)))
        }
        Err(e) => {
            tracing::error!(id = %request_id, error = %e, "batch error");
            error_response(&e)
        }
    }
}

// ---------------------------------------------------------------------------
// Error mapping
// ---------------------------------------------------------------------------

/// Map an engine error to an HTTP status and a `{"detail": ...}` body.
fn error_response(err: &SummarizeError) -> (StatusCode, Json<Value>) {
    let status = match err {
        SummarizeError::Validation { .. } | SummarizeError::UnsupportedProvider { .. } => {
            StatusCode::BAD_REQUEST
        }
        SummarizeError::Config { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        SummarizeError::Upstream { .. } | SummarizeError::Transport { .. } => {
            StatusCode::BAD_GATEWAY
        }
    };
    (status, Json(json!({"detail": err.to_string()})))
}

/// Short correlation id for request/response log lines.
fn short_request_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_owned()
}
