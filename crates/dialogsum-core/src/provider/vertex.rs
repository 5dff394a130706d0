//! Remote-deployment provider (Vertex endpoint predictions).
//!
//! Issues a single synchronous `:predict` call against a model deployed
//! behind a Vertex endpoint. The request body is built from JSON templates
//! with `{prompt}` substitution; the response shape varies by deployed
//! model, so text extraction probes a fixed list of candidate keys.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value, json};

use crate::config::Settings;
use crate::error::{Result, SummarizeError};
use crate::logging::to_log_json;
use crate::provider::{ProviderOverrides, body_to_json, extract_error_message, resolve_field};
use crate::template::render_map;

const PROVIDER: &str = "vertex";

/// Keys probed, in order, for text on a prediction object.
const PREDICTION_TEXT_KEYS: &[&str] = &[
    "content",
    "text",
    "output",
    "prediction",
    "generated_text",
    "response",
];

/// Keys probed on the first nested candidate.
const CANDIDATE_TEXT_KEYS: &[&str] = &["content", "text", "output"];

/// Client for models deployed behind a Vertex prediction endpoint.
#[derive(Clone)]
pub struct VertexClient {
    settings: Arc<Settings>,
    http: reqwest::Client,
}

/// Fully merged configuration for one predict call. Never partially
/// filled: resolution either succeeds completely or fails.
#[derive(Debug)]
struct ResolvedVertexConfig {
    project_id: String,
    endpoint_id: String,
    location: String,
    instance_template: Map<String, Value>,
    parameters_template: Map<String, Value>,
}

impl VertexClient {
    pub fn new(settings: Arc<Settings>, http: reqwest::Client) -> Self {
        Self { settings, http }
    }

    /// Resolve config, render the payload templates, call the endpoint,
    /// and extract the prediction text. Latency covers the whole sequence.
    pub async fn predict(
        &self,
        prompt: &str,
        overrides: &ProviderOverrides,
    ) -> Result<(String, u64)> {
        let start = Instant::now();

        let config = resolve_config(&self.settings, overrides)?;
        let instance = render_map(&config.instance_template, prompt);
        let parameters = render_map(&config.parameters_template, prompt);
        let token = self.access_token(overrides)?;

        let endpoint = format!(
            "projects/{}/locations/{}/endpoints/{}",
            config.project_id, config.location, config.endpoint_id
        );
        let url = format!(
            "https://{}-aiplatform.googleapis.com/v1/{}:predict",
            config.location, endpoint
        );
        let body = json!({
            "instances": [instance],
            "parameters": parameters,
        });

        tracing::info!(
            endpoint = %endpoint,
            payload = %to_log_json(&body),
            "vertex request"
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .map_err(|e| SummarizeError::Transport {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SummarizeError::Transport {
                provider: PROVIDER,
                reason: format!("failed to read response body: {e}"),
            })?;
        let body = body_to_json(&text);

        tracing::info!(status = status.as_u16(), body = %to_log_json(&body), "vertex response");

        if !status.is_success() {
            return Err(SummarizeError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let predictions = body
            .get("predictions")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let summary = extract_prediction_text(predictions);
        let latency_ms = start.elapsed().as_millis() as u64;
        Ok((summary, latency_ms))
    }

    /// Bearer token for the prediction endpoint: per-request override, else
    /// the service-level token.
    fn access_token(&self, overrides: &ProviderOverrides) -> Result<String> {
        resolve_field(
            overrides.access_token.as_deref(),
            self.settings.vertex_access_token.as_deref(),
        )
        .ok_or_else(|| SummarizeError::config("Vertex access token is required"))
    }
}

fn resolve_config(
    settings: &Settings,
    overrides: &ProviderOverrides,
) -> Result<ResolvedVertexConfig> {
    let project_id = resolve_field(
        overrides.project_id.as_deref(),
        settings.vertex_project_id.as_deref(),
    );
    let endpoint_id = resolve_field(
        overrides.endpoint_id.as_deref(),
        settings.vertex_endpoint_id.as_deref(),
    );
    let location = resolve_field(
        overrides.location.as_deref(),
        Some(&settings.vertex_location),
    )
    .unwrap_or_else(|| settings.vertex_location.clone());

    let (Some(project_id), Some(endpoint_id)) = (project_id, endpoint_id) else {
        return Err(SummarizeError::config(
            "Vertex project_id and endpoint_id are required",
        ));
    };

    // An explicitly supplied template is used as-is, no merge with the
    // default; only an absent override falls back to parsing the default
    // template text.
    let instance_template = match &overrides.instance_template {
        Some(template) => template.clone(),
        None => settings.parse_json_template(
            &settings.vertex_instance_template,
            "DIALOGSUM_VERTEX_INSTANCE_TEMPLATE",
        )?,
    };
    let parameters_template = match &overrides.parameters_template {
        Some(template) => template.clone(),
        None => settings.parse_json_template(
            &settings.vertex_parameters_template,
            "DIALOGSUM_VERTEX_PARAMETERS_TEMPLATE",
        )?,
    };

    Ok(ResolvedVertexConfig {
        project_id,
        endpoint_id,
        location,
        instance_template,
        parameters_template,
    })
}

/// Extract text from the first prediction.
///
/// Order: a bare string is used directly; then the fixed key list; then the
/// first nested candidate (string or keyed object); finally the whole value
/// stringified. No predictions at all yields an empty string.
fn extract_prediction_text(predictions: &[Value]) -> String {
    let Some(first) = predictions.first() else {
        return String::new();
    };

    if let Value::String(s) = first {
        return s.clone();
    }

    if let Value::Object(map) = first {
        for key in PREDICTION_TEXT_KEYS {
            if let Some(Value::String(s)) = map.get(*key) {
                return s.clone();
            }
        }

        if let Some(Value::Array(candidates)) = map.get("candidates") {
            match candidates.first() {
                Some(Value::String(s)) => return s.clone(),
                Some(Value::Object(candidate)) => {
                    for key in CANDIDATE_TEXT_KEYS {
                        if let Some(Value::String(s)) = candidate.get(*key) {
                            return s.clone();
                        }
                    }
                }
                _ => {}
            }
        }
    }

    first.to_string()
}
