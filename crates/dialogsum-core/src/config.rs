//! Environment-sourced service configuration.
//!
//! [`Settings`] is loaded once at process start from `DIALOGSUM_*` variables
//! and shared read-only across requests. Optional variables that are set but
//! empty load as `None`, matching the fallback semantics of the config
//! resolvers: an empty value never shadows a default.

use serde_json::{Map, Value};

use crate::error::{Result, SummarizeError};

/// Prefix for every service environment variable.
const ENV_PREFIX: &str = "DIALOGSUM_";

/// Service-wide defaults, loaded once and never mutated by request handling.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Human-readable service name, used in startup logs.
    pub app_name: String,

    /// Default provider when the request does not name one
    /// (`mock` | `vertex` | `gemini`).
    pub model_provider: String,

    pub vertex_project_id: Option<String>,
    pub vertex_location: String,
    pub vertex_endpoint_id: Option<String>,
    /// Bearer token for the Vertex prediction endpoint. The original service
    /// pulled this from ambient Google credentials; here it is supplied via
    /// environment or per-request override.
    pub vertex_access_token: Option<String>,
    /// Default instance template as literal JSON text, parsed at resolution
    /// time so a malformed value surfaces on the request that needs it.
    pub vertex_instance_template: String,
    /// Default parameters template as literal JSON text.
    pub vertex_parameters_template: String,

    pub gemini_api_key: Option<String>,
    pub gemini_access_token: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub gemini_api_version: String,

    /// Outbound request timeout, applied uniformly to all providers.
    pub request_timeout_sec: u64,

    /// Comma-separated allow-list of CORS origins.
    pub cors_origins: String,

    /// Canned reply returned by the mock provider.
    pub mock_reply: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "Dialogsum".to_owned(),
            model_provider: "mock".to_owned(),
            vertex_project_id: None,
            vertex_location: "us-central1".to_owned(),
            vertex_endpoint_id: None,
            vertex_access_token: None,
            vertex_instance_template: r#"{"prompt": "{prompt}"}"#.to_owned(),
            vertex_parameters_template: r#"{"temperature": 0.2, "maxOutputTokens": 512}"#
                .to_owned(),
            gemini_api_key: None,
            gemini_access_token: None,
            gemini_model: "gemini-2.5-pro".to_owned(),
            gemini_api_base: "https://aiplatform.googleapis.com".to_owned(),
            gemini_api_version: "v1/publishers/google".to_owned(),
            request_timeout_sec: 60,
            cors_origins: "http://localhost:5173".to_owned(),
            mock_reply: "Mock summary".to_owned(),
        }
    }
}

impl Settings {
    /// Load settings from the environment, falling back to defaults for
    /// anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            app_name: env_or("APP_NAME", defaults.app_name),
            model_provider: env_or("MODEL_PROVIDER", defaults.model_provider),
            vertex_project_id: env_opt("VERTEX_PROJECT_ID"),
            vertex_location: env_or("VERTEX_LOCATION", defaults.vertex_location),
            vertex_endpoint_id: env_opt("VERTEX_ENDPOINT_ID"),
            vertex_access_token: env_opt("VERTEX_ACCESS_TOKEN"),
            vertex_instance_template: env_or(
                "VERTEX_INSTANCE_TEMPLATE",
                defaults.vertex_instance_template,
            ),
            vertex_parameters_template: env_or(
                "VERTEX_PARAMETERS_TEMPLATE",
                defaults.vertex_parameters_template,
            ),
            gemini_api_key: env_opt("GEMINI_API_KEY"),
            gemini_access_token: env_opt("GEMINI_ACCESS_TOKEN"),
            gemini_model: env_or("GEMINI_MODEL", defaults.gemini_model),
            gemini_api_base: env_or("GEMINI_API_BASE", defaults.gemini_api_base),
            gemini_api_version: env_or("GEMINI_API_VERSION", defaults.gemini_api_version),
            request_timeout_sec: env_opt("REQUEST_TIMEOUT_SEC")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.request_timeout_sec),
            cors_origins: env_or("CORS_ORIGINS", defaults.cors_origins),
            mock_reply: env_or("MOCK_REPLY", defaults.mock_reply),
        }
    }

    /// Parse a default JSON template string into an object map.
    ///
    /// A malformed or non-object template is a configuration error, but it
    /// is surfaced on the request that triggers resolution, since templates
    /// are parsed per call.
    pub fn parse_json_template(&self, value: &str, field: &str) -> Result<Map<String, Value>> {
        let parsed: Value = serde_json::from_str(value).map_err(|e| {
            SummarizeError::config(format!("Invalid JSON template in {field}: {e}"))
        })?;

        match parsed {
            Value::Object(map) => Ok(map),
            _ => Err(SummarizeError::config(format!(
                "{field} must be a JSON object"
            ))),
        }
    }

    /// Split the configured CORS origins into a trimmed, non-empty list.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect()
    }
}

fn env_or(name: &str, default: String) -> String {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
}

fn env_opt(name: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{name}"))
        .ok()
        .filter(|v| !v.is_empty())
}
