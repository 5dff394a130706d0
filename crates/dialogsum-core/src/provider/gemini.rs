//! Hosted-API provider (Gemini generateContent).
//!
//! Builds the request URL from API base + version + model, authenticates
//! with either a bearer token or a `key` query parameter (token wins, never
//! both), and sends the prompt as a single user turn.

use std::sync::Arc;
use std::time::Instant;

use serde_json::{Map, Value, json};

use crate::config::Settings;
use crate::error::{Result, SummarizeError};
use crate::logging::to_log_json;
use crate::provider::{ProviderOverrides, body_to_json, extract_error_message, resolve_field};

const PROVIDER: &str = "gemini";

/// Client for the Gemini generateContent API.
#[derive(Clone)]
pub struct GeminiClient {
    settings: Arc<Settings>,
    http: reqwest::Client,
}

/// Fully merged configuration for one generateContent call.
#[derive(Debug)]
struct ResolvedGeminiConfig {
    api_key: Option<String>,
    access_token: Option<String>,
    model_name: String,
    api_base: String,
    api_version: String,
    parameters: Option<Map<String, Value>>,
}

/// How a resolved config authenticates the call.
#[derive(Debug, PartialEq, Eq)]
enum Credential<'a> {
    /// `Authorization: Bearer <token>` header.
    Bearer(&'a str),
    /// `?key=<api key>` query parameter.
    QueryKey(&'a str),
}

impl GeminiClient {
    pub fn new(settings: Arc<Settings>, http: reqwest::Client) -> Self {
        Self { settings, http }
    }

    /// Resolve config, call generateContent, and extract the candidate
    /// text. Latency covers the whole sequence.
    pub async fn generate(
        &self,
        prompt: &str,
        overrides: &ProviderOverrides,
    ) -> Result<(String, u64)> {
        let start = Instant::now();

        let config = resolve_config(&self.settings, overrides)?;
        let url = build_url(&config);

        let mut payload = json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [{"text": prompt}],
                }
            ]
        });
        if let Some(parameters) = &config.parameters {
            if !parameters.is_empty() {
                payload["generationConfig"] = Value::Object(parameters.clone());
            }
        }

        let mut request = self.http.post(&url).json(&payload);
        let auth_mode;
        match credential(&config) {
            Some(Credential::Bearer(token)) => {
                auth_mode = "bearer";
                request = request.bearer_auth(token);
            }
            Some(Credential::QueryKey(key)) => {
                auth_mode = "api_key";
                request = request.query(&[("key", key)]);
            }
            // Resolution guarantees a credential; kept for completeness.
            None => auth_mode = "none",
        }

        tracing::info!(
            url = %url,
            auth = auth_mode,
            payload = %to_log_json(&payload),
            "gemini request"
        );

        let response = request.send().await.map_err(|e| SummarizeError::Transport {
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

        tracing::info!(status = status.as_u16(), body = %to_log_json(&body), "gemini response");

        if !status.is_success() {
            return Err(SummarizeError::Upstream {
                provider: PROVIDER,
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let summary = extract_text(&body);
        let latency_ms = start.elapsed().as_millis() as u64;
        Ok((summary, latency_ms))
    }
}

fn resolve_config(
    settings: &Settings,
    overrides: &ProviderOverrides,
) -> Result<ResolvedGeminiConfig> {
    let api_key = resolve_field(
        overrides.api_key.as_deref(),
        settings.gemini_api_key.as_deref(),
    );
    let access_token = resolve_field(
        overrides.access_token.as_deref(),
        settings.gemini_access_token.as_deref(),
    );
    let model_name = resolve_field(
        overrides.model_name.as_deref(),
        Some(&settings.gemini_model),
    );
    let api_base = resolve_field(overrides.api_base.as_deref(), Some(&settings.gemini_api_base))
        .unwrap_or_else(|| settings.gemini_api_base.clone());
    let api_version = resolve_field(
        overrides.api_version.as_deref(),
        Some(&settings.gemini_api_version),
    )
    .unwrap_or_else(|| settings.gemini_api_version.clone());

    if api_key.is_none() && access_token.is_none() {
        return Err(SummarizeError::config(
            "Gemini API key or OAuth access token is required",
        ));
    }
    let Some(model_name) = model_name else {
        return Err(SummarizeError::config("Gemini model name is required"));
    };

    Ok(ResolvedGeminiConfig {
        api_key,
        access_token,
        model_name,
        api_base,
        api_version,
        parameters: overrides.parameters_template.clone(),
    })
}

fn build_url(config: &ResolvedGeminiConfig) -> String {
    format!(
        "{}/{}/models/{}:generateContent",
        config.api_base.trim_end_matches('/'),
        config.api_version,
        config.model_name
    )
}

/// Access token takes precedence over the API key; never both.
fn credential(config: &ResolvedGeminiConfig) -> Option<Credential<'_>> {
    config
        .access_token
        .as_deref()
        .map(Credential::Bearer)
        .or_else(|| config.api_key.as_deref().map(Credential::QueryKey))
}

/// Scan candidates in order; the first one whose content has any non-blank
/// text part wins, with its non-blank parts joined by newlines.
fn extract_text(data: &Value) -> String {
    let candidates = data
        .get("candidates")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for candidate in candidates {
        let Some(parts) = candidate
            .get("content")
            .and_then(|content| content.get("parts"))
            .and_then(Value::as_array)
        else {
            continue;
        };

        let texts: Vec<&str> = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .filter(|text| !text.trim().is_empty())
            .collect();

        if !texts.is_empty() {
            return texts.join("\n");
        }
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides_with(f: impl FnOnce(&mut ProviderOverrides)) -> ProviderOverrides {
        let mut overrides = ProviderOverrides::default();
        f(&mut overrides);
        overrides
    }

    #[test]
    fn missing_credentials_fail_resolution() {
        let err = resolve_config(&Settings::default(), &ProviderOverrides::default()).unwrap_err();
        assert!(matches!(err, SummarizeError::Config { .. }));
        assert!(err.to_string().contains("API key or OAuth access token"));
    }

    #[test]
    fn missing_model_name_fails_resolution() {
        let settings = Settings {
            gemini_api_key: Some("k".to_owned()),
            gemini_model: String::new(),
            ..Settings::default()
        };
        let err = resolve_config(&settings, &ProviderOverrides::default()).unwrap_err();
        assert!(err.to_string().contains("model name is required"));
    }

    #[test]
    fn empty_model_override_falls_back_to_default() {
        let settings = Settings {
            gemini_api_key: Some("k".to_owned()),
            ..Settings::default()
        };
        let overrides = overrides_with(|o| o.model_name = Some(String::new()));
        let config = resolve_config(&settings, &overrides).unwrap();
        assert_eq!(config.model_name, "gemini-2.5-pro");
    }

    #[test]
    fn access_token_takes_precedence_over_api_key() {
        let settings = Settings {
            gemini_api_key: Some("key".to_owned()),
            gemini_access_token: Some("tok".to_owned()),
            ..Settings::default()
        };
        let config = resolve_config(&settings, &ProviderOverrides::default()).unwrap();
        assert_eq!(credential(&config), Some(Credential::Bearer("tok")));
    }

    #[test]
    fn api_key_alone_uses_query_parameter() {
        let settings = Settings {
            gemini_api_key: Some("key".to_owned()),
            ..Settings::default()
        };
        let config = resolve_config(&settings, &ProviderOverrides::default()).unwrap();
        assert_eq!(credential(&config), Some(Credential::QueryKey("key")));
    }

    #[test]
    fn url_is_built_from_base_version_and_model() {
        let settings = Settings {
            gemini_api_key: Some("k".to_owned()),
            ..Settings::default()
        };
        let overrides = overrides_with(|o| {
            o.api_base = Some("https://example.test/".to_owned());
            o.api_version = Some("v9".to_owned());
            o.model_name = Some("m-1".to_owned());
        });
        let config = resolve_config(&settings, &overrides).unwrap();
        assert_eq!(
            build_url(&config),
            "https://example.test/v9/models/m-1:generateContent"
        );
    }

    #[test]
    fn first_candidate_with_nonblank_parts_wins() {
        let data = json!({
            "candidates": [
                {"content": {"parts": [{"text": "  "}, {"inlineData": {}}]}},
                {"content": {"parts": [{"text": "one"}, {"text": ""}, {"text": "two"}]}},
                {"content": {"parts": [{"text": "ignored"}]}},
            ]
        });
        assert_eq!(extract_text(&data), "one\ntwo");
    }

    #[test]
    fn no_usable_candidates_yield_empty_string() {
        assert_eq!(extract_text(&json!({})), "");
        assert_eq!(extract_text(&json!({"candidates": []})), "");
        assert_eq!(
            extract_text(&json!({"candidates": [{"content": {}}]})),
            ""
        );
    }
}
