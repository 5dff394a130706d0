//! Provider dispatch.
//!
//! One logical `summarize` operation fans out to one of several
//! differently-shaped provider APIs. [`ProviderKind`] is the tagged dispatch
//! key (lowercased provider name), [`ProviderOverrides`] carries the sparse
//! per-call configuration, and [`ProviderRouter`] owns one client per
//! provider and routes each request.

pub mod gemini;
pub mod mock;
pub mod vertex;

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value, json};

use crate::config::Settings;
use crate::error::{Result, SummarizeError};
use crate::prompt::build_prompt;
use crate::types::{Dialog, ModelConfig, PromptConfig};

pub use gemini::GeminiClient;
pub use mock::MockClient;
pub use vertex::VertexClient;

/// Identifies which provider handles a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    /// Local canned-reply provider, no network call.
    Mock,
    /// Remote-deployment family: a model deployed behind a Vertex endpoint.
    Vertex,
    /// Hosted-API family: the Gemini generateContent API.
    Gemini,
}

impl ProviderKind {
    /// Parse a provider name, case-insensitively.
    pub fn from_name(name: &str) -> Result<Self> {
        let normalized = name.to_ascii_lowercase();
        match normalized.as_str() {
            "mock" => Ok(Self::Mock),
            "vertex" => Ok(Self::Vertex),
            "gemini" => Ok(Self::Gemini),
            _ => Err(SummarizeError::UnsupportedProvider { name: normalized }),
        }
    }

    /// Canonical lowercase name, as reported in responses.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Vertex => "vertex",
            Self::Gemini => "gemini",
        }
    }
}

/// Sparse per-call configuration overrides.
///
/// `None` means "not supplied": the config resolvers fall back to service
/// defaults. A present-but-empty string also falls back (deliberate quirk,
/// see the resolver tests), but templates are used as-is whenever present.
#[derive(Debug, Clone, Default)]
pub struct ProviderOverrides {
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub model_name: Option<String>,
    pub api_base: Option<String>,
    pub api_version: Option<String>,
    pub project_id: Option<String>,
    pub location: Option<String>,
    pub endpoint_id: Option<String>,
    pub instance_template: Option<Map<String, Value>>,
    pub parameters_template: Option<Map<String, Value>>,
}

/// The outcome of one summarize call.
#[derive(Debug, Clone)]
pub struct Summary {
    pub summary: String,
    pub latency_ms: u64,
    pub provider: &'static str,
}

/// One entry of a batch summarize result.
#[derive(Debug, Clone)]
pub struct BatchItem {
    pub dialog_id: String,
    pub summary: String,
    pub latency_ms: u64,
    pub provider: &'static str,
}

/// Routes summarize requests to the provider selected by name.
///
/// Holds one client per provider; all remote clients share a single
/// `reqwest::Client` carrying the service-wide timeout.
#[derive(Clone)]
pub struct ProviderRouter {
    settings: Arc<Settings>,
    mock: MockClient,
    vertex: VertexClient,
    gemini: GeminiClient,
}

impl ProviderRouter {
    /// Build the router and its HTTP client.
    pub fn new(settings: Arc<Settings>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_sec))
            .build()
            .map_err(|e| SummarizeError::config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            mock: MockClient::new(Arc::clone(&settings)),
            vertex: VertexClient::new(Arc::clone(&settings), http.clone()),
            gemini: GeminiClient::new(Arc::clone(&settings), http),
            settings,
        })
    }

    /// Select the provider: explicit request override wins over the
    /// service default; unknown names are rejected.
    pub fn resolve_kind(&self, model: Option<&ModelConfig>) -> Result<ProviderKind> {
        let name = model
            .and_then(|m| m.provider.as_deref())
            .filter(|p| !p.is_empty())
            .unwrap_or(&self.settings.model_provider);
        ProviderKind::from_name(name)
    }

    /// Build the override set from a request's model-config block plus the
    /// optional extra-parameters map.
    ///
    /// Every present field is copied verbatim. Extra parameters are
    /// shallow-merged on top of the request's parameters template (or, when
    /// that is absent, the parsed service-default parameters template);
    /// request keys win on conflict.
    pub fn build_overrides(
        &self,
        model: Option<&ModelConfig>,
        parameters: Option<&Map<String, Value>>,
    ) -> Result<ProviderOverrides> {
        let mut overrides = ProviderOverrides::default();

        if let Some(model) = model {
            overrides.api_key = model.api_key.clone();
            overrides.access_token = model.access_token.clone();
            overrides.model_name = model.model_name.clone();
            overrides.api_base = model.api_base.clone();
            overrides.api_version = model.api_version.clone();
            overrides.project_id = model.project_id.clone();
            overrides.location = model.location.clone();
            overrides.endpoint_id = model.endpoint_id.clone();
            overrides.instance_template = model.instance_template.clone();
            overrides.parameters_template = model.parameters_template.clone();
        }

        if let Some(parameters) = parameters {
            let mut base = match model.and_then(|m| m.parameters_template.as_ref()) {
                Some(template) => template.clone(),
                None => self.settings.parse_json_template(
                    &self.settings.vertex_parameters_template,
                    "DIALOGSUM_VERTEX_PARAMETERS_TEMPLATE",
                )?,
            };
            for (key, value) in parameters {
                base.insert(key.clone(), value.clone());
            }
            overrides.parameters_template = Some(base);
        }

        Ok(overrides)
    }

    /// Summarize one dialog.
    pub async fn summarize(
        &self,
        dialog: &Dialog,
        prompt: &PromptConfig,
        model: Option<&ModelConfig>,
        parameters: Option<&Map<String, Value>>,
    ) -> Result<Summary> {
        let kind = self.resolve_kind(model)?;
        let prompt_text = build_prompt(dialog, prompt);

        if kind == ProviderKind::Mock {
            let (summary, latency_ms) = self.mock.generate(&prompt_text);
            return Ok(Summary {
                summary,
                latency_ms,
                provider: kind.as_str(),
            });
        }

        let overrides = self.build_overrides(model, parameters)?;
        let (summary, latency_ms) = self.generate(kind, &prompt_text, &overrides).await?;
        Ok(Summary {
            summary,
            latency_ms,
            provider: kind.as_str(),
        })
    }

    /// Summarize a batch of dialogs sequentially, in input order.
    ///
    /// The provider is validated and the override set built once, up front;
    /// the first per-dialog failure aborts the whole batch with no partial
    /// results.
    pub async fn summarize_batch(
        &self,
        dialogs: &[Dialog],
        prompt: &PromptConfig,
        model: Option<&ModelConfig>,
        parameters: Option<&Map<String, Value>>,
    ) -> Result<Vec<BatchItem>> {
        let kind = self.resolve_kind(model)?;
        let overrides = match kind {
            ProviderKind::Mock => ProviderOverrides::default(),
            _ => self.build_overrides(model, parameters)?,
        };

        let mut items = Vec::with_capacity(dialogs.len());
        for dialog in dialogs {
            let prompt_text = build_prompt(dialog, prompt);
            let (summary, latency_ms) = match kind {
                ProviderKind::Mock => self.mock.generate(&prompt_text),
                _ => self.generate(kind, &prompt_text, &overrides).await?,
            };
            items.push(BatchItem {
                dialog_id: dialog.dialog_id.clone(),
                summary,
                latency_ms,
                provider: kind.as_str(),
            });
        }

        Ok(items)
    }

    async fn generate(
        &self,
        kind: ProviderKind,
        prompt_text: &str,
        overrides: &ProviderOverrides,
    ) -> Result<(String, u64)> {
        match kind {
            ProviderKind::Mock => Ok(self.mock.generate(prompt_text)),
            ProviderKind::Vertex => self.vertex.predict(prompt_text, overrides).await,
            ProviderKind::Gemini => self.gemini.generate(prompt_text, overrides).await,
        }
    }
}

// ── shared resolver/response helpers ────────────────────────────────

/// Field resolution rule, uniform across providers: use the override when
/// present and non-empty, else the service default.
pub(crate) fn resolve_field(
    override_value: Option<&str>,
    default: Option<&str>,
) -> Option<String> {
    override_value
        .filter(|v| !v.is_empty())
        .or(default)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Read a provider response body as JSON: an empty body becomes `{}`, a
/// non-JSON body is wrapped as `{"text": <raw>}`.
pub(crate) fn body_to_json(text: &str) -> Value {
    if text.is_empty() {
        return json!({});
    }
    serde_json::from_str(text).unwrap_or_else(|_| json!({ "text": text }))
}

/// Best-effort error message extraction: `error.message` if present, else
/// the stringified error object, else the whole body.
pub(crate) fn extract_error_message(body: &Value) -> String {
    let error = body.get("error").unwrap_or(body);
    match error {
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| error.to_string()),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
