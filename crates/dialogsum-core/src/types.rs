//! Wire types shared between the HTTP layer and the engine.
//!
//! Field names match the JSON payloads of the original service exactly, so
//! existing frontends keep working. All `ModelConfig` fields are optional:
//! `None` means "not supplied, fall back to the service default", which is
//! distinct from an explicitly empty value.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single message inside a dialog transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Sender label; `None` renders as `UNK` in the prompt.
    #[serde(default)]
    pub sender: Option<String>,

    /// Timestamp as supplied by the export. The format is not validated.
    pub timestamp: String,

    /// Message text. Messages with empty text are kept in the dialog but
    /// excluded from prompt rendering.
    pub text: String,
}

/// A parsed dialog transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dialog {
    /// Unique id within a batch; synthesized during parsing when the export
    /// does not carry one.
    pub dialog_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ru_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tu_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ru_id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tu_id: Option<i64>,

    pub messages: Vec<Message>,
}

/// The prompt-building rules sent with every summarize request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub system_instruction: String,
    pub rules: Vec<String>,
    pub output_instruction: String,
}

/// Per-request model configuration overrides.
///
/// Sparse by design: only the fields the caller explicitly supplied are
/// present. Absent fields fall back to service defaults during config
/// resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_template: Option<Map<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters_template: Option<Map<String, Value>>,
}

impl Message {
    /// Create a message with an explicit sender.
    pub fn new(
        sender: Option<impl Into<String>>,
        timestamp: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            sender: sender.map(Into::into),
            timestamp: timestamp.into(),
            text: text.into(),
        }
    }
}
