//! Dialog summarization engine.
//!
//! This crate implements the provider-agnostic core of the service: parsing
//! heterogeneous dialog exports, rendering prompts, resolving per-request
//! provider configuration against service defaults, and dispatching the
//! summarize call to one of several interchangeable providers.
//!
//! ## Modules
//!
//! - [`parse`] -- dialog-export JSON sniffing and normalization.
//! - [`prompt`] -- dialog + rules -> prompt string.
//! - [`template`] -- `{prompt}` substitution in payload templates.
//! - [`provider`] -- provider clients, config resolvers, and the dispatcher.
//! - [`config`] -- environment-sourced service settings.
//! - [`logging`] -- credential-redacting JSON log serialization.
//! - [`error`] -- the error taxonomy.

pub mod config;
pub mod error;
pub mod logging;
pub mod parse;
pub mod prompt;
pub mod provider;
pub mod template;
pub mod types;

// Re-export the most commonly used types at the crate root.
pub use config::Settings;
pub use error::{Result, SummarizeError};
pub use parse::load_dialogs;
pub use prompt::build_prompt;
pub use provider::{
    BatchItem, GeminiClient, MockClient, ProviderKind, ProviderOverrides, ProviderRouter, Summary,
    VertexClient,
};
pub use types::{Dialog, Message, ModelConfig, PromptConfig};
