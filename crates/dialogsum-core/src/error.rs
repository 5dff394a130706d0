//! Core error types.
//!
//! Every fallible path in the engine surfaces through [`SummarizeError`].
//! Each variant carries enough context for the HTTP layer to pick a status
//! code without inspecting message text.

/// Unified error type for the summarization engine.
#[derive(Debug, thiserror::Error)]
pub enum SummarizeError {
    /// The incoming payload was malformed or had an unsupported shape.
    #[error("{reason}")]
    Validation { reason: String },

    /// A required provider credential/identifier is missing, or a default
    /// JSON template is malformed. Indicates service misconfiguration or a
    /// missing per-call override.
    #[error("{reason}")]
    Config { reason: String },

    /// The requested provider name is not one of the recognized providers.
    #[error("Unsupported provider: {name}")]
    UnsupportedProvider { name: String },

    /// A provider returned a non-success HTTP status.
    #[error("{provider} request failed ({status}): {message}")]
    Upstream {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The HTTP round-trip to a provider failed before a status was
    /// received (connect error, timeout, body read failure).
    #[error("{provider} request failed: {reason}")]
    Transport {
        provider: &'static str,
        reason: String,
    },
}

/// Convenience alias used throughout the core crate.
pub type Result<T> = std::result::Result<T, SummarizeError>;

impl SummarizeError {
    /// Shorthand for a [`SummarizeError::Validation`] with a formatted reason.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Shorthand for a [`SummarizeError::Config`] with a formatted reason.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
