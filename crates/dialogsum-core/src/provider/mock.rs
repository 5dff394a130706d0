//! Canned-reply provider.
//!
//! Used for local development and tests: no network, zero latency. Mirrors
//! the fixture behavior of the original service: a prompt containing the
//! marker phrase gets the marker back, anything else gets the configured
//! default reply.

use std::sync::Arc;

use crate::config::Settings;

/// Marker substring that triggers the fixed canned reply.
const ROUTINE_MARKER: &str = "Routine exchange";

/// Local provider returning canned replies.
#[derive(Clone)]
pub struct MockClient {
    settings: Arc<Settings>,
}

impl MockClient {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Generate a canned summary for the prompt. Always reports zero
    /// latency.
    pub fn generate(&self, prompt: &str) -> (String, u64) {
        let summary = if prompt.contains(ROUTINE_MARKER) {
            ROUTINE_MARKER.to_owned()
        } else {
            self.settings.mock_reply.clone()
        };
        (summary, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_in_prompt_returns_marker_verbatim() {
        let settings = Settings {
            mock_reply: "something else entirely".to_owned(),
            ..Settings::default()
        };
        let client = MockClient::new(Arc::new(settings));
        let (summary, latency) = client.generate("Dialog:\n[A] Routine exchange about x");
        assert_eq!(summary, "Routine exchange");
        assert_eq!(latency, 0);
    }

    #[test]
    fn other_prompts_get_the_configured_reply() {
        let settings = Settings {
            mock_reply: "canned".to_owned(),
            ..Settings::default()
        };
        let client = MockClient::new(Arc::new(settings));
        let (summary, _) = client.generate("anything");
        assert_eq!(summary, "canned");
    }
}
