//! Payload template rendering.
//!
//! Request-body templates are arbitrary nested JSON. Every string anywhere
//! in the structure has occurrences of the `{prompt}` placeholder replaced
//! with the rendered prompt text. The input is never mutated: default
//! templates are shared across requests.

use serde_json::{Map, Value};

/// Placeholder token substituted with the prompt text.
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Render a template value, substituting `{prompt}` in every string.
///
/// Non-string scalars pass through unchanged. Returns a new value; the
/// input template is left untouched.
pub fn render_value(template: &Value, prompt: &str) -> Value {
    match template {
        Value::String(s) => Value::String(s.replace(PROMPT_PLACEHOLDER, prompt)),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), render_value(value, prompt)))
                .collect(),
        ),
        Value::Array(items) => {
            Value::Array(items.iter().map(|item| render_value(item, prompt)).collect())
        }
        other => other.clone(),
    }
}

/// Render an object-shaped template (the usual case for request payloads).
pub fn render_map(template: &Map<String, Value>, prompt: &str) -> Map<String, Value> {
    template
        .iter()
        .map(|(key, value)| (key.clone(), render_value(value, prompt)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn substitutes_in_strings_and_passes_scalars_through() {
        let template = json!({"prompt": "say {prompt} now", "n": 3});
        let rendered = render_value(&template, "X");
        assert_eq!(rendered, json!({"prompt": "say X now", "n": 3}));
    }

    #[test]
    fn replaces_every_occurrence() {
        let template = json!("{prompt} and {prompt}");
        assert_eq!(render_value(&template, "A"), json!("A and A"));
    }

    #[test]
    fn walks_nested_structures() {
        let template = json!({
            "instances": [{"input": "{prompt}", "meta": {"note": "{prompt}!"}}],
            "flags": [true, null, 1.5],
        });
        let rendered = render_value(&template, "P");
        assert_eq!(
            rendered,
            json!({
                "instances": [{"input": "P", "meta": {"note": "P!"}}],
                "flags": [true, null, 1.5],
            })
        );
    }

    #[test]
    fn input_template_is_not_mutated() {
        let template = json!({"text": "{prompt}"});
        let first = render_value(&template, "one");
        let second = render_value(&template, "two");
        assert_eq!(template, json!({"text": "{prompt}"}));
        assert_eq!(first, json!({"text": "one"}));
        assert_eq!(second, json!({"text": "two"}));
    }

    #[test]
    fn string_without_placeholder_is_unchanged() {
        assert_eq!(render_value(&json!("plain"), "X"), json!("plain"));
    }
}
