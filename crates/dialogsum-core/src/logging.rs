//! Credential-safe JSON logging.
//!
//! Provider request/response payloads are logged at the wire boundary.
//! [`to_log_json`] serializes any JSON value with credential-bearing keys
//! masked and the output capped, so a large dialog or a leaked token never
//! ends up in the log stream.

use serde_json::Value;

/// Keys whose values are always masked, compared case-insensitively.
const SENSITIVE_KEYS: &[&str] = &["api_key", "access_token", "authorization", "token", "key"];

/// Maximum serialized length before truncation.
const MAX_LOG_CHARS: usize = 12_000;

/// Serialize a JSON value for logging, masking sensitive keys and
/// truncating overlong output.
pub fn to_log_json(payload: &Value) -> String {
    to_log_json_capped(payload, MAX_LOG_CHARS)
}

fn to_log_json_capped(payload: &Value, max_chars: usize) -> String {
    let text = redact(payload).to_string();
    if text.len() <= max_chars {
        return text;
    }

    // Truncate on a char boundary; payloads are JSON so this is almost
    // always already one.
    let mut cut = max_chars;
    while !text.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}...<truncated {} chars>", &text[..cut], text.len() - cut)
}

fn redact(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(redact).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, item)| {
                    if is_sensitive(key) {
                        (key.clone(), Value::String("***".to_owned()))
                    } else {
                        (key.clone(), redact(item))
                    }
                })
                .collect(),
        ),
        other => other.clone(),
    }
}

fn is_sensitive(key: &str) -> bool {
    SENSITIVE_KEYS
        .iter()
        .any(|candidate| key.eq_ignore_ascii_case(candidate))
}
