//! Dialog-export ingestion.
//!
//! Accepts the heterogeneous JSON shapes produced by chat export tools and
//! normalizes them into [`Dialog`]s. The per-message field sniffing picks
//! the first key that is not `from`/`sender` as the timestamp/text pair, so
//! it depends on key order: `serde_json` is built with `preserve_order` to
//! keep insertion order intact.

use serde_json::{Map, Value};

use crate::error::{Result, SummarizeError};
use crate::types::{Dialog, Message};

/// Message keys excluded from the timestamp/text sniffing.
const SENDER_KEYS: &[&str] = &["from", "sender"];

/// Normalize an uploaded JSON payload into a list of dialogs.
///
/// Supported shapes: a single dialog object (has `messages`), an object
/// with a `dialogs` array, an object with a `data` array, or a bare array
/// of dialog objects. Anything else is a validation error.
pub fn load_dialogs(payload: &Value) -> Result<Vec<Dialog>> {
    if let Value::Object(map) = payload {
        if map.contains_key("messages") {
            return Ok(vec![convert_dialog(map, 0)]);
        }
        if let Some(Value::Array(items)) = map.get("dialogs") {
            return Ok(convert_all(items));
        }
        if let Some(Value::Array(items)) = map.get("data") {
            return Ok(convert_all(items));
        }
    }

    if let Value::Array(items) = payload {
        return Ok(convert_all(items));
    }

    Err(SummarizeError::validation(
        "Unsupported JSON format: expected a dialog object or list of dialogs",
    ))
}

fn convert_all(items: &[Value]) -> Vec<Dialog> {
    items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| item.as_object().map(|raw| convert_dialog(raw, index)))
        .collect()
}

fn convert_dialog(raw: &Map<String, Value>, index: usize) -> Dialog {
    let context = raw.get("context").and_then(Value::as_object);
    let ru = context.and_then(|c| c.get("RU")).and_then(Value::as_object);
    let tu = context.and_then(|c| c.get("TU")).and_then(Value::as_object);

    let ru_id = ru.and_then(|r| safe_int(r.get("id")));
    let tu_id = tu.and_then(|t| safe_int(t.get("id")));

    let dialog_id = raw
        .get("dialog_id")
        .and_then(explicit_dialog_id)
        .unwrap_or_else(|| build_dialog_id(ru_id, tu_id, index));

    let messages = raw
        .get("messages")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_object)
                .map(convert_message)
                .collect()
        })
        .unwrap_or_default();

    Dialog {
        dialog_id,
        ru_name: ru.and_then(|r| safe_str(r.get("name"))),
        tu_name: tu.and_then(|t| safe_str(t.get("name"))),
        ru_id,
        tu_id,
        messages,
    }
}

fn convert_message(raw: &Map<String, Value>) -> Message {
    let sender = nonempty_str(raw.get("from")).or_else(|| nonempty_str(raw.get("sender")));
    let (timestamp, text) = extract_timestamp_and_text(raw);
    Message {
        sender,
        timestamp,
        text,
    }
}

/// The first key that is not a sender key supplies both the timestamp (the
/// key itself) and the text (its value). When every key is a sender key,
/// fall back to explicit `text`/`message` fields with an empty timestamp.
fn extract_timestamp_and_text(raw: &Map<String, Value>) -> (String, String) {
    for (key, value) in raw {
        if SENDER_KEYS.contains(&key.as_str()) {
            continue;
        }
        return (key.clone(), value_to_string(value));
    }

    let fallback = nonempty_str(raw.get("text"))
        .or_else(|| nonempty_str(raw.get("message")))
        .unwrap_or_default();
    (String::new(), fallback)
}

fn build_dialog_id(ru_id: Option<i64>, tu_id: Option<i64>, index: usize) -> String {
    match (ru_id, tu_id) {
        (Some(ru), Some(tu)) => format!("{ru}_{tu}_{index}"),
        _ => index.to_string(),
    }
}

fn explicit_dialog_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn safe_int(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn safe_str(value: Option<&Value>) -> Option<String> {
    let value = value?;
    if value.is_null() {
        return None;
    }
    let text = value_to_string(value);
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn nonempty_str(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
