//! Loose interpretation of caller-supplied JSON values.
//!
//! Bundles carry untyped hints (`recursive`, `optimize`, `user_role`, ...).
//! These helpers give them a single, deterministic reading.

use serde_json::Value;

/// Truthiness of a hint: `null`, `false`, zero, and empty strings, arrays or
/// objects are false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}

/// Render a value as a label: strings verbatim, anything else as JSON.
pub fn label(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Like [`label`], but an explicit `null` reads as absent.
pub fn present_label(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(label(other)),
    }
}
