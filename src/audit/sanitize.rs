//! Parameter sanitization for audit logging.
//!
//! Form fields carrying credentials are redacted and long free-text fields
//! are truncated before a request's parameters reach the audit log.

use serde_json::{Map, Value};

/// Key fragments whose values are redacted.
const SENSITIVE_KEYS: &[&str] = &[
    "password",
    "passwd",
    "secret",
    "token",
    "credential",
    "card",
    "auth",
];

/// Maximum length for free-text values before truncation.
const MAX_STRING_LENGTH: usize = 512;

/// Key fragments whose values are truncated if too long.
const TRUNCATABLE_KEYS: &[&str] = &["detail", "content", "explain", "body", "memo"];

/// Sanitize request parameters for audit logging.
///
/// Matching is case-insensitive on key fragments, so `newPassword` and
/// `currentPassword` are redacted as well as `password`. Nested objects and
/// arrays are processed recursively.
pub fn sanitize_params(params: &Value) -> Value {
    sanitize_value(params, false)
}

fn sanitize_value(value: &Value, is_truncatable: bool) -> Value {
    match value {
        Value::Object(map) => {
            let mut sanitized = Map::new();
            for (key, val) in map {
                let key_lower = key.to_lowercase();

                let is_sensitive = SENSITIVE_KEYS.iter().any(|&s| key_lower.contains(s));
                let should_truncate = TRUNCATABLE_KEYS.iter().any(|&s| key_lower.contains(s));

                if is_sensitive {
                    sanitized.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    sanitized.insert(key.clone(), sanitize_value(val, should_truncate));
                }
            }
            Value::Object(sanitized)
        }
        Value::Array(arr) => Value::Array(
            arr.iter()
                .map(|v| sanitize_value(v, is_truncatable))
                .collect(),
        ),
        Value::String(s) if is_truncatable && s.len() > MAX_STRING_LENGTH => {
            Value::String(format!("[TRUNCATED - {} bytes]", s.len()))
        }
        _ => value.clone(),
    }
}
