//! Processor output body → wire bytes, keyed by the reply's content type.

use bytes::Bytes;
use serde_json::Value;

use super::media::is_json;

/// Content type used when the processor does not declare one.
pub const DEFAULT_JSON: &str = "application/json; charset=utf-8";
pub const DEFAULT_TEXT: &str = "text/plain; charset=utf-8";

/// Encode `body` for the given `content_type`.
///
/// JSON content types get standard JSON encoding. Otherwise strings pass
/// through untouched, `null` becomes an empty body, scalars use their display
/// form and structured values fall back to JSON text.
pub fn serialize(body: Option<&Value>, content_type: Option<&str>) -> Bytes {
    let Some(body) = body else {
        return Bytes::new();
    };
    if content_type.is_some_and(is_json) {
        return Bytes::from(body.to_string());
    }
    match body {
        Value::String(s) => Bytes::from(s.clone()),
        Value::Null => Bytes::new(),
        other => Bytes::from(other.to_string()),
    }
}

/// Content type to negotiate when the processor left it unset.
pub fn default_content_type(body: Option<&Value>) -> Option<&'static str> {
    match body {
        None => None,
        Some(Value::String(_)) => Some(DEFAULT_TEXT),
        Some(_) => Some(DEFAULT_JSON),
    }
}
