//! JSON value access used by every transformation.
//!
//! # Data Flow
//! ```text
//! Body bytes ──parse()──▶ serde_json::Value
//!     → path.rs (get / set / replace / delete / append by dotted path)
//!     → to_text() when a value is spliced back into a string
//! ```
//!
//! # Design Decisions
//! - Paths are dotted keys with optional `[n]` indices (`users[0].name`,
//!   `users.0.name`); negative indices count from the end
//! - Object key order is preserved so aggregated bodies read naturally

pub mod path;

use serde_json::Value;

/// Parse raw bytes as JSON, returning `None` for anything that is not JSON.
pub fn parse(raw: &[u8]) -> Option<Value> {
    serde_json::from_slice(raw).ok()
}

/// Interpret a literal configuration value: valid JSON stays JSON,
/// everything else becomes a JSON string.
pub fn parse_literal(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Render a value for splicing into text. Strings lose their quotes.
pub fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a value counts as empty for omission purposes.
///
/// Zero, `false` and non-empty containers are not empty.
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_literal() {
        assert_eq!(parse_literal("5"), json!(5));
        assert_eq!(parse_literal("{\"a\":1}"), json!({"a": 1}));
        assert_eq!(parse_literal("hello"), json!("hello"));
    }

    #[test]
    fn test_emptiness_is_not_falsiness() {
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(false)));
    }
}
