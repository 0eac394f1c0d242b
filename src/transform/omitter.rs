//! Removal of empty JSON fields.

use serde_json::Value;

use crate::json;
use crate::model::body::{Body, ContentType};

/// Recursively drop `null`, `""`, `[]` and `{}` members. Children are
/// cleaned first, so a container emptied by the cleanup is dropped too.
/// Zero and `false` are kept.
pub fn omit_empty(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, omit_empty(v)))
                .filter(|(_, v)| !json::is_empty(v))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(omit_empty)
                .filter(|v| !json::is_empty(v))
                .collect(),
        ),
        other => other,
    }
}

/// JSON bodies lose their empty fields; text bodies have whitespace runs
/// collapsed.
pub fn omit_empty_body(body: &Body) -> Body {
    match body.content_type() {
        ContentType::Json => match body.json_value() {
            Some(value) => body.with_json(&omit_empty(value)),
            None => body.clone(),
        },
        ContentType::Text => {
            let text = body.as_str().split_whitespace().collect::<Vec<_>>().join(" ");
            body.with_bytes(text)
        }
        ContentType::Xml | ContentType::Unknown => body.clone(),
    }
}
