//! Merging of backend headers and bodies into one endpoint response.

use serde_json::{json, Map, Value};

use crate::model::body::{Body, ContentType};
use crate::model::header::{is_mandatory_key, Header};
use crate::model::history::HistoryEntry;

/// Add `other`'s values to `acc`. Gateway-owned keys of `other` are skipped.
pub fn aggregate_headers(acc: &Header, other: &Header) -> Header {
    other
        .iter()
        .filter(|(key, _)| !is_mandatory_key(key))
        .fold(acc.clone(), |acc, (key, values)| acc.add_all(key, values.to_vec()))
}

/// Nest a body under `key`: `{"key": <body>}`.
pub fn group_body(key: &str, body: &Body) -> Body {
    let mut map = Map::new();
    map.insert(key.to_string(), body.to_json());
    body.with_content_type(ContentType::Json, Value::Object(map).to_string())
}

fn merge_field(acc: &mut Map<String, Value>, key: String, value: Value) {
    match acc.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            acc.insert(key, value);
        }
    }
}

/// Field-level union of every body. Colliding keys collect into an array;
/// bodies that are not objects go under `response<N>`.
pub fn aggregate_object(entries: &[&HistoryEntry]) -> Value {
    let mut acc = Map::new();
    for (i, entry) in entries.iter().enumerate() {
        let Some(body) = &entry.response.body else {
            continue;
        };
        match body.to_json() {
            Value::Object(map) => {
                for (key, value) in map {
                    merge_field(&mut acc, key, value);
                }
            }
            other => merge_field(&mut acc, format!("response{i}"), other),
        }
    }
    Value::Object(acc)
}

/// One element per call, each carrying `ok` and `code`.
pub fn aggregate_array(entries: &[&HistoryEntry]) -> Value {
    let items = entries
        .iter()
        .map(|entry| {
            let status = entry.response.status_code;
            let ok = status.ok();
            match entry.response.body.as_ref().map(Body::to_json) {
                Some(Value::Object(mut map)) => {
                    map.insert("ok".to_string(), Value::Bool(ok));
                    map.insert("code".to_string(), json!(status.as_u16()));
                    Value::Object(map)
                }
                Some(body) => json!({"ok": ok, "code": status.as_u16(), "body": body}),
                None => json!({"ok": ok, "code": status.as_u16()}),
            }
        })
        .collect();
    Value::Array(items)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::model::backend::Backend;
    use crate::model::header::{CONTENT_TYPE, X_GOPEN_SUCCESS};
    use crate::model::history::History;
    use crate::model::request::BackendRequest;
    use crate::model::response::BackendResponse;
    use crate::model::status_code::StatusCode;

    fn history(bodies: &[(u16, Option<Value>)]) -> History {
        bodies.iter().fold(History::new(), |history, (code, body)| {
            history.add(
                Arc::new(Backend::default()),
                BackendRequest::default(),
                BackendResponse::new(
                    StatusCode::new(*code),
                    Header::new(),
                    body.as_ref().map(Body::json),
                ),
            )
        })
    }

    #[test]
    fn test_aggregate_headers_skips_mandatory() {
        let acc = Header::new().set("X-A", "1");
        let other = Header::new()
            .set("X-A", "2")
            .set(CONTENT_TYPE, "text/plain")
            .set(X_GOPEN_SUCCESS, "true");
        let merged = aggregate_headers(&acc, &other);
        assert_eq!(merged.get_all("X-A"), ["1", "2"]);
        assert!(!merged.exists(CONTENT_TYPE));
        assert!(!merged.exists(X_GOPEN_SUCCESS));
    }

    #[test]
    fn test_empty_history() {
        let history = History::new();
        assert_eq!(aggregate_object(&history.filtered()), json!({}));
        assert_eq!(aggregate_array(&history.filtered()), json!([]));
    }

    #[test]
    fn test_object_merge_collisions() {
        let history = history(&[
            (200, Some(json!({"user": "x", "id": 1}))),
            (200, Some(json!({"id": 2, "sum": 5}))),
            (200, Some(json!(["a"]))),
        ]);
        assert_eq!(
            aggregate_object(&history.filtered()),
            json!({"user": "x", "id": [1, 2], "sum": 5, "response2": ["a"]})
        );
    }

    #[test]
    fn test_array_envelopes() {
        let history = history(&[(200, Some(json!({"a": 1}))), (404, Some(json!("nope"))), (204, None)]);
        assert_eq!(
            aggregate_array(&history.filtered()),
            json!([
                {"a": 1, "ok": true, "code": 200},
                {"ok": false, "code": 404, "body": "nope"},
                {"ok": true, "code": 204}
            ])
        );
    }

    #[test]
    fn test_array_redirect_is_not_ok() {
        let history = history(&[(302, Some(json!({"location": "/x"})))]);
        assert_eq!(
            aggregate_array(&history.filtered()),
            json!([{"location": "/x", "ok": false, "code": 302}])
        );
    }

    #[test]
    fn test_group_body() {
        let grouped = group_body("totals", &Body::json(&json!({"sum": 5})));
        assert_eq!(grouped.to_json(), json!({"totals": {"sum": 5}}));
    }
}
