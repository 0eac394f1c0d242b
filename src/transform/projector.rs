//! Allow-list / deny-list projection of header, query and JSON body fields.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::json::path;
use crate::model::body::Body;
use crate::model::header::{is_mandatory_key, Header};
use crate::model::query::Query;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionKind {
    /// Every entry is `1`: keep only the listed fields.
    Addition,
    /// Every entry is `-1`: drop the listed fields.
    Rejection,
}

/// Field projection. Entries are `1` (keep) or `-1` (drop); mixing both
/// disables the projection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Projection(Vec<(String, i8)>);

impl TryFrom<Map<String, Value>> for Projection {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(key, value)| match value.as_i64() {
                Some(1) => Ok((key, 1)),
                Some(-1) => Ok((key, -1)),
                _ => Err(format!("projection value for {key:?} must be 1 or -1, got {value}")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Projection)
    }
}

impl Projection {
    pub fn new<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, i8)>,
        K: Into<String>,
    {
        Self(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `None` when empty or mixed, in which case everything passes through.
    pub fn kind(&self) -> Option<ProjectionKind> {
        if self.0.is_empty() {
            None
        } else if self.0.iter().all(|(_, v)| *v == 1) {
            Some(ProjectionKind::Addition)
        } else if self.0.iter().all(|(_, v)| *v == -1) {
            Some(ProjectionKind::Rejection)
        } else {
            None
        }
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    fn keeps(&self, kind: ProjectionKind, key: &str, case_insensitive: bool) -> bool {
        let listed = self.keys().any(|k| {
            if case_insensitive {
                k.eq_ignore_ascii_case(key)
            } else {
                k == key
            }
        });
        match kind {
            ProjectionKind::Addition => listed,
            ProjectionKind::Rejection => !listed,
        }
    }

    /// Gateway-owned keys always survive.
    pub fn project_header(&self, header: &Header) -> Header {
        match self.kind() {
            Some(kind) => header.retain(|key| is_mandatory_key(key) || self.keeps(kind, key, true)),
            None => header.clone(),
        }
    }

    pub fn project_query(&self, query: &Query) -> Query {
        match self.kind() {
            Some(kind) => query.retain(|key| self.keeps(kind, key, false)),
            None => query.clone(),
        }
    }

    /// Only JSON bodies are projected.
    pub fn project_body(&self, body: &Body) -> Result<Body, GatewayError> {
        if self.kind().is_none() {
            return Ok(body.clone());
        }
        match body.json_value() {
            Some(value) => Ok(body.with_json(&self.project_json(value)?)),
            None => Ok(body.clone()),
        }
    }

    /// A root array is projected element by element.
    pub fn project_json(&self, value: Value) -> Result<Value, GatewayError> {
        let Some(kind) = self.kind() else {
            return Ok(value);
        };
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.project_json(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            mut value => match kind {
                ProjectionKind::Addition => {
                    let mut projected = Value::Object(Map::new());
                    for key in self.keys() {
                        if let Some(found) = path::get(&value, key) {
                            path::set(&mut projected, key, found.clone())?;
                        }
                    }
                    Ok(projected)
                }
                ProjectionKind::Rejection => {
                    for key in self.keys() {
                        path::delete(&mut value, key);
                    }
                    Ok(value)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::header::CONTENT_TYPE;
    use serde_json::json;

    #[test]
    fn test_kind() {
        assert_eq!(Projection::new([("a", 1), ("b", 1)]).kind(), Some(ProjectionKind::Addition));
        assert_eq!(Projection::new([("a", -1)]).kind(), Some(ProjectionKind::Rejection));
        assert_eq!(Projection::new([("a", 1), ("b", -1)]).kind(), None);
        assert_eq!(Projection::default().kind(), None);
    }

    #[test]
    fn test_addition_keeps_listed_and_mandatory_headers() {
        let header = Header::new()
            .set("X-A", "1")
            .set("X-B", "2")
            .set(CONTENT_TYPE, "text/plain");
        let projected = Projection::new([("x-a", 1)]).project_header(&header);
        assert!(projected.exists("X-A"));
        assert!(!projected.exists("X-B"));
        assert!(projected.exists(CONTENT_TYPE));
    }

    #[test]
    fn test_rejection_query() {
        let query = Query::parse("a=1&b=2");
        let projected = Projection::new([("a", -1)]).project_query(&query);
        assert!(!projected.exists("a"));
        assert!(projected.exists("b"));
    }

    #[test]
    fn test_body_addition_and_rejection() {
        let body = Body::json(&json!({"id": 1, "user": {"name": "x", "age": 3}, "secret": "s"}));

        let added = Projection::new([("id", 1), ("user.name", 1)])
            .project_body(&body)
            .unwrap();
        assert_eq!(added.to_json(), json!({"id": 1, "user": {"name": "x"}}));

        let rejected = Projection::new([("secret", -1), ("user.age", -1)])
            .project_body(&body)
            .unwrap();
        assert_eq!(rejected.to_json(), json!({"id": 1, "user": {"name": "x"}}));
    }

    #[test]
    fn test_mixed_projection_passes_through() {
        let body = Body::json(&json!({"id": 1, "secret": "s"}));
        let projected = Projection::new([("id", 1), ("secret", -1)])
            .project_body(&body)
            .unwrap();
        assert_eq!(projected, body);
    }

    #[test]
    fn test_root_array_projection() {
        let projected = Projection::new([("id", 1)])
            .project_json(json!([{"id": 1, "x": 2}, {"id": 3}]))
            .unwrap();
        assert_eq!(projected, json!([{"id": 1}, {"id": 3}]));
    }
}
