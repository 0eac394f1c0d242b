//! Key renaming for header, query and JSON body fields.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::GatewayError;
use crate::json::path;
use crate::model::body::{Body, ContentType};
use crate::model::header::{canonical_key, is_mandatory_key, Header};
use crate::model::query::Query;

/// Ordered `from → to` renames. For bodies the keys are JSON paths.
///
/// All renames of one mapper apply at once: `a → b, b → c` moves `a` to `b`
/// and the original `b` to `c`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct Mapper(Vec<(String, String)>);

impl TryFrom<Map<String, Value>> for Mapper {
    type Error = String;

    fn try_from(map: Map<String, Value>) -> Result<Self, Self::Error> {
        map.into_iter()
            .map(|(from, to)| match to {
                Value::String(to) => Ok((from, to)),
                other => Err(format!("mapper value for {from:?} must be a string, got {other}")),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Mapper)
    }
}

impl Mapper {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn target(&self, key: &str, case_insensitive: bool) -> Option<&str> {
        self.0
            .iter()
            .find(|(from, _)| {
                if case_insensitive {
                    from.eq_ignore_ascii_case(key)
                } else {
                    from == key
                }
            })
            .map(|(_, to)| to.as_str())
    }

    /// Rename header keys. Gateway-owned keys are never renamed, and nothing
    /// is renamed onto them.
    pub fn map_header(&self, header: &Header) -> Header {
        if self.is_empty() {
            return header.clone();
        }
        header.iter().fold(Header::new(), |acc, (key, values)| {
            let key = match self.target(key, true) {
                Some(to) if !is_mandatory_key(key) && !is_mandatory_key(to) => canonical_key(to),
                _ => key.to_string(),
            };
            acc.add_all(&key, values.to_vec())
        })
    }

    pub fn map_query(&self, query: &Query) -> Query {
        if self.is_empty() {
            return query.clone();
        }
        query.iter().fold(Query::new(), |acc, (key, values)| {
            let key = self.target(key, false).unwrap_or(key);
            acc.add_all(key, values.to_vec())
        })
    }

    /// Rename JSON paths, or literal substrings of a text body.
    pub fn map_body(&self, body: &Body) -> Result<Body, GatewayError> {
        if self.is_empty() {
            return Ok(body.clone());
        }
        match body.content_type() {
            ContentType::Json => {
                let Some(value) = body.json_value() else {
                    return Ok(body.clone());
                };
                Ok(body.with_json(&self.map_json(value)?))
            }
            ContentType::Text => {
                let text = self
                    .0
                    .iter()
                    .fold(body.as_str().into_owned(), |text, (from, to)| {
                        text.replace(from.as_str(), to)
                    });
                Ok(body.with_bytes(text))
            }
            ContentType::Xml | ContentType::Unknown => Ok(body.clone()),
        }
    }

    /// A root array is mapped element by element.
    pub fn map_json(&self, value: Value) -> Result<Value, GatewayError> {
        match value {
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.map_json(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            mut value => {
                let moved: Vec<(&str, Value)> = self
                    .0
                    .iter()
                    .filter_map(|(from, to)| path::get(&value, from).cloned().map(|v| (to.as_str(), v)))
                    .collect();
                for (from, _) in &self.0 {
                    path::delete(&mut value, from);
                }
                for (to, moved) in moved {
                    path::set(&mut value, to, moved)?;
                }
                Ok(value)
            }
        }
    }
}
