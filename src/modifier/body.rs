use serde_json::Value;

use crate::error::GatewayError;
use crate::json::{self, path};
use crate::model::body::Body;
use crate::model::modifier::{Modifier, ModifierAction, ModifierTarget};
use crate::model::request::Request;
use crate::resolver::Resolver;

use super::{target_name, Modifiable};

fn json_body(
    current: &Value,
    template: Option<&Body>,
    modifier: &Modifier,
    resolver: &Resolver,
    warnings: &mut Vec<GatewayError>,
) -> Result<Body, GatewayError> {
    let key = modifier.key.as_str();
    let mut value = current.clone();

    match modifier.action {
        ModifierAction::Set => {
            let (new, errors) = resolver.get_value(&modifier.value);
            warnings.extend(errors);
            path::set(&mut value, key, new)?;
        }
        ModifierAction::Add => {
            let (new, errors) = resolver.get_value(&modifier.value);
            warnings.extend(errors);
            match path::get(&value, key) {
                None | Some(Value::Array(_)) | Some(Value::Null) => path::append(&mut value, key, new)?,
                Some(_) => {
                    return Err(GatewayError::invalid_modifier(
                        target_name(ModifierTarget::Body),
                        modifier.action,
                        key,
                        "ADD needs an array or a missing field",
                    ))
                }
            }
        }
        ModifierAction::Del => {
            path::delete(&mut value, key);
        }
        ModifierAction::Replace => {
            let (new, errors) = resolver.get_value(&modifier.value);
            warnings.extend(errors);
            if key.is_empty() {
                value = new;
            } else {
                path::replace(&mut value, key, new)?;
            }
        }
        ModifierAction::Rename => {
            let (to, errors) = resolver.get(&modifier.value);
            warnings.extend(errors);
            let moved = path::delete(&mut value, key)
                .ok_or_else(|| GatewayError::json_path(key, "nothing to rename"))?;
            path::set(&mut value, &to, moved)?;
        }
    }

    Ok(match template {
        Some(body) => body.with_json(&value),
        None => Body::json(&value),
    })
}

/// Text bodies: `key` is a literal substring.
fn text_body(
    body: &Body,
    modifier: &Modifier,
    resolver: &Resolver,
    warnings: &mut Vec<GatewayError>,
) -> Body {
    let key = modifier.key.as_str();
    let text = body.as_str();
    let mut evaluate = || {
        let (value, errors) = resolver.get(&modifier.value);
        warnings.extend(errors);
        value
    };

    let modified = match modifier.action {
        ModifierAction::Set | ModifierAction::Replace if key.is_empty() => evaluate(),
        ModifierAction::Set | ModifierAction::Replace | ModifierAction::Rename => {
            text.replace(key, &evaluate())
        }
        ModifierAction::Add => format!("{text}{}", evaluate()),
        ModifierAction::Del if key.is_empty() => String::new(),
        ModifierAction::Del => text.replace(key, ""),
    };
    body.with_bytes(modified)
}

impl Modifiable for Option<Body> {
    const TARGET: ModifierTarget = ModifierTarget::Body;

    fn modify(
        &self,
        modifier: &Modifier,
        resolver: &Resolver,
        warnings: &mut Vec<GatewayError>,
    ) -> Result<Self, GatewayError> {
        match self {
            Some(body) if body.is_json() => {
                let current = body
                    .json_value()
                    .ok_or_else(|| GatewayError::json_path(&modifier.key, "body is not valid json"))?;
                json_body(&current, Some(body), modifier, resolver, warnings).map(Some)
            }
            Some(body) => Ok(Some(text_body(body, modifier, resolver, warnings))),
            // An absent body only gains content from SET, ADD or a whole-body REPLACE.
            None => match modifier.action {
                ModifierAction::Set | ModifierAction::Add => {
                    json_body(&Value::Null, None, modifier, resolver, warnings).map(Some)
                }
                ModifierAction::Replace if modifier.key.is_empty() => {
                    let (value, errors) = resolver.get_value(&modifier.value);
                    warnings.extend(errors);
                    Ok(match value {
                        Value::String(text) => Some(Body::text(text)),
                        value if json::is_empty(&value) => None,
                        value => Some(Body::json(&value)),
                    })
                }
                _ => Ok(None),
            },
        }
    }

    fn from_request(request: &Request) -> Option<Self> {
        Some(request.body().cloned())
    }

    fn into_request(self, request: &Request) -> Request {
        request.with_body(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::header::Header;
    use crate::model::history::History;
    use crate::model::modifier::ModifierContext;
    use crate::model::params::Params;
    use serde_json::json;

    fn modifier(action: ModifierAction, key: &str, value: &str) -> Modifier {
        Modifier {
            context: ModifierContext::Request,
            scope: None,
            action,
            propagate: false,
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    fn resolver() -> Resolver {
        let request = Request::new(
            "POST",
            "/?cpf=123",
            "",
            Header::new(),
            Params::new(),
            Some(Body::json(&json!({"user": {"id": 1}}))),
        );
        Resolver::new(&request, &History::new())
    }

    fn apply(body: Option<Body>, modifier: Modifier) -> Result<Option<Body>, GatewayError> {
        body.modify(&modifier, &resolver(), &mut Vec::new())
    }

    #[test]
    fn test_json_actions() {
        let body = Some(Body::json(&json!({"a": 1, "tags": ["x"]})));

        let set = apply(body.clone(), modifier(ModifierAction::Set, "user.cpf", "#request.query.cpf")).unwrap();
        assert_eq!(set.unwrap().to_json(), json!({"a": 1, "tags": ["x"], "user": {"cpf": "123"}}));

        let set_object = apply(body.clone(), modifier(ModifierAction::Set, "owner", "#request.body.user")).unwrap();
        assert_eq!(set_object.unwrap().to_json()["owner"], json!({"id": 1}));

        let added = apply(body.clone(), modifier(ModifierAction::Add, "tags", "y")).unwrap();
        assert_eq!(added.unwrap().to_json()["tags"], json!(["x", "y"]));

        let deleted = apply(body.clone(), modifier(ModifierAction::Del, "a", "")).unwrap();
        assert_eq!(deleted.unwrap().to_json(), json!({"tags": ["x"]}));

        let renamed = apply(body.clone(), modifier(ModifierAction::Rename, "a", "b")).unwrap();
        assert_eq!(renamed.unwrap().to_json(), json!({"tags": ["x"], "b": 1}));

        let replaced = apply(body.clone(), modifier(ModifierAction::Replace, "", "{\"new\":true}")).unwrap();
        assert_eq!(replaced.unwrap().to_json(), json!({"new": true}));

        assert!(apply(body.clone(), modifier(ModifierAction::Replace, "missing", "1")).is_err());
        assert!(apply(body, modifier(ModifierAction::Add, "a", "2")).is_err());
    }

    #[test]
    fn test_text_actions() {
        let body = Some(Body::text("hello world"));

        let set = apply(body.clone(), modifier(ModifierAction::Set, "world", "#request.query.cpf")).unwrap();
        assert_eq!(set.unwrap().as_str(), "hello 123");

        let added = apply(body.clone(), modifier(ModifierAction::Add, "", "!")).unwrap();
        assert_eq!(added.unwrap().as_str(), "hello world!");

        let deleted = apply(body.clone(), modifier(ModifierAction::Del, " world", "")).unwrap();
        assert_eq!(deleted.unwrap().as_str(), "hello");

        let replaced = apply(body, modifier(ModifierAction::Replace, "", "bye")).unwrap();
        assert_eq!(replaced.unwrap().as_str(), "bye");
    }

    #[test]
    fn test_absent_body() {
        let created = apply(None, modifier(ModifierAction::Set, "id", "5")).unwrap();
        assert_eq!(created.unwrap().to_json(), json!({"id": 5}));

        assert!(apply(None, modifier(ModifierAction::Del, "id", "")).unwrap().is_none());
    }
}
