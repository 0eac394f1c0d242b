//! Declarative edits applied to backend requests and responses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase a modifier runs in: while building the backend request, or while
/// post-processing the backend response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierContext {
    Request,
    Response,
}

/// Side a modifier edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierScope {
    Request,
    Response,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModifierAction {
    Set,
    Add,
    Del,
    Replace,
    Rename,
}

impl fmt::Display for ModifierAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierAction::Set => "SET",
            ModifierAction::Add => "ADD",
            ModifierAction::Del => "DEL",
            ModifierAction::Replace => "REPLACE",
            ModifierAction::Rename => "RENAME",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Modifier {
    pub context: ModifierContext,
    #[serde(default)]
    pub scope: Option<ModifierScope>,
    pub action: ModifierAction,
    #[serde(default)]
    pub propagate: bool,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Modifier {
    /// Explicit scope, or the one matching the context.
    pub fn scope(&self) -> ModifierScope {
        self.scope.unwrap_or(match self.context {
            ModifierContext::Request => ModifierScope::Request,
            ModifierContext::Response => ModifierScope::Response,
        })
    }

    /// A non-DEL modifier without a value does nothing and is ignored.
    pub fn is_valid(&self) -> bool {
        self.action == ModifierAction::Del || !self.value.is_empty()
    }

    /// The same modifier with its value already evaluated.
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..self.clone()
        }
    }
}

/// Field a modifier edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierTarget {
    Header,
    Params,
    Query,
    Body,
    StatusCode,
}

impl fmt::Display for ModifierTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ModifierTarget::Header => "header",
            ModifierTarget::Params => "param",
            ModifierTarget::Query => "query",
            ModifierTarget::Body => "body",
            ModifierTarget::StatusCode => "status-code",
        };
        f.write_str(name)
    }
}

/// Modifier lists per target, as configured on a backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BackendModifiers {
    pub header: Vec<Modifier>,
    pub param: Vec<Modifier>,
    pub query: Vec<Modifier>,
    pub body: Vec<Modifier>,
    pub status_code: Vec<Modifier>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_and_scope_inference() {
        let modifier: Modifier = serde_json::from_str(
            r#"{"context": "RESPONSE", "action": "SET", "key": "X-Id", "value": "1"}"#,
        )
        .unwrap();
        assert_eq!(modifier.scope(), ModifierScope::Response);
        assert!(!modifier.propagate);

        let explicit = Modifier {
            scope: Some(ModifierScope::Request),
            ..modifier
        };
        assert_eq!(explicit.scope(), ModifierScope::Request);
    }

    #[test]
    fn test_empty_value_is_invalid_except_del() {
        let modifier: Modifier =
            serde_json::from_str(r#"{"context": "REQUEST", "action": "ADD", "key": "X-Id"}"#).unwrap();
        assert!(!modifier.is_valid());

        let del = Modifier {
            action: ModifierAction::Del,
            ..modifier
        };
        assert!(del.is_valid());
    }
}
