//! Case conventions for JSON object keys.

use heck::{
    ToKebabCase, ToLowerCamelCase, ToShoutyKebabCase, ToShoutySnakeCase, ToSnakeCase,
    ToUpperCamelCase,
};
use serde::Deserialize;
use serde_json::Value;

use crate::model::body::Body;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Nomenclature {
    /// `UserName`
    Camel,
    /// `userName`
    LowerCamel,
    /// `user_name`
    Snake,
    /// `USER_NAME`
    ScreamingSnake,
    /// `user-name`
    Kebab,
    /// `USER-NAME`
    ScreamingKebab,
}

impl Nomenclature {
    pub fn parse(&self, key: &str) -> String {
        match self {
            Nomenclature::Camel => key.to_upper_camel_case(),
            Nomenclature::LowerCamel => key.to_lower_camel_case(),
            Nomenclature::Snake => key.to_snake_case(),
            Nomenclature::ScreamingSnake => key.to_shouty_snake_case(),
            Nomenclature::Kebab => key.to_kebab_case(),
            Nomenclature::ScreamingKebab => key.to_shouty_kebab_case(),
        }
    }

    /// Rename every object key, at any depth. Values are untouched.
    pub fn apply(&self, value: Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (self.parse(&k), self.apply(v)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.into_iter().map(|v| self.apply(v)).collect()),
            other => other,
        }
    }

    /// Only JSON bodies carry keys to rename.
    pub fn apply_body(&self, body: &Body) -> Body {
        match body.json_value() {
            Some(value) => body.with_json(&self.apply(value)),
            None => body.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_each_convention() {
        assert_eq!(Nomenclature::Camel.parse("user_name"), "UserName");
        assert_eq!(Nomenclature::LowerCamel.parse("user_name"), "userName");
        assert_eq!(Nomenclature::Snake.parse("userName"), "user_name");
        assert_eq!(Nomenclature::ScreamingSnake.parse("userName"), "USER_NAME");
        assert_eq!(Nomenclature::Kebab.parse("userName"), "user-name");
        assert_eq!(Nomenclature::ScreamingKebab.parse("userName"), "USER-NAME");
    }

    #[test]
    fn test_snake_then_camel_restores_keys() {
        let value = json!({"userName": "x", "homeAddress": {"zipCode": "1"}, "tags": [{"tagId": 1}]});
        let snake = Nomenclature::Snake.apply(value.clone());
        assert_eq!(
            snake,
            json!({"user_name": "x", "home_address": {"zip_code": "1"}, "tags": [{"tag_id": 1}]})
        );
        assert_eq!(Nomenclature::LowerCamel.apply(snake), value);
    }

    #[test]
    fn test_deserialize() {
        let parsed: Nomenclature = serde_json::from_str("\"SCREAMING_KEBAB\"").unwrap();
        assert_eq!(parsed, Nomenclature::ScreamingKebab);
    }
}
