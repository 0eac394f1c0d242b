//! URL query multi-map. Keys are case-sensitive; every mutator returns a new `Query`.

use serde_json::Value;
use url::form_urlencoded;

use super::multimap::MultiMap;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query(MultiMap);

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw query string (without the leading `?`).
    pub fn parse(raw: &str) -> Self {
        form_urlencoded::parse(raw.trim_start_matches('?').as_bytes())
            .fold(Self::new(), |query, (k, v)| query.add(&k, v.into_owned()))
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get_all(key)
    }

    pub fn exists(&self, key: &str) -> bool {
        !self.get_all(key).is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.len() == 0
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Self {
        self.set_all(key, vec![value.into()])
    }

    pub fn set_all(&self, key: &str, values: Vec<String>) -> Self {
        Self(self.0.set_all(key.to_string(), values))
    }

    pub fn add(&self, key: &str, value: impl Into<String>) -> Self {
        self.add_all(key, vec![value.into()])
    }

    pub fn add_all(&self, key: &str, values: Vec<String>) -> Self {
        Self(self.0.add_all(key.to_string(), values))
    }

    pub fn del(&self, key: &str) -> Self {
        Self(self.0.del(key))
    }

    pub fn rename(&self, from: &str, to: &str) -> Self {
        Self(self.0.rename(from, to.to_string()))
    }

    pub fn retain(&self, keep: impl FnMut(&str) -> bool) -> Self {
        Self(self.0.retain(keep))
    }

    /// Encode as `a=1&b=2`, in insertion order.
    pub fn encode(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, values) in self.iter() {
            for value in values {
                serializer.append_pair(key, value);
            }
        }
        serializer.finish()
    }

    pub fn to_json(&self) -> Value {
        self.0.to_json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_encode() {
        let query = Query::parse("?a=1&b=x%20y&a=2");
        assert_eq!(query.get_all("a"), ["1", "2"]);
        assert_eq!(query.get("b"), Some("x y"));
        assert_eq!(query.encode(), "a=1&a=2&b=x+y");
    }

    #[test]
    fn test_keys_are_case_sensitive() {
        let query = Query::new().set("Page", "1");
        assert!(!query.exists("page"));
    }

    #[test]
    fn test_copy_on_write() {
        let q1 = Query::new().set("cpf", "1");
        let q2 = q1.del("cpf");
        assert!(q1.exists("cpf"));
        assert!(!q2.exists("cpf"));
    }
}
