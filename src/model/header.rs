//! HTTP header multi-map.
//!
//! Keys are stored in canonical form (`x-forwarded-for` → `X-Forwarded-For`)
//! so lookups are case-insensitive. Every mutator returns a new `Header`.

use axum::http::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::multimap::MultiMap;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const CONTENT_ENCODING: &str = "Content-Encoding";
pub const CONTENT_LENGTH: &str = "Content-Length";
pub const X_FORWARDED_FOR: &str = "X-Forwarded-For";
pub const X_GOPEN_CACHE: &str = "X-Gopen-Cache";
pub const X_GOPEN_CACHE_TTL: &str = "X-Gopen-Cache-Ttl";
pub const X_GOPEN_COMPLETE: &str = "X-Gopen-Complete";
pub const X_GOPEN_SUCCESS: &str = "X-Gopen-Success";
pub const CACHE_CONTROL: &str = "Cache-Control";

/// Keys owned by the gateway. User mapping and projection never touch them.
pub const MANDATORY_KEYS: [&str; 8] = [
    CONTENT_TYPE,
    CONTENT_ENCODING,
    CONTENT_LENGTH,
    X_FORWARDED_FOR,
    X_GOPEN_CACHE,
    X_GOPEN_CACHE_TTL,
    X_GOPEN_COMPLETE,
    X_GOPEN_SUCCESS,
];

/// Canonicalize a header name: first letter and letters after `-` upper-case.
pub fn canonical_key(key: &str) -> String {
    let mut upper = true;
    key.trim()
        .chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

pub fn is_mandatory_key(key: &str) -> bool {
    MANDATORY_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key.trim()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header(MultiMap);

impl Header {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_all(key).first().map(String::as_str)
    }

    pub fn get_all(&self, key: &str) -> &[String] {
        self.0.get_all(&canonical_key(key))
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
        Self(self.0.set_all(canonical_key(key), values))
    }

    pub fn add(&self, key: &str, value: impl Into<String>) -> Self {
        self.add_all(key, vec![value.into()])
    }

    pub fn add_all(&self, key: &str, values: Vec<String>) -> Self {
        Self(self.0.add_all(canonical_key(key), values))
    }

    pub fn del(&self, key: &str) -> Self {
        Self(self.0.del(&canonical_key(key)))
    }

    pub fn rename(&self, from: &str, to: &str) -> Self {
        Self(self.0.rename(&canonical_key(from), canonical_key(to)))
    }

    pub fn retain(&self, keep: impl FnMut(&str) -> bool) -> Self {
        Self(self.0.retain(keep))
    }

    /// Approximate wire size: every name and value byte.
    pub fn size(&self) -> usize {
        self.iter()
            .map(|(k, vs)| vs.iter().map(|v| k.len() + v.len()).sum::<usize>())
            .sum()
    }

    pub fn to_json(&self) -> Value {
        self.0.to_json()
    }

    pub fn from_http(map: &HeaderMap) -> Self {
        map.iter().fold(Self::new(), |header, (name, value)| {
            match value.to_str() {
                Ok(v) => header.add(name.as_str(), v),
                Err(_) => header,
            }
        })
    }

    /// Convert to a `HeaderMap`, skipping names or values HTTP rejects.
    pub fn to_http(&self) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (key, values) in self.iter() {
            let Ok(name) = HeaderName::from_bytes(key.as_bytes()) else {
                tracing::warn!(header = %key, "Dropping invalid header name");
                continue;
            };
            for value in values {
                if let Ok(value) = HeaderValue::from_str(value) {
                    map.append(name.clone(), value);
                }
            }
        }
        map
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Header {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        iter.into_iter()
            .fold(Self::new(), |header, (k, v)| header.add(k.as_ref(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("x-forwarded-for"), "X-Forwarded-For");
        assert_eq!(canonical_key("CONTENT-TYPE"), "Content-Type");
        assert_eq!(canonical_key("accept"), "Accept");
    }

    #[test]
    fn test_copy_on_write() {
        let h1 = Header::new().set("X-Id", "1");
        let h2 = h1.set("x-id", "2");
        let h3 = h1.add("X-Id", "3");
        let h4 = h1.del("X-ID");

        assert_eq!(h1.get("X-Id"), Some("1"));
        assert_eq!(h2.get("X-Id"), Some("2"));
        assert_eq!(h3.get_all("X-Id"), ["1", "3"]);
        assert!(!h4.exists("X-Id"));
        assert!(h1.exists("X-Id"));
    }

    #[test]
    fn test_rename_keeps_values() {
        let header = Header::new().set("X-Old", "v").set("Accept", "*/*");
        let renamed = header.rename("x-old", "x-new");
        assert_eq!(renamed.get("X-New"), Some("v"));
        assert!(!renamed.exists("X-Old"));
        assert_eq!(renamed.keys().collect::<Vec<_>>(), vec!["X-New", "Accept"]);
    }

    #[test]
    fn test_mandatory_keys() {
        assert!(is_mandatory_key("content-type"));
        assert!(is_mandatory_key("X-Gopen-Success"));
        assert!(!is_mandatory_key("Authorization"));
    }

    #[test]
    fn test_to_json_single_and_multi() {
        let header = Header::new().set("A", "1").add("B", "1").add("B", "2");
        assert_eq!(
            header.to_json(),
            serde_json::json!({"A": "1", "B": ["1", "2"]})
        );
    }
}
