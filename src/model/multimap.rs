//! Ordered `key → [values]` storage shared by `Header` and `Query`.

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MultiMap {
    entries: Vec<(String, Vec<String>)>,
}

impl MultiMap {
    fn position(&self, key: &str) -> Option<usize> {
        self.entries.iter().position(|(k, _)| k == key)
    }

    pub(crate) fn get_all(&self, key: &str) -> &[String] {
        self.position(key)
            .map(|i| self.entries[i].1.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn set_all(&self, key: String, values: Vec<String>) -> Self {
        let mut next = self.clone();
        match next.position(&key) {
            Some(i) => next.entries[i].1 = values,
            None => next.entries.push((key, values)),
        }
        next
    }

    pub(crate) fn add_all(&self, key: String, values: Vec<String>) -> Self {
        let mut next = self.clone();
        match next.position(&key) {
            Some(i) => next.entries[i].1.extend(values),
            None => next.entries.push((key, values)),
        }
        next
    }

    pub(crate) fn del(&self, key: &str) -> Self {
        let mut next = self.clone();
        next.entries.retain(|(k, _)| k != key);
        next
    }

    /// Move the values of `from` to `to`, keeping the position of `from`.
    pub(crate) fn rename(&self, from: &str, to: String) -> Self {
        if from == to {
            return self.clone();
        }
        let Some(values) = self.position(from).map(|i| self.entries[i].1.clone()) else {
            return self.clone();
        };
        let mut next = self.del(&to);
        if let Some(i) = next.position(from) {
            next.entries[i] = (to, values);
        }
        next
    }

    pub(crate) fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        let mut next = self.clone();
        next.entries.retain(|(k, _)| keep(k));
        next
    }

    /// Single values render as strings, repeated values as arrays.
    pub(crate) fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (key, values) in &self.entries {
            let value = match values.as_slice() {
                [single] => Value::String(single.clone()),
                many => Value::Array(many.iter().cloned().map(Value::String).collect()),
            };
            map.insert(key.clone(), value);
        }
        Value::Object(map)
    }
}
