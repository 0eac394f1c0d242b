//! Path parameters and URL path templates (`/users/:id`).

use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Match `path` against `template`, capturing `:name` segments.
    ///
    /// Returns `None` when the literal segments or the segment count differ.
    pub fn extract(template: &str, path: &str) -> Option<Self> {
        let expected: Vec<&str> = split_segments(template);
        let actual: Vec<&str> = split_segments(path);
        if expected.len() != actual.len() {
            return None;
        }

        let mut params = Self::new();
        for (pattern, value) in expected.iter().zip(actual) {
            match pattern.strip_prefix(':') {
                Some(name) => params = params.set(name, value),
                None if *pattern == value => {}
                None => return None,
            }
        }
        Some(params)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn exists(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        let value = value.into();
        match next.0.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => next.0.push((key.to_string(), value)),
        }
        next
    }

    pub fn del(&self, key: &str) -> Self {
        Self(self.0.iter().filter(|(k, _)| k != key).cloned().collect())
    }

    pub fn rename(&self, from: &str, to: &str) -> Self {
        if from == to {
            return self.clone();
        }
        let Some(value) = self.get(from).map(str::to_string) else {
            return self.clone();
        };
        let mut next = self.del(to);
        if let Some(entry) = next.0.iter_mut().find(|(k, _)| k == from) {
            *entry = (to.to_string(), value);
        }
        next
    }

    /// Substitute every `:name` segment of `template` with its value.
    ///
    /// Unknown parameters are left as-is.
    pub fn render(&self, template: &str) -> String {
        let rendered: Vec<String> = template
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => self
                    .get(name)
                    .map(str::to_string)
                    .unwrap_or_else(|| segment.to_string()),
                None => segment.to_string(),
            })
            .collect();
        rendered.join("/")
    }

    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect::<Map<_, _>>(),
        )
    }
}

fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Remove the `:key` segment from a path template.
pub fn strip_template_segment(template: &str, key: &str) -> String {
    let marker = format!(":{key}");
    let kept: Vec<&str> = template.split('/').filter(|s| *s != marker).collect();
    let joined = kept.join("/");
    if joined.is_empty() {
        "/".to_string()
    } else {
        joined
    }
}

/// Rename the `:from` segment of a path template to `:to`.
pub fn rename_template_segment(template: &str, from: &str, to: &str) -> String {
    let marker = format!(":{from}");
    template
        .split('/')
        .map(|s| if s == marker { format!(":{to}") } else { s.to_string() })
        .collect::<Vec<_>>()
        .join("/")
}
