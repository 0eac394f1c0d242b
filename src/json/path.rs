//! Dotted-path navigation and mutation over `serde_json::Value`.

use serde_json::{Map, Value};

use crate::error::GatewayError;

/// Split a path into segments. `a.b[0].c` and `a.b.0.c` are equivalent.
pub fn segments(path: &str) -> Vec<String> {
    path.replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn index(segment: &str, len: usize) -> Option<usize> {
    let i: i64 = segment.parse().ok()?;
    if i < 0 {
        let from_end = len as i64 + i;
        (from_end >= 0).then_some(from_end as usize)
    } else {
        Some(i as usize)
    }
}

/// Look up the value at `path`. An empty path returns the root.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(index(&segment, items.len())?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Whether a value exists at `path`.
pub fn exists(root: &Value, path: &str) -> bool {
    get(root, path).is_some()
}

fn get_mut<'a>(root: &'a mut Value, segments: &[String]) -> Option<&'a mut Value> {
    let mut current = root;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get_mut(segment)?,
            Value::Array(items) => {
                let idx = index(segment, items.len())?;
                items.get_mut(idx)?
            }
            _ => return None,
        };
    }
    Some(current)
}

fn child_or_insert<'a>(current: &'a mut Value, segment: &str) -> Option<&'a mut Value> {
    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => Some(map.entry(segment.to_string()).or_insert(Value::Null)),
        Value::Array(items) => {
            let idx = index(segment, items.len())?;
            items.get_mut(idx)
        }
        _ => None,
    }
}

/// Set the value at `path`, creating intermediate objects as needed.
pub fn set(root: &mut Value, path: &str, value: Value) -> Result<(), GatewayError> {
    let segments = segments(path);
    let Some((last, parents)) = segments.split_last() else {
        *root = value;
        return Ok(());
    };

    let mut current = root;
    for segment in parents {
        current = child_or_insert(current, segment)
            .ok_or_else(|| GatewayError::json_path(path, "parent is not an object or array"))?;
    }

    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    match current {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let len = items.len();
            match index(last, len) {
                Some(idx) if idx < len => {
                    items[idx] = value;
                    Ok(())
                }
                Some(idx) if idx == len => {
                    items.push(value);
                    Ok(())
                }
                _ => Err(GatewayError::json_path(path, "array index out of range")),
            }
        }
        _ => Err(GatewayError::json_path(path, "parent is not an object or array")),
    }
}

/// Set the value at `path` only if something is already there.
pub fn replace(root: &mut Value, path: &str, value: Value) -> Result<(), GatewayError> {
    if !exists(root, path) {
        return Err(GatewayError::json_path(path, "nothing to replace"));
    }
    set(root, path, value)
}

/// Remove and return the value at `path`.
pub fn delete(root: &mut Value, path: &str) -> Option<Value> {
    let segments = segments(path);
    let (last, parents) = segments.split_last()?;
    match get_mut(root, parents)? {
        Value::Object(map) => map.shift_remove(last),
        Value::Array(items) => {
            let idx = index(last, items.len())?;
            (idx < items.len()).then(|| items.remove(idx))
        }
        _ => None,
    }
}

/// Append to the array at `path`, creating it when absent.
pub fn append(root: &mut Value, path: &str, value: Value) -> Result<(), GatewayError> {
    let segments = segments(path);
    match get_mut(root, &segments) {
        Some(Value::Array(items)) => {
            items.push(value);
            Ok(())
        }
        Some(Value::Null) | None => set(root, path, Value::Array(vec![value])),
        Some(_) => Err(GatewayError::json_path(path, "target is not an array")),
    }
}

/// Visit every direct child of an object or array.
///
/// Array children are keyed by their index.
pub fn for_each(root: &Value, mut visit: impl FnMut(&str, &Value)) {
    match root {
        Value::Object(map) => map.iter().for_each(|(k, v)| visit(k, v)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .for_each(|(i, v)| visit(&i.to_string(), v)),
        _ => {}
    }
}
