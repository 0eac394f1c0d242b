//! Human-readable durations (`500ms`, `30s`, `1m30s`) and sizes (`512B`, `3MB`).

use std::time::Duration;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a duration such as `1h`, `1m30s`, `250ms` or `1.5s`.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let mut total = 0f64;
    let mut rest = raw;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return None;
        }
        let number: f64 = rest[..number_len].parse().ok()?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let factor = match &rest[..unit_len] {
            "ns" => 1e-9,
            "us" | "µs" => 1e-6,
            "ms" => 1e-3,
            "s" => 1.0,
            "m" => 60.0,
            "h" => 3600.0,
            _ => return None,
        };
        rest = &rest[unit_len..];
        total += number * factor;
    }
    Some(Duration::from_secs_f64(total))
}

/// Parse a byte size such as `512B`, `1KB`, `3MB`, `1GB` or a bare number.
pub fn parse_size(raw: &str) -> Option<usize> {
    let raw = raw.trim().to_ascii_uppercase();
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let number: f64 = raw[..split].parse().ok()?;
    let factor = match raw[split..].trim() {
        "" | "B" => 1.0,
        "KB" | "K" => 1024.0,
        "MB" | "M" => 1024.0 * 1024.0,
        "GB" | "G" => 1024.0 * 1024.0 * 1024.0,
        _ => return None,
    };
    Some((number * factor) as usize)
}

pub fn deserialize_option_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(raw) => parse_duration(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid duration {raw:?}"))),
    }
}

pub fn deserialize_option_size<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n
            .as_u64()
            .map(|n| Some(n as usize))
            .ok_or_else(|| serde::de::Error::custom(format!("invalid size {n}"))),
        Some(Value::String(raw)) => parse_size(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid size {raw:?}"))),
        Some(other) => Err(serde::de::Error::custom(format!("invalid size {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_duration("500ms"), Some(Duration::from_millis(500)));
        assert_eq!(parse_duration("1m30s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("2h"), Some(Duration::from_secs(7200)));
        assert_eq!(parse_duration("1.5s"), Some(Duration::from_millis(1500)));
        assert_eq!(parse_duration("10"), None);
        assert_eq!(parse_duration("abc"), None);
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("512B"), Some(512));
        assert_eq!(parse_size("1KB"), Some(1024));
        assert_eq!(parse_size("3mb"), Some(3 * 1024 * 1024));
        assert_eq!(parse_size("2048"), Some(2048));
        assert_eq!(parse_size("1TB"), None);
    }
}
