//! Cache eligibility and keys.

use crate::config::CacheConfig;
use crate::model::header::CACHE_CONTROL;
use crate::model::request::Request;
use crate::model::status_code::StatusCode;

const ANY_METHOD: &str = "*";

fn cache_control(cache: &CacheConfig, request: &Request, directive: &str) -> bool {
    cache.allow_cache_control()
        && request
            .header()
            .get_all(CACHE_CONTROL)
            .iter()
            .flat_map(|value| value.split(','))
            .any(|d| d.trim().eq_ignore_ascii_case(directive))
}

fn method_allowed(cache: &CacheConfig, method: &str) -> bool {
    match cache.only_if_methods.as_deref() {
        None | Some([]) => method.eq_ignore_ascii_case("GET"),
        Some(methods) => methods
            .iter()
            .any(|m| m == ANY_METHOD || m.eq_ignore_ascii_case(method)),
    }
}

fn status_allowed(cache: &CacheConfig, status: StatusCode) -> bool {
    match cache.only_if_status_codes.as_deref() {
        None | Some([]) => status.ok(),
        Some(codes) => codes.contains(&status.as_u16()),
    }
}

/// Whether a stored response may answer `request`.
pub fn can_read(cache: &CacheConfig, request: &Request) -> bool {
    cache.enabled()
        && !cache_control(cache, request, "no-cache")
        && method_allowed(cache, request.method())
}

/// Whether the response to `request` may be stored.
pub fn can_write(cache: &CacheConfig, request: &Request, status: StatusCode) -> bool {
    cache.enabled()
        && !cache_control(cache, request, "no-store")
        && method_allowed(cache, request.method())
        && status_allowed(cache, status)
}

/// `METHOD:URL[:strategy header values]`.
pub fn key(cache: &CacheConfig, request: &Request) -> String {
    let url = if cache.ignore_query() {
        request.path()
    } else {
        request.url()
    };
    let mut key = format!("{}:{}", request.method().to_ascii_uppercase(), url);

    let strategy: Vec<&str> = cache
        .strategy_headers()
        .iter()
        .flat_map(|name| request.header().get_all(name))
        .map(String::as_str)
        .collect();
    if !strategy.is_empty() {
        key.push(':');
        key.push_str(&strategy.join(":"));
    }
    key
}
