//! Configuration validation.
//!
//! Runs on the resolved document (endpoint defaults already merged) and
//! returns every problem found, not just the first.

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::{CacheConfig, GatewayConfig, LimiterConfig};
use crate::model::Backend;

const METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no endpoints configured")]
    NoEndpoints,

    #[error("duplicate endpoint {0}")]
    DuplicateEndpoint(String),

    #[error("{owner}: invalid method {method:?}")]
    InvalidMethod { owner: String, method: String },

    #[error("{0}: backend has no hosts")]
    NoHosts(String),

    #[error("{0}: enabled cache needs a non-zero duration")]
    ZeroCacheDuration(String),

    #[error("{0}: rate capacity must be greater than zero")]
    ZeroRateCapacity(String),
}

fn valid_method(method: &str) -> bool {
    METHODS.contains(&method.to_ascii_uppercase().as_str())
}

fn validate_backend(owner: &str, backend: &Backend, errors: &mut Vec<ValidationError>) {
    let owner = format!("{owner} backend {}", backend.path);
    if !valid_method(&backend.method) {
        errors.push(ValidationError::InvalidMethod {
            owner: owner.clone(),
            method: backend.method.clone(),
        });
    }
    if backend.hosts.is_empty() {
        errors.push(ValidationError::NoHosts(owner));
    }
}

fn validate_cache(owner: &str, cache: Option<&CacheConfig>, errors: &mut Vec<ValidationError>) {
    if let Some(cache) = cache {
        if cache.enabled() && cache.duration().is_zero() {
            errors.push(ValidationError::ZeroCacheDuration(owner.to_string()));
        }
    }
}

fn validate_limiter(owner: &str, limiter: Option<&LimiterConfig>, errors: &mut Vec<ValidationError>) {
    if let Some(rate) = limiter.and_then(|limiter| limiter.rate.as_ref()) {
        if rate.capacity() == 0 {
            errors.push(ValidationError::ZeroRateCapacity(owner.to_string()));
        }
    }
}

pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    for (key, middleware) in &config.middlewares {
        validate_backend(&format!("middleware {key}"), middleware, &mut errors);
    }

    let mut routes = HashSet::new();
    for endpoint in &config.endpoints {
        let route = format!("{} {}", endpoint.method.to_ascii_uppercase(), endpoint.path);
        if !valid_method(&endpoint.method) {
            errors.push(ValidationError::InvalidMethod {
                owner: format!("endpoint {}", endpoint.path),
                method: endpoint.method.clone(),
            });
        }
        if !routes.insert(route.clone()) {
            errors.push(ValidationError::DuplicateEndpoint(route.clone()));
        }
        validate_cache(&route, endpoint.cache.as_ref(), &mut errors);
        validate_limiter(&route, endpoint.limiter.as_ref(), &mut errors);
        for backend in &endpoint.backends {
            validate_backend(&route, backend, &mut errors);
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
