//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;
use tracing::warn;

use crate::config::schema::GatewayConfig;
use crate::config::validation::{validate_config, ValidationError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load, resolve and validate a JSON configuration file.
pub fn load_config(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<GatewayConfig, ConfigError> {
    let config: GatewayConfig = serde_json::from_str(content)?;
    let config = resolve(config);

    validate_config(&config).map_err(ConfigError::Validation)?;
    warn_unknown_middlewares(&config);

    Ok(config)
}

/// Fill endpoint timeout, limiter and cache from the document defaults,
/// field by field.
pub fn resolve(mut config: GatewayConfig) -> GatewayConfig {
    for endpoint in &mut config.endpoints {
        endpoint.timeout = endpoint.timeout.or(config.timeout);

        endpoint.limiter = match (&endpoint.limiter, &config.limiter) {
            (Some(own), Some(global)) => Some(own.merge(global)),
            (own, global) => own.clone().or_else(|| global.clone()),
        };

        endpoint.cache = match (&endpoint.cache, &config.cache) {
            (Some(own), Some(global)) => Some(own.merge(global)),
            (own, global) => own.clone().or_else(|| global.clone()),
        };
    }
    config
}

fn warn_unknown_middlewares(config: &GatewayConfig) {
    for endpoint in &config.endpoints {
        for key in endpoint.beforewares.iter().chain(&endpoint.afterwares) {
            if !config.middlewares.contains_key(key) {
                warn!(endpoint = %endpoint, middleware = %key, "middleware is not configured and will be skipped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    const DOCUMENT: &str = r#"{
        "timeout": "10s",
        "limiter": {"max-body-size": "1KB", "rate": {"capacity": 5, "every": "1s"}},
        "cache": {"enabled": true, "duration": "1m", "strategy-headers": ["X-Tenant"]},
        "middlewares": {
            "auth": {"hosts": ["http://auth:8080"], "path": "/check", "method": "GET"}
        },
        "endpoints": [
            {
                "path": "/users/:id",
                "method": "GET",
                "limiter": {"rate": {"capacity": 2}},
                "cache": {"ignore-query": true},
                "beforewares": ["auth", "missing"],
                "backends": [{"hosts": ["http://users:8080"], "path": "/users/:id", "method": "GET"}]
            },
            {
                "path": "/orders",
                "method": "POST",
                "timeout": "2s",
                "backends": [{"hosts": ["http://orders:8080"], "path": "/orders", "method": "POST"}]
            }
        ]
    }"#;

    #[test]
    fn test_endpoint_fields_fall_back_to_document() {
        let config = parse_config(DOCUMENT).unwrap();
        let users = &config.endpoints[0];
        let orders = &config.endpoints[1];

        assert_eq!(users.timeout(), Duration::from_secs(10));
        assert_eq!(orders.timeout(), Duration::from_secs(2));

        let limiter = users.limiter();
        assert_eq!(limiter.max_body_size(), 1024);
        let rate = limiter.rate.unwrap();
        assert_eq!(rate.capacity(), 2);
        assert_eq!(rate.every(), Duration::from_secs(1));

        let cache = users.cache();
        assert!(cache.enabled());
        assert!(cache.ignore_query());
        assert_eq!(cache.duration(), Duration::from_secs(60));
        assert_eq!(cache.strategy_headers(), ["X-Tenant".to_string()]);

        assert!(!orders.cache().ignore_query());
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(parse_config("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error() {
        let err = parse_config(r#"{"endpoints": []}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert_eq!(err.to_string(), "Validation failed: no endpoints configured");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/gopen.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
