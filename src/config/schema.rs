//! Configuration schema definitions.
//!
//! This module defines the complete configuration document for the gateway.
//! All types derive Serde traits for deserialization from JSON; keys are
//! kebab-case.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::duration::{deserialize_option_duration, deserialize_option_size};
use crate::model::{Backend, Endpoint};

/// Default endpoint timeout when neither the endpoint nor the document sets one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Root configuration for the gateway.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Default endpoint timeout.
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,

    /// Default limiter settings, overridable per endpoint.
    pub limiter: Option<LimiterConfig>,

    /// Default cache policy, overridable per endpoint.
    pub cache: Option<CacheConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Named backends usable as beforewares and afterwares.
    pub middlewares: HashMap<String, Arc<Backend>>,

    /// Endpoint definitions.
    pub endpoints: Vec<Endpoint>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Request size and rate limits.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct LimiterConfig {
    /// Maximum bytes across all header names and values.
    #[serde(deserialize_with = "deserialize_option_size")]
    pub max_header_size: Option<usize>,

    /// Maximum request body bytes.
    #[serde(deserialize_with = "deserialize_option_size")]
    pub max_body_size: Option<usize>,

    /// Maximum request body bytes for multipart payloads.
    #[serde(deserialize_with = "deserialize_option_size")]
    pub max_multipart_memory_size: Option<usize>,

    /// Per client IP token bucket.
    pub rate: Option<RateConfig>,
}

impl LimiterConfig {
    pub const DEFAULT_MAX_HEADER_SIZE: usize = 1024 * 1024;
    pub const DEFAULT_MAX_BODY_SIZE: usize = 3 * 1024 * 1024;
    pub const DEFAULT_MAX_MULTIPART_MEMORY_SIZE: usize = 5 * 1024 * 1024;

    /// Fill unset fields from `fallback`.
    pub fn merge(&self, fallback: &LimiterConfig) -> LimiterConfig {
        LimiterConfig {
            max_header_size: self.max_header_size.or(fallback.max_header_size),
            max_body_size: self.max_body_size.or(fallback.max_body_size),
            max_multipart_memory_size: self
                .max_multipart_memory_size
                .or(fallback.max_multipart_memory_size),
            rate: match (&self.rate, &fallback.rate) {
                (Some(own), Some(other)) => Some(own.merge(other)),
                (own, other) => own.clone().or_else(|| other.clone()),
            },
        }
    }

    pub fn max_header_size(&self) -> usize {
        self.max_header_size.unwrap_or(Self::DEFAULT_MAX_HEADER_SIZE)
    }

    pub fn max_body_size(&self) -> usize {
        self.max_body_size.unwrap_or(Self::DEFAULT_MAX_BODY_SIZE)
    }

    pub fn max_multipart_memory_size(&self) -> usize {
        self.max_multipart_memory_size
            .unwrap_or(Self::DEFAULT_MAX_MULTIPART_MEMORY_SIZE)
    }
}

/// Token bucket: `capacity` tokens, one restored every `every`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct RateConfig {
    pub capacity: Option<u32>,

    #[serde(deserialize_with = "deserialize_option_duration")]
    pub every: Option<Duration>,
}

impl RateConfig {
    pub fn merge(&self, fallback: &RateConfig) -> RateConfig {
        RateConfig {
            capacity: self.capacity.or(fallback.capacity),
            every: self.every.or(fallback.every),
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity.unwrap_or(1)
    }

    pub fn every(&self) -> Duration {
        self.every.unwrap_or(Duration::from_secs(1))
    }
}

/// Response cache policy.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct CacheConfig {
    pub enabled: Option<bool>,

    /// Leave the query string out of the cache key.
    pub ignore_query: Option<bool>,

    /// Time to live of a stored response.
    #[serde(deserialize_with = "deserialize_option_duration")]
    pub duration: Option<Duration>,

    /// Request headers whose values are appended to the cache key.
    pub strategy_headers: Option<Vec<String>>,

    /// Cacheable response status codes; empty means any 2xx.
    pub only_if_status_codes: Option<Vec<u16>>,

    /// Cacheable request methods; empty means GET only, `*` means any.
    pub only_if_methods: Option<Vec<String>>,

    /// Honor `Cache-Control: no-cache` / `no-store` from clients.
    pub allow_cache_control: Option<bool>,
}

impl CacheConfig {
    /// Fill unset fields from `fallback`.
    pub fn merge(&self, fallback: &CacheConfig) -> CacheConfig {
        CacheConfig {
            enabled: self.enabled.or(fallback.enabled),
            ignore_query: self.ignore_query.or(fallback.ignore_query),
            duration: self.duration.or(fallback.duration),
            strategy_headers: self
                .strategy_headers
                .clone()
                .or_else(|| fallback.strategy_headers.clone()),
            only_if_status_codes: self
                .only_if_status_codes
                .clone()
                .or_else(|| fallback.only_if_status_codes.clone()),
            only_if_methods: self
                .only_if_methods
                .clone()
                .or_else(|| fallback.only_if_methods.clone()),
            allow_cache_control: self.allow_cache_control.or(fallback.allow_cache_control),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled.unwrap_or(false)
    }

    pub fn ignore_query(&self) -> bool {
        self.ignore_query.unwrap_or(false)
    }

    pub fn duration(&self) -> Duration {
        self.duration.unwrap_or(Duration::ZERO)
    }

    pub fn strategy_headers(&self) -> &[String] {
        self.strategy_headers.as_deref().unwrap_or(&[])
    }

    pub fn allow_cache_control(&self) -> bool {
        self.allow_cache_control.unwrap_or(false)
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ObservabilityConfig {
    /// Log filter directive (trace, debug, info, warn, error, or a full
    /// `EnvFilter` expression).
    pub log_level: String,

    /// Emit JSON log lines instead of the human format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "gopen_gateway=info,tower_http=info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
