//! Static endpoint configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::config::duration::deserialize_option_duration;
use crate::config::schema::{CacheConfig, LimiterConfig, DEFAULT_TIMEOUT};
use crate::model::backend::Backend;
use crate::model::body::{ContentEncoding, ContentType};
use crate::model::status_code::StatusCode;
use crate::transform::Nomenclature;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Endpoint {
    /// Route template, e.g. `/users/:id`.
    pub path: String,

    pub method: String,

    #[serde(default, deserialize_with = "deserialize_option_duration")]
    pub timeout: Option<Duration>,

    #[serde(default)]
    pub limiter: Option<LimiterConfig>,

    #[serde(default)]
    pub cache: Option<CacheConfig>,

    /// Statuses that stop execution. Unset means any failure (>= 400).
    #[serde(default)]
    pub abort_if_status_codes: Option<Vec<u16>>,

    /// Middleware keys executed before the backends.
    #[serde(default)]
    pub beforewares: Vec<String>,

    #[serde(default)]
    pub backends: Vec<Arc<Backend>>,

    /// Middleware keys executed after the backends.
    #[serde(default)]
    pub afterwares: Vec<String>,

    #[serde(default)]
    pub response: EndpointResponseConfig,
}

/// Shaping applied to the aggregated response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EndpointResponseConfig {
    /// Merge all bodies into one object instead of an array.
    pub aggregate: bool,
    pub content_type: Option<ContentType>,
    pub content_encoding: Option<ContentEncoding>,
    pub omit_empty: bool,
    pub nomenclature: Option<Nomenclature>,
}

impl Endpoint {
    /// Whether a backend answering `status` stops execution.
    pub fn abort(&self, status: StatusCode) -> bool {
        match &self.abort_if_status_codes {
            Some(codes) => codes.contains(&status.as_u16()),
            None => status.failed(),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }

    pub fn limiter(&self) -> LimiterConfig {
        self.limiter.clone().unwrap_or_default()
    }

    pub fn cache(&self) -> CacheConfig {
        self.cache.clone().unwrap_or_default()
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
