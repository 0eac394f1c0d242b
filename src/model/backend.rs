//! Static backend configuration, shared read-only across requests.

use std::fmt;

use serde::Deserialize;

use crate::model::body::{ContentEncoding, ContentType};
use crate::model::header::X_FORWARDED_FOR;
use crate::model::modifier::BackendModifiers;
use crate::transform::{Mapper, Nomenclature, Projection};

/// One upstream HTTP call.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Backend {
    /// Host pool; one is picked per call.
    pub hosts: Vec<String>,

    /// Path template, e.g. `/users/:id`.
    pub path: String,

    pub method: String,

    /// Inbound headers forwarded to this backend. `*` forwards all.
    #[serde(default)]
    pub forward_headers: Vec<String>,

    /// Inbound query keys forwarded to this backend. `*` forwards all.
    #[serde(default)]
    pub forward_queries: Vec<String>,

    #[serde(default)]
    pub request: BackendRequestConfig,

    #[serde(default)]
    pub response: BackendResponseConfig,

    #[serde(default)]
    pub modifiers: BackendModifiers,

    #[serde(default)]
    pub extra_config: BackendExtraConfig,
}

/// Shaping applied to the outbound request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BackendRequestConfig {
    pub header_mapper: Mapper,
    pub header_projection: Projection,
    pub query_mapper: Mapper,
    pub query_projection: Projection,
    pub body_mapper: Mapper,
    pub body_projection: Projection,
    pub omit_empty: bool,
    pub nomenclature: Option<Nomenclature>,
    pub content_type: Option<ContentType>,
    pub content_encoding: Option<ContentEncoding>,
}

/// Shaping applied to the backend response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BackendResponseConfig {
    pub omit: bool,
    pub header_mapper: Mapper,
    pub header_projection: Projection,
    pub body_mapper: Mapper,
    pub body_projection: Projection,
    /// Key the response body is nested under when aggregated.
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BackendExtraConfig {
    pub group_response: Option<String>,
    pub omit_request_body: bool,
    pub omit_response: bool,
}

fn allows(list: &[String], key: &str, case_insensitive: bool) -> bool {
    list.iter().any(|entry| {
        entry == "*"
            || if case_insensitive {
                entry.eq_ignore_ascii_case(key)
            } else {
                entry == key
            }
    })
}

impl Backend {
    /// Key under which this backend's body is grouped, if any.
    pub fn group_response(&self) -> Option<&str> {
        self.extra_config
            .group_response
            .as_deref()
            .or(self.response.group.as_deref())
            .filter(|key| !key.is_empty())
    }

    /// Whether the response is left out of the endpoint response.
    pub fn omit_response(&self) -> bool {
        self.extra_config.omit_response || self.response.omit
    }

    pub fn omit_request_body(&self) -> bool {
        self.extra_config.omit_request_body
    }

    /// `X-Forwarded-For` is always forwarded.
    pub fn forwards_header(&self, key: &str) -> bool {
        key.eq_ignore_ascii_case(X_FORWARDED_FOR) || allows(&self.forward_headers, key, true)
    }

    pub fn forwards_query(&self, key: &str) -> bool {
        allows(&self.forward_queries, key, false)
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
