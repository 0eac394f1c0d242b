//! Inbound request state and the outbound backend request.

use serde_json::{json, Value};

use crate::model::body::Body;
use crate::model::header::{Header, X_FORWARDED_FOR};
use crate::model::params::Params;
use crate::model::query::Query;

/// The inbound request as seen by the backends of one endpoint execution.
///
/// Propagated request modifiers produce new copies; the original is never
/// edited in place.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    url: String,
    path: String,
    client_ip: String,
    header: Header,
    params: Params,
    query: Query,
    body: Option<Body>,
}

impl Request {
    /// Build a request from the received `url` (path plus optional query).
    /// The client IP is appended to `X-Forwarded-For`.
    pub fn new(
        method: impl Into<String>,
        url: impl Into<String>,
        client_ip: impl Into<String>,
        header: Header,
        params: Params,
        body: Option<Body>,
    ) -> Self {
        let url = url.into();
        let client_ip = client_ip.into();
        let (path, query) = match url.split_once('?') {
            Some((path, query)) => (path.to_string(), Query::parse(query)),
            None => (url.clone(), Query::new()),
        };
        let header = if client_ip.is_empty() {
            header
        } else {
            header.add(X_FORWARDED_FOR, client_ip.clone())
        };

        Self {
            method: method.into(),
            url,
            path,
            client_ip,
            header,
            params,
            query,
            body,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Path and query exactly as received.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    pub fn body(&self) -> Option<&Body> {
        self.body.as_ref()
    }

    pub fn with_header(&self, header: Header) -> Self {
        Self {
            header,
            ..self.clone()
        }
    }

    pub fn with_params(&self, params: Params) -> Self {
        Self {
            params,
            ..self.clone()
        }
    }

    pub fn with_query(&self, query: Query) -> Self {
        Self {
            query,
            ..self.clone()
        }
    }

    pub fn with_body(&self, body: Option<Body>) -> Self {
        Self {
            body,
            ..self.clone()
        }
    }

    /// Document that `#request...` expressions resolve against.
    pub fn to_json(&self) -> Value {
        json!({
            "method": self.method,
            "url": self.url,
            "path": self.path,
            "header": self.header.to_json(),
            "params": self.params.to_json(),
            "query": self.query.to_json(),
            "body": self.body.as_ref().map(Body::to_json).unwrap_or(Value::Null),
        })
    }
}

/// The request sent to one backend.
#[derive(Debug, Clone, Default)]
pub struct BackendRequest {
    pub method: String,
    pub host: String,
    pub path: String,
    pub header: Header,
    pub query: Query,
    pub body: Option<Body>,
}

impl BackendRequest {
    /// Full URL: host, rendered path and encoded query.
    pub fn url(&self) -> String {
        let mut url = format!("{}{}", self.host.trim_end_matches('/'), self.path);
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query.encode());
        }
        url
    }

    pub fn to_json(&self) -> Value {
        json!({
            "method": self.method,
            "url": self.url(),
            "path": self.path,
            "header": self.header.to_json(),
            "query": self.query.to_json(),
            "body": self.body.as_ref().map(Body::to_json).unwrap_or(Value::Null),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_query_and_forwards_ip() {
        let request = Request::new(
            "GET",
            "/users/1?cpf=123&page=2",
            "10.0.0.1",
            Header::new().set(X_FORWARDED_FOR, "1.1.1.1"),
            Params::new().set("id", "1"),
            None,
        );
        assert_eq!(request.path(), "/users/1");
        assert_eq!(request.query().get("cpf"), Some("123"));
        assert_eq!(
            request.header().get_all(X_FORWARDED_FOR),
            ["1.1.1.1", "10.0.0.1"]
        );
    }

    #[test]
    fn test_with_is_copy_on_write() {
        let request = Request::new("GET", "/a", "", Header::new(), Params::new(), None);
        let edited = request.with_header(Header::new().set("X-A", "1"));
        assert!(!request.header().exists("X-A"));
        assert!(edited.header().exists("X-A"));
    }

    #[test]
    fn test_backend_request_url() {
        let request = BackendRequest {
            host: "http://users:8080/".into(),
            path: "/users/1".into(),
            query: Query::new().set("page", "2"),
            ..BackendRequest::default()
        };
        assert_eq!(request.url(), "http://users:8080/users/1?page=2");
    }
}
