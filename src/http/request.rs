//! Inbound request conversion.
//!
//! Size limits are enforced here: header bytes before the body is touched,
//! the declared `Content-Length` before reading, and the streamed length
//! while reading.

use axum::http::{HeaderValue, Request as HttpRequest};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::error::GatewayError;
use crate::model::header::{Header, CONTENT_LENGTH};
use crate::model::{Body, Endpoint, Params, Request};
use crate::security::limits;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request ids are uuid v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &HttpRequest<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Read an axum request into the endpoint's `Request`.
pub async fn from_http(
    request: axum::extract::Request,
    client_ip: String,
    endpoint: &Endpoint,
) -> Result<Request, GatewayError> {
    let (parts, body) = request.into_parts();
    let header = Header::from_http(&parts.headers);

    let limiter = endpoint.limiter();
    limits::check_header_size(&limiter, &header)?;

    let limit = limits::body_limit(&limiter, &header);
    if let Some(declared) = header
        .get(CONTENT_LENGTH)
        .and_then(|len| len.trim().parse::<usize>().ok())
    {
        limits::check_body_size(limit, declared)?;
    }
    let raw = axum::body::to_bytes(body, limit)
        .await
        .map_err(|_| GatewayError::PayloadTooLarge { limit })?;
    let body = Body::from_wire(&header, raw)?;

    let url = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or_else(|| parts.uri.path());
    let params = Params::extract(&endpoint.path, parts.uri.path()).unwrap_or_default();

    Ok(Request::new(
        parts.method.as_str(),
        url,
        client_ip,
        header,
        params,
        body,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LimiterConfig;

    fn endpoint(limiter: Option<LimiterConfig>) -> Endpoint {
        Endpoint {
            path: "/users/:id".into(),
            method: "POST".into(),
            limiter,
            ..Endpoint::default()
        }
    }

    #[tokio::test]
    async fn test_from_http() {
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/users/7?expand=true")
            .header("content-type", "application/json")
            .body(axum::body::Body::from(r#"{"name":"ana"}"#))
            .unwrap();

        let request = from_http(request, "10.0.0.1".into(), &endpoint(None))
            .await
            .unwrap();
        assert_eq!(request.method(), "POST");
        assert_eq!(request.path(), "/users/7");
        assert_eq!(request.params().get("id"), Some("7"));
        assert_eq!(request.query().get("expand"), Some("true"));
        assert_eq!(request.header().get("X-Forwarded-For"), Some("10.0.0.1"));
        assert!(request.body().unwrap().is_json());
    }

    #[tokio::test]
    async fn test_body_over_limit() {
        let limiter = LimiterConfig {
            max_body_size: Some(4),
            ..LimiterConfig::default()
        };
        let request = HttpRequest::builder()
            .method("POST")
            .uri("/users/7")
            .body(axum::body::Body::from("too large"))
            .unwrap();

        let err = from_http(request, String::new(), &endpoint(Some(limiter)))
            .await
            .unwrap_err();
        assert_eq!(err, GatewayError::PayloadTooLarge { limit: 4 });
    }

    #[test]
    fn test_request_ids_are_unique() {
        let request = HttpRequest::new(());
        let mut make = UuidRequestId;
        let a = make.make_request_id(&request).unwrap();
        let b = make.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
    }
}
