//! Outbound HTTP calls to backends.

use async_trait::async_trait;
use axum::body::Body as HttpBody;
use axum::http::{header, HeaderValue, Method, Request as HttpRequest};
use hyper::body::Incoming;
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;

use crate::config::LimiterConfig;
use crate::error::GatewayError;
use crate::model::body::Body;
use crate::model::header::Header;
use crate::model::request::BackendRequest;
use crate::model::response::BackendResponse;
use crate::model::status_code::StatusCode;

/// Performs one backend call. Transport failures are returned, not
/// panicked; deadlines are enforced by the caller.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn make_request(&self, request: &BackendRequest) -> Result<BackendResponse, GatewayError>;
}

/// Default client over hyper-util's pooled legacy client. Backend bodies
/// larger than `max_body_size` fail the call.
#[derive(Clone)]
pub struct HyperHttpClient {
    client: Client<HttpConnector, HttpBody>,
    max_body_size: usize,
}

impl Default for HyperHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperHttpClient {
    pub fn new() -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self {
            client,
            max_body_size: LimiterConfig::DEFAULT_MAX_BODY_SIZE,
        }
    }

    pub fn with_max_body_size(mut self, limit: usize) -> Self {
        self.max_body_size = limit;
        self
    }

    fn to_http(request: &BackendRequest, url: &str) -> Result<HttpRequest<HttpBody>, GatewayError> {
        let transport = |reason: String| GatewayError::Transport {
            url: url.to_string(),
            reason,
        };

        let method = Method::from_bytes(request.method.to_ascii_uppercase().as_bytes())
            .map_err(|e| transport(e.to_string()))?;
        let mut builder = HttpRequest::builder().method(method).uri(url);

        if let Some(headers) = builder.headers_mut() {
            headers.extend(request.header.to_http());
        }

        let body = match &request.body {
            Some(body) => {
                if let Some(headers) = builder.headers_mut() {
                    if let Ok(value) = HeaderValue::from_str(body.mime()) {
                        headers.insert(header::CONTENT_TYPE, value);
                    }
                    if let Some(encoding) = body.content_encoding().header_value() {
                        headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static(encoding));
                    }
                }
                HttpBody::from(body.raw()?)
            }
            None => HttpBody::empty(),
        };

        builder.body(body).map_err(|e| transport(e.to_string()))
    }
}

#[async_trait]
impl HttpClient for HyperHttpClient {
    async fn make_request(&self, request: &BackendRequest) -> Result<BackendResponse, GatewayError> {
        let url = request.url();
        let http_request = Self::to_http(request, &url)?;

        let response: hyper::Response<Incoming> = self
            .client
            .request(http_request)
            .await
            .map_err(|e| GatewayError::Transport {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        let (parts, incoming) = response.into_parts();
        let raw = axum::body::to_bytes(HttpBody::new(incoming), self.max_body_size)
            .await
            .map_err(|e| GatewayError::Transport {
                url: url.clone(),
                reason: format!("reading body (limit {} bytes): {e}", self.max_body_size),
            })?;

        let header = Header::from_http(&parts.headers);
        let body = Body::from_wire(&header, raw)?;
        Ok(BackendResponse::new(StatusCode::from(parts.status), header, body))
    }
}
