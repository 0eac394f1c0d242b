//! Response writing.
//!
//! Hop-by-hop headers from backends are dropped and the body headers are
//! rewritten from the body actually sent.

use axum::http::header::{
    HeaderName, CONNECTION, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, TE, TRAILER,
    TRANSFER_ENCODING, UPGRADE,
};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};

use crate::model::HttpResponse;

const HOP_BY_HOP: [HeaderName; 6] = [CONNECTION, TE, TRAILER, TRANSFER_ENCODING, UPGRADE, CONTENT_LENGTH];

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let mut headers = self.header.to_http();
        for name in HOP_BY_HOP {
            headers.remove(name);
        }
        headers.remove("keep-alive");
        headers.remove("proxy-connection");
        headers.remove(CONTENT_TYPE);
        headers.remove(CONTENT_ENCODING);

        let body = match self.body {
            Some(body) => {
                let raw = match body.raw() {
                    Ok(raw) => raw,
                    Err(err) => {
                        tracing::error!(error = %err, "failed to encode response body");
                        return err.into_response();
                    }
                };
                if let Ok(mime) = HeaderValue::from_str(body.mime()) {
                    headers.insert(CONTENT_TYPE, mime);
                }
                if let Some(encoding) = body.content_encoding().header_value() {
                    headers.insert(CONTENT_ENCODING, HeaderValue::from_static(encoding));
                }
                axum::body::Body::from(raw)
            }
            None => axum::body::Body::empty(),
        };

        (self.status_code.to_http(), headers, body).into_response()
    }
}
