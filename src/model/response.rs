//! Backend responses, the endpoint response state, and the final HTTP response.

use std::sync::Arc;

use serde_json::{json, Value};

use crate::model::backend::Backend;
use crate::model::body::Body;
use crate::model::endpoint::Endpoint;
use crate::model::header::Header;
use crate::model::history::History;
use crate::model::modifier::{Modifier, ModifierTarget};
use crate::model::request::BackendRequest;
use crate::model::status_code::StatusCode;

/// A response from one backend call.
#[derive(Debug, Clone)]
pub struct BackendResponse {
    pub status_code: StatusCode,
    pub header: Header,
    pub body: Option<Body>,
}

impl BackendResponse {
    pub fn new(status_code: StatusCode, header: Header, body: Option<Body>) -> Self {
        Self {
            status_code,
            header,
            body,
        }
    }

    /// Synthetic response for a call that never produced one.
    pub fn failure(status_code: StatusCode, endpoint: &str, backend: &str, message: &str) -> Self {
        let body = Body::json(&json!({
            "message": message,
            "endpoint": endpoint,
            "backend": backend,
        }));
        Self::new(status_code, Header::new(), Some(body))
    }

    pub fn to_json(&self) -> Value {
        json!({
            "statusCode": self.status_code.as_u16(),
            "ok": !self.status_code.failed(),
            "header": self.header.to_json(),
            "body": self.body.as_ref().map(Body::to_json).unwrap_or(Value::Null),
        })
    }
}

/// A response-scope modifier edit mirrored onto the endpoint response.
#[derive(Debug, Clone)]
pub struct PropagatedModifier {
    pub target: ModifierTarget,
    pub modifier: Modifier,
}

/// Endpoint response state: the call history plus pending global edits.
///
/// The final status, header and body are derived from this state once
/// execution stops.
#[derive(Debug, Clone)]
pub struct Response {
    endpoint: Arc<Endpoint>,
    history: History,
    propagated: Vec<PropagatedModifier>,
    aborted: bool,
}

impl Response {
    pub fn new(endpoint: Arc<Endpoint>) -> Self {
        Self {
            endpoint,
            history: History::new(),
            propagated: Vec::new(),
            aborted: false,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn propagated(&self) -> &[PropagatedModifier] {
        &self.propagated
    }

    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Record one backend call.
    pub fn append(
        &self,
        backend: Arc<Backend>,
        request: BackendRequest,
        response: BackendResponse,
    ) -> Self {
        Self {
            history: self.history.add(backend, request, response),
            ..self.clone()
        }
    }

    pub fn propagate(&self, target: ModifierTarget, modifier: Modifier) -> Self {
        let mut propagated = self.propagated.clone();
        propagated.push(PropagatedModifier { target, modifier });
        Self {
            propagated,
            ..self.clone()
        }
    }

    pub fn abort(&self) -> Self {
        Self {
            aborted: true,
            ..self.clone()
        }
    }
}

/// The response written back to the client.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status_code: StatusCode,
    pub header: Header,
    pub body: Option<Body>,
}
