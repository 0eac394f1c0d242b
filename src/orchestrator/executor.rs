//! Sequential execution of an endpoint's beforewares, backends and
//! afterwares.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::error::{join_errors, GatewayError};
use crate::factory::{build_http_response, build_request, build_response};
use crate::load_balancer::{LoadBalancer, Random};
use crate::model::backend::Backend;
use crate::model::endpoint::Endpoint;
use crate::model::request::{BackendRequest, Request};
use crate::model::response::{BackendResponse, HttpResponse, Response};
use crate::model::status_code::StatusCode;
use crate::observability::metrics;
use crate::orchestrator::client::HttpClient;

/// Runs endpoints against a middleware registry and an HTTP client.
#[derive(Clone)]
pub struct Orchestrator {
    middlewares: Arc<HashMap<String, Arc<Backend>>>,
    client: Arc<dyn HttpClient>,
    load_balancer: Arc<dyn LoadBalancer>,
}

impl Orchestrator {
    pub fn new(middlewares: HashMap<String, Arc<Backend>>, client: Arc<dyn HttpClient>) -> Self {
        Self {
            middlewares: Arc::new(middlewares),
            client,
            load_balancer: Arc::new(Random::new()),
        }
    }

    pub fn with_load_balancer(self, load_balancer: Arc<dyn LoadBalancer>) -> Self {
        Self {
            load_balancer,
            ..self
        }
    }

    /// Beforewares, backends and afterwares in execution order. Unknown
    /// middleware keys are skipped.
    fn steps(&self, endpoint: &Endpoint) -> Vec<Arc<Backend>> {
        let middleware = |key: &String| match self.middlewares.get(key) {
            Some(backend) => Some(backend.clone()),
            None => {
                warn!(
                    endpoint = %endpoint,
                    error = %GatewayError::UnknownMiddleware(key.clone()),
                    "skipping middleware"
                );
                None
            }
        };

        endpoint
            .beforewares
            .iter()
            .filter_map(middleware)
            .chain(endpoint.backends.iter().cloned())
            .chain(endpoint.afterwares.iter().filter_map(middleware))
            .collect()
    }

    /// Execute the endpoint for one inbound request.
    ///
    /// Calls are strictly sequential; each one can reference every earlier
    /// response. The endpoint timeout bounds the whole sequence.
    pub async fn execute(&self, endpoint: Arc<Endpoint>, request: Request) -> HttpResponse {
        let deadline = Instant::now() + endpoint.timeout();
        let steps = self.steps(&endpoint);
        let expected = steps.iter().filter(|b| !b.omit_response()).count();

        let mut request = request;
        let mut response = Response::new(endpoint.clone());

        for backend in &steps {
            let built = build_request(backend, &request, &response, self.load_balancer.as_ref());
            if !built.errors.is_empty() {
                warn!(
                    endpoint = %endpoint,
                    backend = %backend,
                    errors = %join_errors(&built.errors),
                    "backend request built with errors"
                );
            }
            request = built.request;
            response = built.response;
            let backend_request = built.value;

            let raw = self.call(&endpoint, backend, &backend_request, deadline).await;
            metrics::record_backend_call(&backend.to_string(), raw.status_code.as_u16());

            let built = build_response(backend, &backend_request, &raw, &request, &response);
            if !built.errors.is_empty() {
                warn!(
                    endpoint = %endpoint,
                    backend = %backend,
                    errors = %join_errors(&built.errors),
                    "backend response processed with errors"
                );
            }
            request = built.request;
            let recorded = built.value.unwrap_or(raw);
            let status = recorded.status_code;
            response = built.response.append(backend.clone(), backend_request, recorded);

            if endpoint.abort(status) {
                info!(endpoint = %endpoint, backend = %backend, status = %status, "aborting endpoint execution");
                response = response.abort();
                break;
            }
        }

        let (http_response, errors) = build_http_response(&response, &request, expected);
        if !errors.is_empty() {
            warn!(endpoint = %endpoint, errors = %join_errors(&errors), "endpoint response built with errors");
        }
        http_response
    }

    async fn call(
        &self,
        endpoint: &Endpoint,
        backend: &Backend,
        request: &BackendRequest,
        deadline: Instant,
    ) -> BackendResponse {
        let result = match tokio::time::timeout_at(deadline, self.client.make_request(request)).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Timeout { url: request.url() }),
        };

        match result {
            Ok(response) => response,
            Err(err) => {
                error!(endpoint = %endpoint, backend = %backend, error = %err, "backend call failed");
                let status = match err {
                    GatewayError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
                    _ => StatusCode::BAD_GATEWAY,
                };
                BackendResponse::failure(status, &endpoint.path, &backend.path, &err.to_string())
            }
        }
    }
}
