//! HTTP server setup.
//!
//! # Responsibilities
//! - One axum route per configured endpoint, method-filtered
//! - Wire up request ids and access tracing
//! - Limiter, cache and orchestrator per request
//! - Background sweeps of idle rate buckets and expired cache entries
//! - Graceful shutdown

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request as HttpRequest, State},
    http::Method,
    response::{IntoResponse, Response},
    routing::{on, MethodFilter, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, warn};

use crate::cache::{self, MemoryStore, Store};
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::http::request::{self, UuidRequestId};
use crate::lifecycle::{wait_for_shutdown, Shutdown};
use crate::model::{Endpoint, HttpResponse};
use crate::observability::metrics;
use crate::orchestrator::{HttpClient, HyperHttpClient, Orchestrator};
use crate::security::RateLimiter;

const SWEEP_INTERVAL: Duration = Duration::from_secs(30);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub store: Arc<dyn Store>,
}

/// Per route state.
struct EndpointRoute {
    endpoint: Arc<Endpoint>,
    limiter: Option<Arc<RateLimiter>>,
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
    limiters: Vec<Arc<RateLimiter>>,
    store: MemoryStore,
    shutdown: Shutdown,
}

impl HttpServer {
    /// Build the server with the hyper client and an in-memory cache.
    pub fn new(config: &GatewayConfig, shutdown: Shutdown) -> Self {
        let max_body_size = config.limiter.clone().unwrap_or_default().max_body_size();
        let client = HyperHttpClient::new().with_max_body_size(max_body_size);
        Self::with_client(config, Arc::new(client), shutdown)
    }

    pub fn with_client(config: &GatewayConfig, client: Arc<dyn HttpClient>, shutdown: Shutdown) -> Self {
        let store = MemoryStore::new();
        let state = AppState {
            orchestrator: Orchestrator::new(config.middlewares.clone(), client),
            store: Arc::new(store.clone()),
        };

        let mut limiters = Vec::new();
        let mut routes: BTreeMap<String, MethodRouter<AppState>> = BTreeMap::new();
        for endpoint in &config.endpoints {
            let Some(filter) = method_filter(&endpoint.method) else {
                warn!(endpoint = %endpoint, "skipping endpoint with unsupported method");
                continue;
            };

            let limiter = endpoint
                .limiter()
                .rate
                .map(|rate| Arc::new(RateLimiter::new(&rate)));
            limiters.extend(limiter.clone());

            let route = Arc::new(EndpointRoute {
                endpoint: Arc::new(endpoint.clone()),
                limiter,
            });
            let handler = move |State(state): State<AppState>, request: HttpRequest| {
                let route = route.clone();
                async move { handle(state, route, request).await }
            };

            let path = axum_path(&endpoint.path);
            debug!(endpoint = %endpoint, route = %path, "registering endpoint");
            let method_router = match routes.remove(&path) {
                Some(existing) => existing.on(filter, handler),
                None => on(filter, handler),
            };
            routes.insert(path, method_router);
        }

        let router = routes
            .into_iter()
            .fold(Router::new(), |router, (path, method_router)| {
                router.route(&path, method_router)
            })
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            );

        Self {
            router,
            limiters,
            store,
            shutdown,
        }
    }

    /// The axum router, without connection info.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until the shutdown signal.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        info!(address = %addr, "HTTP server starting");

        tokio::spawn(sweep(self.limiters, self.store, self.shutdown.clone()));

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();
        let shutdown = self.shutdown.clone();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move { wait_for_shutdown(&shutdown).await })
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

async fn sweep(limiters: Vec<Arc<RateLimiter>>, store: MemoryStore, shutdown: Shutdown) {
    let mut stop = shutdown.subscribe();
    let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
    ticker.tick().await;
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let buckets: usize = limiters.iter().map(|limiter| limiter.sweep()).sum();
                let entries = store.sweep();
                if buckets + entries > 0 {
                    debug!(buckets, entries, "swept idle state");
                }
            }
            _ = stop.recv() => return,
        }
    }
}

/// `/users/:id` → `/users/{id}`.
fn axum_path(template: &str) -> String {
    let path = template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/");
    if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

fn method_filter(method: &str) -> Option<MethodFilter> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes()).ok()?;
    MethodFilter::try_from(method).ok()
}

async fn handle(state: AppState, route: Arc<EndpointRoute>, request: HttpRequest) -> Response {
    let start = Instant::now();
    let endpoint = &route.endpoint;
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let response = match serve(&state, &route, client_ip, request).await {
        Ok(response) => response.into_response(),
        Err(err) => {
            warn!(endpoint = %endpoint, error = %err, "request rejected");
            err.into_response()
        }
    };

    metrics::record_request(&endpoint.path, &endpoint.method, response.status().as_u16(), start);
    response
}

async fn serve(
    state: &AppState,
    route: &EndpointRoute,
    client_ip: String,
    request: HttpRequest,
) -> Result<HttpResponse, GatewayError> {
    let endpoint = &route.endpoint;
    if let Some(limiter) = &route.limiter {
        limiter.check(&client_ip)?;
    }

    let request = request::from_http(request, client_ip, endpoint).await?;

    if let Some(cached) = cache::read(&state.store, endpoint, &request).await {
        return Ok(cached);
    }

    let response = state
        .orchestrator
        .execute(endpoint.clone(), request.clone())
        .await;
    cache::write(&state.store, endpoint, &request, &response).await;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axum_path() {
        assert_eq!(axum_path("/users/:id"), "/users/{id}");
        assert_eq!(axum_path("/users/:id/orders/:order"), "/users/{id}/orders/{order}");
        assert_eq!(axum_path("health"), "/health");
        assert_eq!(axum_path("/"), "/");
    }

    #[test]
    fn test_method_filter() {
        assert_eq!(method_filter("get"), Some(MethodFilter::GET));
        assert_eq!(method_filter("PATCH"), Some(MethodFilter::PATCH));
        assert_eq!(method_filter("CONNECTX"), None);
    }
}
