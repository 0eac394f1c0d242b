//! Response cache.
//!
//! # Data Flow
//! ```text
//! Request
//!     → gate.rs::can_read → key → Store::get
//!         hit  → cached response (X-Gopen-Cache: true, X-Gopen-Cache-Ttl)
//!         miss → orchestrator
//!     → gate.rs::can_write → Store::set
//! ```
//!
//! # Design Decisions
//! - The gate is pure; storage sits behind the `Store` trait
//! - Store failures are logged and treated as a miss

pub mod gate;
pub mod store;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::GatewayError;
use crate::model::endpoint::Endpoint;
use crate::model::header::{X_GOPEN_CACHE, X_GOPEN_CACHE_TTL};
use crate::model::request::Request;
use crate::model::response::HttpResponse;
use crate::observability::metrics;

pub use store::{CacheResponse, MemoryStore, Store};

/// Look up a stored response for `request`.
pub async fn read(store: &Arc<dyn Store>, endpoint: &Endpoint, request: &Request) -> Option<HttpResponse> {
    let cache = endpoint.cache();
    if !gate::can_read(&cache, request) {
        return None;
    }

    let key = gate::key(&cache, request);
    match store.get(&key).await {
        Ok(cached) => {
            debug!(endpoint = %endpoint, key = %key, "cache hit");
            metrics::record_cache_lookup(true);
            let ttl = cached.ttl();
            Some(HttpResponse {
                status_code: cached.status_code,
                header: cached
                    .header
                    .set(X_GOPEN_CACHE, "true")
                    .set(X_GOPEN_CACHE_TTL, format!("{ttl:?}")),
                body: cached.body,
            })
        }
        Err(GatewayError::CacheNotFound) => {
            debug!(endpoint = %endpoint, key = %key, "cache miss");
            metrics::record_cache_lookup(false);
            None
        }
        Err(err) => {
            warn!(endpoint = %endpoint, key = %key, error = %err, "cache read failed");
            None
        }
    }
}

/// Store `response` when the endpoint's policy allows it.
pub async fn write(store: &Arc<dyn Store>, endpoint: &Endpoint, request: &Request, response: &HttpResponse) {
    let cache = endpoint.cache();
    if !gate::can_write(&cache, request, response.status_code) {
        return;
    }

    let key = gate::key(&cache, request);
    if let Err(err) = store.set(&key, CacheResponse::new(response, cache.duration())).await {
        warn!(endpoint = %endpoint, key = %key, error = %err, "cache write failed");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::config::CacheConfig;
    use crate::model::body::Body;
    use crate::model::header::Header;
    use crate::model::params::Params;
    use crate::model::status_code::StatusCode;

    #[tokio::test]
    async fn test_write_then_read_marks_hit() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let endpoint = Endpoint {
            cache: Some(CacheConfig {
                enabled: Some(true),
                duration: Some(Duration::from_secs(30)),
                ..CacheConfig::default()
            }),
            ..Endpoint::default()
        };
        let request = Request::new("GET", "/a", "", Header::new(), Params::new(), None);
        let response = HttpResponse {
            status_code: StatusCode::OK,
            header: Header::new().set(X_GOPEN_CACHE, "false"),
            body: Some(Body::text("x")),
        };

        assert!(read(&store, &endpoint, &request).await.is_none());
        write(&store, &endpoint, &request, &response).await;

        let hit = read(&store, &endpoint, &request).await.unwrap();
        assert_eq!(hit.header.get(X_GOPEN_CACHE), Some("true"));
        assert!(hit.header.exists(X_GOPEN_CACHE_TTL));
        assert_eq!(hit.body.unwrap().as_str(), "x");
    }
}
