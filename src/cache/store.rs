//! Cache storage contract and the in-memory store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::error::GatewayError;
use crate::model::body::Body;
use crate::model::header::Header;
use crate::model::response::HttpResponse;
use crate::model::status_code::StatusCode;

/// A stored endpoint response.
#[derive(Debug, Clone)]
pub struct CacheResponse {
    pub status_code: StatusCode,
    pub header: Header,
    pub body: Option<Body>,
    pub duration: Duration,
    pub created_at: Instant,
}

impl CacheResponse {
    pub fn new(response: &HttpResponse, duration: Duration) -> Self {
        Self {
            status_code: response.status_code,
            header: response.header.clone(),
            body: response.body.clone(),
            duration,
            created_at: Instant::now(),
        }
    }

    /// Time left before expiry: `created_at + duration - now`.
    pub fn ttl(&self) -> Duration {
        (self.created_at + self.duration).saturating_duration_since(Instant::now())
    }

    pub fn is_expired(&self) -> bool {
        self.ttl().is_zero()
    }
}

/// Concurrent response storage.
///
/// `get` reports a missing or expired entry as `GatewayError::CacheNotFound`,
/// distinct from store failures.
#[async_trait]
pub trait Store: Send + Sync {
    async fn set(&self, key: &str, value: CacheResponse) -> Result<(), GatewayError>;
    async fn get(&self, key: &str) -> Result<CacheResponse, GatewayError>;
    async fn del(&self, key: &str) -> Result<(), GatewayError>;
    async fn close(&self) -> Result<(), GatewayError>;
}

/// In-process store; expiry is checked on read and by `sweep`.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, CacheResponse>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired());
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn set(&self, key: &str, value: CacheResponse) -> Result<(), GatewayError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<CacheResponse, GatewayError> {
        let entry = self
            .entries
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or(GatewayError::CacheNotFound)?;
        if entry.is_expired() {
            self.entries.remove_if(key, |_, current| current.is_expired());
            return Err(GatewayError::CacheNotFound);
        }
        Ok(entry)
    }

    async fn del(&self, key: &str) -> Result<(), GatewayError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn close(&self) -> Result<(), GatewayError> {
        self.entries.clear();
        Ok(())
    }
}
