//! Append-only record of the backend calls made by one endpoint execution.

use std::sync::Arc;

use serde_json::Value;

use crate::model::backend::Backend;
use crate::model::request::BackendRequest;
use crate::model::response::BackendResponse;

#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub backend: Arc<Backend>,
    pub request: BackendRequest,
    pub response: BackendResponse,
}

impl HistoryEntry {
    /// Whether the response contributes to the endpoint response.
    pub fn contributes(&self) -> bool {
        !self.backend.omit_response()
    }
}

/// Every `add` returns a new history; existing snapshots never change.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<Arc<HistoryEntry>>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(
        &self,
        backend: Arc<Backend>,
        request: BackendRequest,
        response: BackendResponse,
    ) -> Self {
        let mut entries = self.entries.clone();
        entries.push(Arc::new(HistoryEntry {
            backend,
            request,
            response,
        }));
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last().map(Arc::as_ref)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().map(Arc::as_ref)
    }

    /// Entries whose backend is not configured to omit its response.
    pub fn filtered(&self) -> Vec<&HistoryEntry> {
        self.iter().filter(|entry| entry.contributes()).collect()
    }

    /// Document that `#responses...` expressions resolve against.
    pub fn to_json(&self) -> Value {
        Value::Array(self.iter().map(|entry| entry.response.to_json()).collect())
    }
}
