//! Backend request/response factory.
//!
//! # Data Flow
//! ```text
//! Request + History
//!     → backend.rs::build_request  (host, body, path, header, query)
//!     → HttpClient
//!     → backend.rs::build_response (header, body, status code)
//!     → History appended by the orchestrator
//!     → endpoint.rs::build_http_response (aggregate, shape, gateway headers)
//! ```
//!
//! # Design Decisions
//! - Builders never fail; problems are returned next to a usable value
//! - Each sub-pipeline keeps its last good value when a step fails

pub mod backend;
pub mod endpoint;

pub use backend::{build_request, build_response, Built};
pub use endpoint::build_http_response;
