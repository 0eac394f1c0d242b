//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum route per endpoint, request id, trace)
//!     → rate limiter
//!     → request.rs (size limits, axum request → model::Request)
//!     → cache read → orchestrator → cache write
//!     → response.rs (HttpResponse → axum response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
