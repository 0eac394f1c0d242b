//! Endpoint orchestration.
//!
//! # Data Flow
//! ```text
//! Request
//!     → for each step (beforewares → backends → afterwares):
//!         factory::build_request → HttpClient (bounded by endpoint deadline)
//!         → factory::build_response → History
//!         → abort check (explicit status list, else status >= 400)
//!     → factory::build_http_response
//! ```
//!
//! # Design Decisions
//! - Calls run one after another so each sees the previous responses
//! - Transport errors become 502 and deadline overruns 504; both go
//!   through the normal abort check
//! - The client is a trait object so tests can script responses

pub mod client;
pub mod executor;

pub use client::{HttpClient, HyperHttpClient};
pub use executor::Orchestrator;
