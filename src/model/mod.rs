//! Immutable value types threaded through endpoint execution.
//!
//! # Data Flow
//! ```text
//! config ──▶ Endpoint / Backend (shared, read-only)
//! inbound ──▶ Request ──factory──▶ BackendRequest ──client──▶ BackendResponse
//!                                                     │
//!                                  History ◀──append──┘
//!                                     │
//!                                  Response ──render──▶ HttpResponse
//! ```
//!
//! # Design Decisions
//! - Every mutator returns a new value; nothing is edited in place
//! - Only `Backend` and `Endpoint` are shared across requests (behind `Arc`)

pub mod backend;
pub mod body;
pub mod endpoint;
pub mod header;
pub mod history;
pub mod modifier;
mod multimap;
pub mod params;
pub mod query;
pub mod request;
pub mod response;
pub mod status_code;

pub use backend::Backend;
pub use body::{Body, ContentEncoding, ContentType};
pub use endpoint::Endpoint;
pub use header::Header;
pub use history::{History, HistoryEntry};
pub use modifier::{Modifier, ModifierAction, ModifierContext, ModifierScope, ModifierTarget};
pub use params::Params;
pub use query::Query;
pub use request::{BackendRequest, Request};
pub use response::{BackendResponse, HttpResponse, PropagatedModifier, Response};
pub use status_code::StatusCode;
