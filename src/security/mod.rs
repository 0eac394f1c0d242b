//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → rate_limit.rs (per endpoint, per client IP token bucket)
//!     → limits.rs (header bytes, body bytes)
//!     → cache / orchestrator
//! ```
//!
//! # Design Decisions
//! - Fail closed: a rejected request never reaches a backend
//! - Buckets live in a sharded map and are swept when idle

pub mod limits;
pub mod rate_limit;

pub use rate_limit::RateLimiter;
