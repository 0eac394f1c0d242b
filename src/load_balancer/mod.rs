//! Host selection for multi-host backends.
//!
//! # Data Flow
//! ```text
//! factory::build_request(backend)
//!     → LoadBalancer::next_host(backend.hosts)
//!         - random.rs (default: uniform choice)
//!         - round_robin.rs (rotate through hosts)
//!     → host prefixed to the rendered backend path
//! ```
//!
//! # Design Decisions
//! - Selection is stateless per request; hosts carry no health state

pub mod random;
pub mod round_robin;

pub use random::Random;
pub use round_robin::RoundRobin;

/// Chooses the host a backend call goes to.
pub trait LoadBalancer: Send + Sync {
    fn next_host<'a>(&self, hosts: &'a [String]) -> Option<&'a str>;
}
