//! gopen-gateway: an API gateway that fans one inbound request out to an
//! ordered list of backends and assembles a single response.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ───────▶ http (route per endpoint) ──▶ security (rate, size)
//!                                              │
//!                                              ▼
//!                                         cache (read) ── hit ──▶ Client Response
//!                                              │ miss
//!                                              ▼
//!                                        orchestrator
//!              ┌───────────────────────────────┴───────────────────────────┐
//!              │ for each beforeware, backend, afterware (sequentially):   │
//!              │   factory::build_request   (resolver, transform, modifier)│
//!              │   load_balancer → HttpClient ───────────────────────────▶ │──── Backend
//!              │   factory::build_response  (resolver, transform, modifier)│
//!              │   History += call; abort check                            │
//!              └───────────────────────────────┬───────────────────────────┘
//!                                              ▼
//!                            factory::build_http_response (aggregate, shape)
//!                                              │
//!                                              ▼
//!                                        cache (write) ──▶ Client Response
//! ```

// Core data
pub mod error;
pub mod json;
pub mod model;

// Configuration
pub mod config;

// Pipeline
pub mod factory;
pub mod modifier;
pub mod orchestrator;
pub mod resolver;
pub mod transform;

// Traffic management
pub mod cache;
pub mod http;
pub mod load_balancer;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
