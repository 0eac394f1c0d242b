//! Pure transformations over headers, queries and bodies.
//!
//! # Data Flow
//! ```text
//! request body:  map → project → (modifiers) → omit-empty → nomenclature
//!                → content-type → content-encoding
//! header/query:  map → project → (modifiers)
//! endpoint:      aggregate history → omit-empty → nomenclature
//!                → content-type → content-encoding
//! ```
//!
//! # Design Decisions
//! - Transforms never edit their input; they return a new value
//! - Fallible transforms return `Result`; callers keep the last good value
//!   and log the error

pub mod aggregator;
pub mod content;
pub mod mapper;
pub mod nomenclature;
pub mod omitter;
pub mod projector;

pub use mapper::Mapper;
pub use nomenclature::Nomenclature;
pub use projector::{Projection, ProjectionKind};
