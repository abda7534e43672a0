//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path)
//!     → path.rs (split into PathSegments)
//!     → matcher.rs (method + segment-prefix conditions)
//!     → router.rs (first matching Router yields a handler)
//!     → Return: HttpHandler or no-match
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Segment-wise matching, no regex in the hot path
//! - Deterministic: same input always matches same route
//! - First match wins (declaration order)

pub mod matcher;
pub mod path;
pub mod router;

pub use path::PathSegments;
pub use router::{Router, Routes, RoutingHttpHandler};
