//! Typed parameter extraction.
//!
//! # Data Flow
//! ```text
//! Route matching:
//!     path segment ──► PathLens<T> ──► ExtractedParts[lens id] ──► handler factory
//!
//! Pre-flight validation:
//!     request ──► [RequestLens<T> as Validate]* ──► Vec<Failure> ──► LensFailure
//! ```
//!
//! # Design Decisions
//! - Closed set of locations: path, query, header
//! - Lenses carry a stable identity; typed lookup goes through the same lens
//! - Extraction is deterministic and side-effect free
//! - Failures are values (`LensFailure`), never panics

pub mod extracted;
pub mod failure;
pub mod meta;
pub mod path;
pub mod request;

pub use extracted::ExtractedParts;
pub use failure::{Failure, LensFailure, RequestTarget};
pub use meta::{LensId, Location, Meta, ParamType};
pub use path::{Path, PathLens, PathLensSpec, PathParam};
pub use request::{validate_all, Header, ParamLensSpec, Query, RequestLens, Validate};
