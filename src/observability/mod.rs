//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! contract dispatch, filters, server produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters via the `metrics` facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → whatever metrics recorder the embedding binary installs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - Route templates, not raw paths, label metrics to bound cardinality
//! - Metrics are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
