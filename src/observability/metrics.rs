//! Metrics collection.
//!
//! # Metrics
//! - `contract_requests_total` (counter): requests claimed by a route, by
//!   route template, method, status
//! - `contract_lens_failures_total` (counter): failed parameter checks, by
//!   route template
//!
//! # Design Decisions
//! - Emitted through the `metrics` facade; exposition is left to the binary
//! - Labels use the route template so cardinality stays bounded

use axum::http::{Method, StatusCode};
use metrics::counter;

/// Record one request answered by a contract route.
pub fn record_request(route: &str, method: &Method, status: StatusCode) {
    counter!(
        "contract_requests_total",
        "route" => route.to_string(),
        "method" => method.to_string(),
        "status" => status.as_u16().to_string()
    )
    .increment(1);
}

/// Record failed pre-flight checks for a route.
pub fn record_lens_failure(route: &str, failures: usize) {
    counter!("contract_lens_failures_total", "route" => route.to_string())
        .increment(failures as u64);
}
