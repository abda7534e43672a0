//! Contract routing: typed route specs, declared parameters, security and a
//! generated description, served as one routing handler.
//!
//! # Data Flow
//! ```text
//! RouteSpec::new("/items").path(id) ──bind(GET, factory)──► ContractRoute
//!                                                                │
//! ContractRoutingHandler::new().with_routes([...]) ◄─────────────┘
//!        │ with_security / with_filter / with_base_path / with_renderer
//!        ▼
//! compiled routers (one per route + description route) ──► dispatch
//! ```
//!
//! # Design Decisions
//! - Path values bind positionally and are retrieved by lens identity
//! - Binding failures are non-matches; declared-parameter failures are 400s
//! - Rendering of not-found, bad-request and description is pluggable

mod handler;
mod meta;
mod preflight;
mod renderer;
mod route;
mod security;
mod spec;

pub use handler::ContractRoutingHandler;
pub use meta::{RouteMeta, Tag};
pub use preflight::PreFlightExtraction;
pub use renderer::{ContractRenderer, JsonErrorRenderer, NoRenderer};
pub use route::{ContractRoute, ContractRouter, RouteTemplate};
pub use security::{ApiKeySecurity, NoSecurity, Security};
pub use spec::RouteSpec;
