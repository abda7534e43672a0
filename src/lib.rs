//! Contract-first HTTP routing.
//!
//! Typed route specs bound to handlers, composable filters, parameter lenses
//! with collected validation failures, and filters that turn failed upstream
//! calls into standard server responses.

pub mod config;
pub mod contract;
pub mod filter;
pub mod http;
pub mod lens;
pub mod lifecycle;
pub mod observability;
pub mod routing;

pub use config::AppConfig;
pub use contract::{ContractRoute, ContractRoutingHandler, RouteMeta, RouteSpec};
pub use filter::{Filter, FilterChain};
pub use http::{HandlerError, HandlerResult, HttpHandler, HttpServer};
pub use lifecycle::Shutdown;
pub use routing::{Router, RoutingHttpHandler};
