//! HTTP plumbing shared by every other subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum, tracing + timeout layers)
//!     → ContractRoutingHandler (fallback service)
//!     → HttpHandler chain (handler.rs)
//!     → response.rs helpers build the reply
//! ```

pub mod handler;
pub mod response;
pub mod server;

pub use handler::{HandlerError, HandlerResult, HttpHandler};
pub use server::HttpServer;
