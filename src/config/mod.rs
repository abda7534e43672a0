//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → ContractRoutingHandler::from_config / HttpServer::new
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_bind_override, load_config, parse_config, ConfigError};
pub use schema::{
    AppConfig, ContractConfig, ListenerConfig, LogFormat, ObservabilityConfig, PreFlightMode,
    TimeoutConfig,
};
