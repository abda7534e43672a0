//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate path shapes for the contract root and description route
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::AppConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("contract.base_path '{0}' must be empty or start with '/' without a trailing '/'")]
    InvalidBasePath(String),

    #[error("contract.description_path '{0}' must be empty or start with '/'")]
    InvalidDescriptionPath(String),

    #[error("listener.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("timeouts.request_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("observability.log_level '{0}' is not one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),
}

/// Check every semantic rule and report all violations.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let base = &config.contract.base_path;
    if !base.is_empty() && (!base.starts_with('/') || base.ends_with('/')) {
        errors.push(ValidationError::InvalidBasePath(base.clone()));
    }

    let description = &config.contract.description_path;
    if !description.is_empty() && !description.starts_with('/') {
        errors.push(ValidationError::InvalidDescriptionPath(description.clone()));
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::InvalidLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_config(&AppConfig::default()).is_ok());
    }

    #[test]
    fn test_reports_every_error() {
        let mut config = AppConfig::default();
        config.contract.base_path = "v1/".to_string();
        config.contract.description_path = "docs".to_string();
        config.listener.bind_address = "localhost".to_string();
        config.timeouts.request_secs = 0;
        config.observability.log_level = "loud".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidBasePath("v1/".to_string()),
                ValidationError::InvalidDescriptionPath("docs".to_string()),
                ValidationError::InvalidBindAddress("localhost".to_string()),
                ValidationError::ZeroRequestTimeout,
                ValidationError::InvalidLogLevel("loud".to_string()),
            ]
        );
    }

    #[test]
    fn test_base_path_shapes() {
        let mut config = AppConfig::default();
        for ok in ["", "/v1", "/api/v2"] {
            config.contract.base_path = ok.to_string();
            assert!(validate_config(&config).is_ok(), "{ok} should be valid");
        }
        config.contract.base_path = "/".to_string();
        assert!(validate_config(&config).is_err());
    }
}
