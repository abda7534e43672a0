//! Upstream request failures.
//!
//! # Responsibilities
//! - Describe a downstream call whose response was not acceptable
//! - Classify it as timeout / not-found / client-error / server-error
//!
//! # Design Decisions
//! - The original status and body text travel with the failure
//! - Classification is a pure function of the status code

use std::fmt;

use axum::http::StatusCode;
use thiserror::Error;

/// Category of an upstream failure, derived from its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamFailureKind {
    /// 408 Request Timeout or 504 Gateway Timeout.
    Timeout,
    /// 404 Not Found.
    NotFound,
    /// Any other 4xx.
    ClientError,
    /// Everything else.
    ServerError,
}

impl UpstreamFailureKind {
    pub fn of(status: StatusCode) -> Self {
        match status {
            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Self::Timeout,
            StatusCode::NOT_FOUND => Self::NotFound,
            s if s.is_client_error() => Self::ClientError,
            _ => Self::ServerError,
        }
    }
}

impl fmt::Display for UpstreamFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Timeout => "timeout",
            Self::NotFound => "not found",
            Self::ClientError => "client error",
            Self::ServerError => "server error",
        })
    }
}

/// A downstream call answered outside what the caller accepts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct UpstreamRequestFailed {
    status: StatusCode,
    message: String,
}

impl UpstreamRequestFailed {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> UpstreamFailureKind {
        UpstreamFailureKind::of(self.status)
    }
}
