//! Extraction failures.
//!
//! # Design Decisions
//! - A [`LensFailure`] always carries every failing parameter, never just the first
//! - The offending request is summarised (method + uri), not retained

use std::fmt;

use axum::http::{Method, Request, Uri};
use thiserror::Error;

use super::meta::Meta;

/// Why a single parameter could not be extracted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// A required parameter was absent.
    Missing(Meta),
    /// The parameter was present but could not be parsed.
    Invalid(Meta),
    /// The parameter was present and parsed but is not acceptable here.
    Unsupported(Meta),
}

impl Failure {
    pub fn meta(&self) -> &Meta {
        match self {
            Failure::Missing(meta) | Failure::Invalid(meta) | Failure::Unsupported(meta) => meta,
        }
    }

    /// Short machine-friendly label for renderers.
    pub fn reason(&self) -> &'static str {
        match self {
            Failure::Missing(_) => "Missing",
            Failure::Invalid(_) => "Invalid",
            Failure::Unsupported(_) => "Unsupported",
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Missing(meta) => write!(f, "{meta} is required"),
            Failure::Invalid(meta) => write!(f, "{meta} must be {}", meta.param_type),
            Failure::Unsupported(meta) => write!(f, "{meta} is not acceptable"),
        }
    }
}

/// Method and URI of the request a failure was raised against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestTarget {
    pub method: Method,
    pub uri: Uri,
}

impl<B> From<&Request<B>> for RequestTarget {
    fn from(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
        }
    }
}

impl fmt::Display for RequestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.uri)
    }
}

/// One or more parameters failed to extract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", join_failures(.failures))]
pub struct LensFailure {
    failures: Vec<Failure>,
    target: Option<RequestTarget>,
}

fn join_failures(failures: &[Failure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl LensFailure {
    pub fn new(failures: Vec<Failure>) -> Self {
        Self {
            failures,
            target: None,
        }
    }

    pub fn single(failure: Failure) -> Self {
        Self::new(vec![failure])
    }

    /// Record the request the failures were found in.
    pub fn with_target<B>(mut self, request: &Request<B>) -> Self {
        self.target = Some(RequestTarget::from(request));
        self
    }

    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    pub fn target(&self) -> Option<&RequestTarget> {
        self.target.as_ref()
    }

    pub fn into_failures(self) -> Vec<Failure> {
        self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::meta::{Location, ParamType};

    #[test]
    fn test_failure_messages() {
        let limit = Meta::new("limit", Location::Query, true, ParamType::Integer);
        assert_eq!(
            Failure::Missing(limit.clone()).to_string(),
            "query 'limit' is required"
        );
        assert_eq!(
            Failure::Invalid(limit.clone()).to_string(),
            "query 'limit' must be integer"
        );
        assert_eq!(
            Failure::Unsupported(limit).to_string(),
            "query 'limit' is not acceptable"
        );
    }

    #[test]
    fn test_lens_failure_lists_every_failure() {
        let a = Meta::new("a", Location::Query, true, ParamType::String);
        let b = Meta::new("b", Location::Header, true, ParamType::Boolean);
        let request = Request::get("/x?y=1").body(()).unwrap();
        let failure = LensFailure::new(vec![Failure::Missing(a), Failure::Invalid(b)])
            .with_target(&request);

        assert_eq!(
            failure.to_string(),
            "query 'a' is required, header 'b' must be boolean"
        );
        assert_eq!(failure.target().unwrap().to_string(), "GET /x?y=1");
    }
}
