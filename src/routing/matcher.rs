//! Structural request matching.
//!
//! # Responsibilities
//! - Match the request method (with pre-flight probes accepted)
//! - Match a segment-wise path prefix
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is by whole segments, never by string prefix
//! - Path matching is case-sensitive
//! - Matchers look only at method and path; parameter values are not checked
//!   here (that is binding, not structure)

use axum::body::Body;
use axum::http::{Method, Request};

use super::path::PathSegments;

/// Trait for matching requests against structural conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, req: &Request<Body>) -> bool;
}

/// Is this request a CORS-style pre-flight probe?
pub fn is_pre_flight(req: &Request<Body>) -> bool {
    req.method() == Method::OPTIONS
}

/// Matches one method, and always matches pre-flight probes.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    method: Method,
}

impl MethodMatcher {
    pub fn new(method: Method) -> Self {
        Self { method }
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        is_pre_flight(req) || req.method() == self.method
    }
}

/// Matches requests whose path starts with the given segments.
#[derive(Debug, Clone)]
pub struct SegmentPrefixMatcher {
    prefix: PathSegments,
}

impl SegmentPrefixMatcher {
    pub fn new(prefix: PathSegments) -> Self {
        Self { prefix }
    }

    pub fn prefix(&self) -> &PathSegments {
        &self.prefix
    }
}

impl Matcher for SegmentPrefixMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        PathSegments::new(req.uri().path()).starts_with(&self.prefix)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, req: &Request<Body>) -> bool {
        self.matchers.iter().all(|m| m.matches(req))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::default())
            .unwrap()
    }

    #[test]
    fn test_method_matcher() {
        let matcher = MethodMatcher::new(Method::GET);
        assert!(matcher.matches(&request(Method::GET, "/")));
        assert!(matcher.matches(&request(Method::OPTIONS, "/")));
        assert!(!matcher.matches(&request(Method::POST, "/")));
    }

    #[test]
    fn test_segment_prefix_matcher() {
        let matcher = SegmentPrefixMatcher::new(PathSegments::new("/api"));
        assert!(matcher.matches(&request(Method::GET, "http://example.com/api/v1")));
        assert!(matcher.matches(&request(Method::GET, "/api")));
        assert!(!matcher.matches(&request(Method::GET, "/apis")));
        assert!(!matcher.matches(&request(Method::GET, "/images")));
    }

    #[test]
    fn test_and_matcher() {
        let matcher = AndMatcher::new(vec![
            Box::new(MethodMatcher::new(Method::DELETE)),
            Box::new(SegmentPrefixMatcher::new(PathSegments::new("/items"))),
        ]);
        assert!(matcher.matches(&request(Method::DELETE, "/items/1")));
        assert!(!matcher.matches(&request(Method::GET, "/items/1")));
        assert!(!matcher.matches(&request(Method::DELETE, "/other")));
    }
}
