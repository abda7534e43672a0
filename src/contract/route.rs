//! Contract routes: a spec bound to a method and a handler factory.
//!
//! # Data Flow
//! ```text
//! request ──► method matches (or OPTIONS)? ──► path starts with root+prefix?
//!                                                     │
//!                     remaining segments == lenses.len()?
//!                                                     │
//!                     every lens binds its segment? ──► factory(parts) ──► handler
//!                                                     │
//!                     any "no" above ──► no match (None)
//! ```
//!
//! # Design Decisions
//! - Arity is strict: trailing segments mean no match, never a partial bind
//! - A segment that fails its lens is a non-match, so a later route may still
//!   claim the request
//! - Pre-flight probes that bind answer `200 OK` without running the factory

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use thiserror::Error;
use tracing::{debug, trace};

use super::meta::{RouteMeta, Tag};
use super::preflight::{pre_flight_extraction_filter, PreFlightExtraction};
use super::spec::RouteSpec;
use crate::filter::server::catch_lens_failure;
use crate::http::{response, HttpHandler};
use crate::lens::{ExtractedParts, LensFailure, Meta, PathParam};
use crate::routing::matcher::{is_pre_flight, AndMatcher, Matcher, MethodMatcher, SegmentPrefixMatcher};
use crate::routing::{PathSegments, Router};

pub(crate) type HandlerFactory = Arc<dyn Fn(ExtractedParts) -> HttpHandler + Send + Sync>;

/// Template of the route that claimed a request, e.g. `/v1/items/{id}`.
/// Set on request and response extensions by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteTemplate(pub String);

impl RouteTemplate {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A route spec bound to an HTTP method and a handler factory.
#[derive(Clone)]
pub struct ContractRoute {
    method: Method,
    spec: RouteSpec,
    factory: HandlerFactory,
}

impl ContractRoute {
    pub(crate) fn new(method: Method, spec: RouteSpec, factory: HandlerFactory) -> Self {
        Self {
            method,
            spec,
            factory,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn spec(&self) -> &RouteSpec {
        &self.spec
    }

    pub fn meta(&self) -> &RouteMeta {
        self.spec.meta()
    }

    /// Declared query/header parameters followed by path parameters.
    pub fn non_body_params(&self) -> Vec<Meta> {
        self.meta()
            .request_params()
            .iter()
            .map(|param| param.meta().clone())
            .chain(
                self.spec
                    .path_lenses()
                    .iter()
                    .filter(|lens| !lens.is_fixed())
                    .map(|lens| lens.meta().clone()),
            )
            .collect()
    }

    /// Tags sorted by name, duplicates removed.
    pub fn tags(&self) -> Vec<Tag> {
        let mut tags = self.meta().tags().to_vec();
        tags.sort();
        tags.dedup();
        tags
    }

    pub fn describe_for(&self, root: &PathSegments) -> String {
        self.spec.describe(root)
    }

    /// A request for this route's template, addressed to `base_uri`.
    ///
    /// The URI is the template itself, not a concrete path: placeholders are
    /// percent-encoded, so `/items/{id}` becomes `/items/%7Bid%7D`. Callers
    /// that need a concrete request substitute the encoded placeholders.
    pub fn new_request(&self, base_uri: &str) -> Result<Request<Body>, axum::http::Error> {
        let template = self.describe_for(&PathSegments::root());
        let mut path: String = template
            .split('/')
            .filter(|segment| !segment.is_empty())
            .map(|segment| format!("/{}", urlencoding::encode(segment)))
            .collect();
        if path.is_empty() {
            path.push('/');
        }
        let uri = format!("{}{}", base_uri.trim_end_matches('/'), path);
        Request::builder()
            .method(self.method.clone())
            .uri(uri)
            .body(Body::empty())
    }

    /// Router for this route mounted under `root`.
    pub fn to_router(&self, root: &PathSegments) -> ContractRouter {
        ContractRouter::new(self.clone(), root)
    }

    /// Serve this route on its own, outside any contract: 404 when it does
    /// not match, plain 400 on parameter failures.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        let Some(handler) = self.to_router(&PathSegments::root()).match_request(&request) else {
            return response::empty(StatusCode::NOT_FOUND);
        };
        let chain = self
            .meta()
            .security_filter()
            .then(catch_lens_failure(|_| response::empty(StatusCode::BAD_REQUEST)))
            .then(pre_flight_extraction_filter(
                self.meta(),
                &PreFlightExtraction::All,
            ));
        match chain.apply(handler).call(request).await {
            Ok(response) => response,
            Err(error) => error.into_response(),
        }
    }
}

impl fmt::Display for ContractRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.method, self.describe_for(&PathSegments::root()))
    }
}

impl fmt::Debug for ContractRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractRoute")
            .field("method", &self.method)
            .field("spec", &self.spec)
            .finish()
    }
}

/// Why a structurally matching request did not bind.
#[derive(Debug, Error)]
enum BindError {
    #[error("expected {expected} path segments after the prefix, got {actual}")]
    Arity { expected: usize, actual: usize },
    #[error(transparent)]
    Lens(#[from] LensFailure),
}

/// Bind each remaining segment to the lens at the same position.
fn extract(
    remaining: &PathSegments,
    lenses: &[Arc<dyn PathParam>],
) -> Result<ExtractedParts, BindError> {
    if remaining.len() != lenses.len() {
        return Err(BindError::Arity {
            expected: lenses.len(),
            actual: remaining.len(),
        });
    }
    let values = lenses
        .iter()
        .zip(remaining.tokens())
        .map(|(lens, segment)| Ok((lens.id(), lens.extract_value(segment)?)))
        .collect::<Result<HashMap<_, _>, LensFailure>>()?;
    Ok(ExtractedParts::new(values))
}

/// [`Router`] for one contract route mounted under a root.
pub struct ContractRouter {
    route: ContractRoute,
    prefix: PathSegments,
    matcher: AndMatcher,
    template: String,
}

impl ContractRouter {
    fn new(route: ContractRoute, root: &PathSegments) -> Self {
        let prefix = route.spec.path_fn(root);
        let matcher = AndMatcher::new(vec![
            Box::new(MethodMatcher::new(route.method.clone())),
            Box::new(SegmentPrefixMatcher::new(prefix.clone())),
        ]);
        let template = route.describe_for(root);
        Self {
            route,
            prefix,
            matcher,
            template,
        }
    }

    pub fn route(&self) -> &ContractRoute {
        &self.route
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl Router for ContractRouter {
    fn match_request(&self, request: &Request<Body>) -> Option<HttpHandler> {
        if !self.matcher.matches(request) {
            return None;
        }
        let remaining = PathSegments::new(request.uri().path()).without(&self.prefix);
        match extract(&remaining, self.route.spec.path_lenses()) {
            Ok(_) if is_pre_flight(request) => Some(HttpHandler::status(StatusCode::OK)),
            Ok(parts) => {
                trace!(route = %self, bound = parts.len(), "route matched");
                Some((self.route.factory)(parts))
            }
            Err(reason) => {
                debug!(route = %self, path = %request.uri().path(), %reason, "route did not bind");
                None
            }
        }
    }
}

impl fmt::Display for ContractRouter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.route.method, self.template)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::{Path, Query};

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    fn echo_route() -> ContractRoute {
        let id = Path::int().of("id");
        let name = Path::string().of("name");
        RouteSpec::new("/hello")
            .path(id.clone())
            .path(name.clone())
            .bind(Method::GET, move |parts| {
                let body = format!("{}:{}", parts.get(&id).unwrap(), parts.get(&name).unwrap());
                HttpHandler::new(move |_| {
                    let body = body.clone();
                    async move { Ok(response::text(StatusCode::OK, body)) }
                })
            })
    }

    #[tokio::test]
    async fn test_binds_path_values_in_order() {
        let router = echo_route().to_router(&PathSegments::root());
        let handler = router.match_request(&request(Method::GET, "/hello/7/bob")).unwrap();
        let response = handler.call(request(Method::GET, "/hello/7/bob")).await.unwrap();
        assert_eq!(response::body_text(response.into_body(), 1024).await.unwrap(), "7:bob");
    }

    #[test]
    fn test_strict_arity_and_lens_failures_do_not_match() {
        let router = echo_route().to_router(&PathSegments::root());
        assert!(router.match_request(&request(Method::GET, "/hello/7")).is_none());
        assert!(router.match_request(&request(Method::GET, "/hello/7/bob/extra")).is_none());
        assert!(router.match_request(&request(Method::GET, "/hello/seven/bob")).is_none());
        assert!(router.match_request(&request(Method::POST, "/hello/7/bob")).is_none());
        assert!(router.match_request(&request(Method::GET, "/hellothere/7/bob")).is_none());
    }

    #[test]
    fn test_root_is_prefixed() {
        let router = echo_route().to_router(&PathSegments::new("/v1"));
        assert_eq!(router.template(), "/v1/hello/{id}/{name}");
        assert!(router.match_request(&request(Method::GET, "/v1/hello/1/a")).is_some());
        assert!(router.match_request(&request(Method::GET, "/hello/1/a")).is_none());
    }

    #[tokio::test]
    async fn test_pre_flight_answers_ok() {
        let router = echo_route().to_router(&PathSegments::root());
        let handler = router.match_request(&request(Method::OPTIONS, "/hello/1/a")).unwrap();
        let response = handler.call(request(Method::OPTIONS, "/hello/1/a")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_standalone_handle() {
        let route = RouteSpec::new("/search")
            .with_meta(RouteMeta::new().param(Query::string().required("q")))
            .bind_handler(Method::GET, HttpHandler::status(StatusCode::OK));

        assert_eq!(route.handle(request(Method::GET, "/search?q=x")).await.status(), StatusCode::OK);
        assert_eq!(route.handle(request(Method::GET, "/search")).await.status(), StatusCode::BAD_REQUEST);
        assert_eq!(route.handle(request(Method::GET, "/other")).await.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_describes_params_and_tags() {
        let route = RouteSpec::new("/items")
            .path(Path::int().of("id"))
            .fixed("history")
            .with_meta(
                RouteMeta::new()
                    .param(Query::int().optional("limit"))
                    .tag("items")
                    .tag("audit")
                    .tag("items"),
            )
            .bind_handler(Method::GET, HttpHandler::status(StatusCode::OK));

        let names: Vec<String> = route.non_body_params().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["limit", "id"]);
        let tags: Vec<String> = route.tags().into_iter().map(|t| t.name).collect();
        assert_eq!(tags, vec!["audit", "items"]);
        assert_eq!(route.to_string(), "GET: /items/{id}/history");

        let request = route.new_request("http://localhost:8080/").unwrap();
        assert_eq!(request.uri(), "http://localhost:8080/items/%7Bid%7D/history");
    }
}
