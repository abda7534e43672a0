//! The contract routing handler.
//!
//! # Data Flow
//! ```text
//! request ──► under root? ──no──► None (caller falls through)
//!                 │yes
//!                 ▼
//!         routes in declaration order, then the description route
//!                 │first bind                       │nothing binds
//!                 ▼                                 ▼
//!   identify ─► pre-security ─► security     pre-security ─► security
//!   ─► route security ─► post-security       ─► post-security ─► not found
//!   ─► catch lens failure ─► pre-flight
//!   ─► handler
//! ```
//!
//! # Design Decisions
//! - Copy-on-write: every `with_*` returns a new handler; the receiver is
//!   never touched and the per-route routers are rebuilt for the new value
//! - Compiled routers are immutable and shared, so dispatch takes no locks
//! - Security runs before parameter validation, so unauthenticated callers
//!   learn nothing about parameters

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::response::IntoResponse;
use futures_util::future::BoxFuture;
use tracing::{debug, warn};

use super::meta::RouteMeta;
use super::preflight::{pre_flight_extraction_filter, PreFlightExtraction};
use super::renderer::{ContractRenderer, NoRenderer};
use super::route::{ContractRoute, ContractRouter, RouteTemplate};
use super::security::{NoSecurity, Security};
use super::spec::RouteSpec;
use crate::config::schema::ContractConfig;
use crate::filter::server::catch_lens_failure;
use crate::filter::{Filter, FilterChain};
use crate::http::{HandlerResult, HttpHandler};
use crate::observability::metrics;
use crate::routing::matcher::{Matcher, SegmentPrefixMatcher};
use crate::routing::{PathSegments, Router, RoutingHttpHandler};

/// Routers and fallback derived from a handler's configuration.
struct Compiled {
    root: SegmentPrefixMatcher,
    routers: Vec<(FilterChain, ContractRouter)>,
    not_found: HttpHandler,
}

/// Contract-aware router: a set of routes under a root, wrapped in security
/// and filters, with a generated description route.
#[derive(Clone)]
pub struct ContractRoutingHandler {
    renderer: Arc<dyn ContractRenderer>,
    security: Arc<dyn Security>,
    description_path: String,
    pre_flight_extraction: PreFlightExtraction,
    routes: Vec<ContractRoute>,
    root: PathSegments,
    pre_security_filter: FilterChain,
    post_security_filter: FilterChain,
    include_description_route: bool,
    compiled: Arc<Compiled>,
}

impl Default for ContractRoutingHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ContractRoutingHandler {
    pub fn new() -> Self {
        Self {
            renderer: Arc::new(NoRenderer),
            security: Arc::new(NoSecurity),
            description_path: String::new(),
            pre_flight_extraction: PreFlightExtraction::All,
            routes: Vec::new(),
            root: PathSegments::root(),
            pre_security_filter: FilterChain::new(),
            post_security_filter: FilterChain::new(),
            include_description_route: false,
            compiled: Arc::new(Compiled {
                root: SegmentPrefixMatcher::new(PathSegments::root()),
                routers: Vec::new(),
                not_found: HttpHandler::status(StatusCode::NOT_FOUND),
            }),
        }
        .compile()
    }

    /// Handler configured from the `[contract]` config section.
    pub fn from_config(config: &ContractConfig) -> Self {
        Self::new()
            .with_description_path(&config.description_path)
            .with_pre_flight_extraction(config.pre_flight_extraction.into())
            .with_description_route(config.include_description_route)
            .with_base_path(&config.base_path)
    }

    pub fn with_renderer(&self, renderer: impl ContractRenderer + 'static) -> Self {
        Self {
            renderer: Arc::new(renderer),
            ..self.clone()
        }
        .compile()
    }

    pub fn with_security(&self, security: impl Security + 'static) -> Self {
        Self {
            security: Arc::new(security),
            ..self.clone()
        }
        .compile()
    }

    pub fn with_description_path(&self, path: &str) -> Self {
        Self {
            description_path: path.to_string(),
            ..self.clone()
        }
        .compile()
    }

    pub fn with_pre_flight_extraction(&self, policy: PreFlightExtraction) -> Self {
        Self {
            pre_flight_extraction: policy,
            ..self.clone()
        }
        .compile()
    }

    /// List the description route itself in the description.
    pub fn with_description_route(&self, include: bool) -> Self {
        Self {
            include_description_route: include,
            ..self.clone()
        }
        .compile()
    }

    pub fn with_route(&self, route: ContractRoute) -> Self {
        self.with_routes([route])
    }

    /// Append routes after the existing ones.
    pub fn with_routes(&self, routes: impl IntoIterator<Item = ContractRoute>) -> Self {
        let mut all = self.routes.clone();
        all.extend(routes);
        Self {
            routes: all,
            ..self.clone()
        }
        .compile()
    }

    /// Add a filter that runs after security, inside existing post-security
    /// filters.
    pub fn with_post_security_filter(&self, filter: Filter) -> Self {
        Self {
            post_security_filter: self.post_security_filter.clone().then(filter),
            ..self.clone()
        }
        .compile()
    }

    pub fn routes(&self) -> &[ContractRoute] {
        &self.routes
    }

    pub fn root(&self) -> &PathSegments {
        &self.root
    }

    pub fn description_path(&self) -> &str {
        &self.description_path
    }

    /// Dispatch a request under the contract root. Requests that no route
    /// claims get the renderer's not-found response through the pre-security,
    /// security and post-security filters.
    pub async fn invoke(&self, request: Request<Body>) -> HandlerResult {
        let handler = self.match_request(&request).unwrap_or_else(|| {
            debug!(method = %request.method(), path = %request.uri().path(), "no contract route matched");
            self.compiled.not_found.clone()
        });
        handler.call(request).await
    }

    /// Like [`invoke`](Self::invoke), converting any escaped error into a
    /// response.
    pub async fn handle(&self, request: Request<Body>) -> Response<Body> {
        match self.invoke(request).await {
            Ok(response) => response,
            Err(error) => {
                warn!(%error, "unhandled error escaped the contract");
                error.into_response()
            }
        }
    }

    fn compile(mut self) -> Self {
        let root = self.root.clone();
        let renderer = self.renderer.clone();

        let mut routers: Vec<(FilterChain, ContractRouter)> = self
            .routes
            .iter()
            .map(|route| {
                let renderer = renderer.clone();
                let chain = FilterChain::from(identify(route, &root))
                    .then(self.pre_security_filter.clone())
                    .then(self.security.filter())
                    .then(route.meta().security_filter())
                    .then(self.post_security_filter.clone())
                    .then(catch_lens_failure(move |failure| renderer.bad_request(failure)))
                    .then(pre_flight_extraction_filter(
                        route.meta(),
                        &self.pre_flight_extraction,
                    ));
                (chain, route.to_router(&root))
            })
            .collect();

        let description = self.description_route();
        let description_chain = FilterChain::from(identify(&description, &root))
            .then(self.pre_security_filter.clone())
            .then(self.post_security_filter.clone());
        routers.push((description_chain, description.to_router(&root)));

        let not_found_renderer = renderer.clone();
        let not_found = self
            .pre_security_filter
            .clone()
            .then(self.security.filter())
            .then(self.post_security_filter.clone())
            .apply(HttpHandler::new(move |_| {
                let response = not_found_renderer.not_found();
                async move { Ok(response) }
            }));

        self.compiled = Arc::new(Compiled {
            root: SegmentPrefixMatcher::new(root),
            routers,
            not_found,
        });
        self
    }

    /// `GET` route rendering the description of every route in the contract.
    fn description_route(&self) -> ContractRoute {
        let spec = RouteSpec::new(&self.description_path)
            .with_meta(RouteMeta::new().summary("Contract description").operation_id("description"));

        let mut described = self.routes.clone();
        if self.include_description_route {
            described.push(spec.clone().bind_handler(Method::GET, HttpHandler::status(StatusCode::OK)));
        }
        let described: Arc<[ContractRoute]> = described.into();
        let renderer = self.renderer.clone();
        let security = self.security.clone();
        let root = self.root.clone();

        spec.bind(Method::GET, move |_| {
            let renderer = renderer.clone();
            let security = security.clone();
            let root = root.clone();
            let described = described.clone();
            HttpHandler::new(move |_| {
                let response = renderer.description(&root, security.as_ref(), &described);
                async move { Ok(response) }
            })
        })
    }
}

/// Tag the request and response with the route template and record the
/// outcome.
fn identify(route: &ContractRoute, root: &PathSegments) -> Filter {
    let template = RouteTemplate(route.describe_for(root));
    Filter::around(move |mut request, next| {
        let template = template.clone();
        async move {
            request.extensions_mut().insert(template.clone());
            let method = request.method().clone();
            let result = next.call(request).await;
            let status = match &result {
                Ok(response) => response.status(),
                Err(error) => error.status(),
            };
            metrics::record_request(template.as_str(), &method, status);
            result.map(|mut response| {
                response.extensions_mut().insert(template);
                response
            })
        }
    })
}

impl Router for ContractRoutingHandler {
    fn match_request(&self, request: &Request<Body>) -> Option<HttpHandler> {
        if !self.compiled.root.matches(request) {
            return None;
        }
        self.compiled
            .routers
            .iter()
            .find_map(|(chain, router)| router.match_request(request).map(|h| chain.apply(h)))
    }
}

impl RoutingHttpHandler for ContractRoutingHandler {
    /// Prepend to the pre-security filters, so `filter` runs first.
    fn with_filter(&self, filter: Filter) -> Self {
        Self {
            pre_security_filter: FilterChain::from(filter).then(self.pre_security_filter.clone()),
            ..self.clone()
        }
        .compile()
    }

    /// Mount under `base_path`, in front of the current root.
    fn with_base_path(&self, base_path: &str) -> Self {
        Self {
            root: PathSegments::new(base_path).join(&self.root),
            ..self.clone()
        }
        .compile()
    }
}

impl tower::Service<Request<Body>> for ContractRoutingHandler {
    type Response = Response<Body>;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(request).await) })
    }
}

impl fmt::Display for ContractRoutingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "contract at {}", self.root)?;
        for route in &self.routes {
            write!(f, "\n  {}: {}", route.method(), route.describe_for(&self.root))?;
        }
        Ok(())
    }
}

impl fmt::Debug for ContractRoutingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContractRoutingHandler")
            .field("root", &self.root)
            .field("description_path", &self.description_path)
            .field("security", &self.security.name())
            .field("pre_flight_extraction", &self.pre_flight_extraction)
            .field("routes", &self.routes)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::response;
    use crate::lens::{Path, Query};

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn contract() -> ContractRoutingHandler {
        let id = Path::int().of("id");
        ContractRoutingHandler::new()
            .with_route(
                RouteSpec::new("/items")
                    .path(id.clone())
                    .bind(Method::GET, move |parts| {
                        let id = parts.get(&id).unwrap_or_default();
                        HttpHandler::new(move |_| async move {
                            Ok(response::text(StatusCode::OK, id.to_string()))
                        })
                    }),
            )
            .with_route(
                RouteSpec::new("/search")
                    .with_meta(RouteMeta::new().param(Query::string().required("q")))
                    .bind_handler(Method::GET, HttpHandler::status(StatusCode::OK)),
            )
    }

    #[tokio::test]
    async fn test_dispatches_and_tags_template() {
        let response = contract().handle(get("/items/5")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.extensions().get::<RouteTemplate>().unwrap().as_str(),
            "/items/{id}"
        );
        assert_eq!(response::body_text(response.into_body(), 64).await.unwrap(), "5");
    }

    #[tokio::test]
    async fn test_missing_param_is_bad_request() {
        let response = contract().handle(get("/search")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unmatched_under_root_is_not_found() {
        let contract = contract().with_base_path("/v1");
        assert!(contract.match_request(&get("/items/5")).is_none());
        assert_eq!(contract.handle(get("/v1/nothing")).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(contract.handle(get("/v1/items/5")).await.status(), StatusCode::OK);
    }

    #[test]
    fn test_builders_leave_receiver_untouched() {
        let base = contract();
        let mounted = base.with_base_path("/v1");
        assert_eq!(base.root(), &PathSegments::root());
        assert_eq!(mounted.root(), &PathSegments::new("/v1"));
        assert!(base.match_request(&get("/items/1")).is_some());
        assert!(mounted.match_request(&get("/items/1")).is_none());
    }
}
