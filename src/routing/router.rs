//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Define the `Router` contract: request in, handler or no-match out
//! - Aggregate routers, first match wins
//! - Produce a not-found response when nothing matches
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Declaration order is evaluation order
//! - Explicit no-match (`None`) rather than a silent default

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tracing::trace;

use crate::filter::{Filter, FilterChain};
use crate::http::{HandlerResult, HttpHandler};

/// Maps a request to a handler, or reports no match.
pub trait Router: Send + Sync {
    fn match_request(&self, request: &Request<Body>) -> Option<HttpHandler>;
}

/// A router that can be re-mounted and wrapped. Both operations return a new
/// value and leave `self` untouched.
pub trait RoutingHttpHandler: Router + Sized {
    /// Wrap every matched handler in `filter`, outside any existing filters.
    fn with_filter(&self, filter: Filter) -> Self;

    /// Mount under an additional path prefix.
    fn with_base_path(&self, base_path: &str) -> Self;
}

/// Ordered group of routers tried in declaration order.
#[derive(Clone, Default)]
pub struct Routes {
    routers: Vec<Arc<dyn Router>>,
    filters: FilterChain,
}

impl Routes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a router. Earlier routers take precedence.
    pub fn route(mut self, router: impl Router + 'static) -> Self {
        self.routers.push(Arc::new(router));
        self
    }

    /// Wrap every matched handler in `filter`, outside existing filters.
    pub fn with_filter(&self, filter: Filter) -> Self {
        Self {
            routers: self.routers.clone(),
            filters: FilterChain::from(filter).then(self.filters.clone()),
        }
    }

    /// Dispatch, answering 404 when no router matches.
    pub async fn handle(&self, request: Request<Body>) -> HandlerResult {
        let handler = self
            .match_request(&request)
            .unwrap_or_else(|| HttpHandler::status(StatusCode::NOT_FOUND));
        handler.call(request).await
    }
}

impl Router for Routes {
    fn match_request(&self, request: &Request<Body>) -> Option<HttpHandler> {
        let matched = self
            .routers
            .iter()
            .find_map(|router| router.match_request(request));
        if matched.is_none() {
            trace!(path = %request.uri().path(), "no router matched");
        }
        matched.map(|handler| self.filters.apply(handler))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    struct Fixed {
        path: &'static str,
        status: StatusCode,
    }

    impl Router for Fixed {
        fn match_request(&self, request: &Request<Body>) -> Option<HttpHandler> {
            (request.uri().path() == self.path).then(|| HttpHandler::status(self.status))
        }
    }

    fn get(path: &str) -> Request<Body> {
        Request::get(path).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_first_match_wins() {
        let routes = Routes::new()
            .route(Fixed { path: "/a", status: StatusCode::OK })
            .route(Fixed { path: "/a", status: StatusCode::ACCEPTED })
            .route(Fixed { path: "/b", status: StatusCode::CREATED });

        assert_eq!(routes.handle(get("/a")).await.unwrap().status(), StatusCode::OK);
        assert_eq!(routes.handle(get("/b")).await.unwrap().status(), StatusCode::CREATED);
        assert_eq!(routes.handle(get("/c")).await.unwrap().status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_filters_wrap_matched_handlers_only() {
        let tag = Filter::around(|request, next| async move {
            let mut response = next.call(request).await?;
            response
                .headers_mut()
                .insert("x-tagged", HeaderValue::from_static("yes"));
            Ok(response)
        });
        let routes = Routes::new()
            .route(Fixed { path: "/a", status: StatusCode::OK })
            .with_filter(tag);

        let matched = routes.handle(get("/a")).await.unwrap();
        assert_eq!(matched.headers()["x-tagged"], "yes");

        let unmatched = routes.handle(get("/z")).await.unwrap();
        assert!(unmatched.headers().get("x-tagged").is_none());
    }
}
