//! Handler abstraction shared by routes, filters and contracts.
//!
//! # Design Decisions
//! - A handler is a cloneable async function from request to result
//! - Failures are explicit (`HandlerError`), converted to responses only at
//!   well-defined boundary filters or at the transport edge

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::response::IntoResponse;
use futures_util::future::BoxFuture;
use thiserror::Error;

use crate::filter::upstream::UpstreamRequestFailed;
use crate::http::response;
use crate::lens::LensFailure;

/// Outcome of invoking a handler.
pub type HandlerResult = Result<Response<Body>, HandlerError>;

/// Errors a handler can surface instead of a response.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// One or more parameters failed to extract.
    #[error(transparent)]
    Lens(#[from] LensFailure),

    /// A downstream call returned an unacceptable response.
    #[error(transparent)]
    Upstream(#[from] UpstreamRequestFailed),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    /// Status used when the error reaches the transport edge unhandled.
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Lens(_) => StatusCode::BAD_REQUEST,
            HandlerError::Upstream(_) => StatusCode::SERVICE_UNAVAILABLE,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> axum::response::Response {
        response::text(self.status(), self.to_string())
    }
}

type HandlerFn = dyn Fn(Request<Body>) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// Cloneable async request handler.
#[derive(Clone)]
pub struct HttpHandler(Arc<HandlerFn>);

impl HttpHandler {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self(Arc::new(
            move |request| -> BoxFuture<'static, HandlerResult> { Box::pin(f(request)) },
        ))
    }

    /// Handler that always answers with an empty response of `status`.
    pub fn status(status: StatusCode) -> Self {
        Self::new(move |_| async move { Ok(response::empty(status)) })
    }

    pub fn call(&self, request: Request<Body>) -> BoxFuture<'static, HandlerResult> {
        (self.0)(request)
    }
}

impl fmt::Debug for HttpHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("HttpHandler")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::Query;

    #[tokio::test]
    async fn test_status_handler() {
        let handler = HttpHandler::status(StatusCode::ACCEPTED);
        let response = handler.call(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_errors_map_to_status_at_the_edge() {
        let limit = Query::int().required("limit");
        let handler = HttpHandler::new(move |request: Request<Body>| {
            let limit = limit.clone();
            async move {
                limit.extract(&request)?;
                Ok(response::empty(StatusCode::OK))
            }
        });

        let err = handler.call(Request::new(Body::empty())).await.unwrap_err();
        assert!(matches!(err, HandlerError::Lens(_)));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

        let internal = HandlerError::Internal("boom".into()).into_response();
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
