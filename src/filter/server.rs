//! Filters for the serving side of an HTTP exchange.
//!
//! # Design Decisions
//! - Lens failures become client errors through a caller-supplied renderer
//! - Upstream failures become 504 (timeouts), 404 (not found, original body
//!   kept) or 503 (everything else, message kept)
//! - Errors a filter does not own pass through untouched

use axum::body::Body;
use axum::http::{Response, StatusCode};
use std::sync::Arc;
use tracing::{debug, warn};

use super::upstream::{UpstreamFailureKind, UpstreamRequestFailed};
use super::Filter;
use crate::http::{response, HandlerError};
use crate::lens::LensFailure;

/// Turn [`HandlerError::Lens`] into the response produced by `render`.
pub fn catch_lens_failure<F>(render: F) -> Filter
where
    F: Fn(&LensFailure) -> Response<Body> + Send + Sync + 'static,
{
    let render = Arc::new(render);
    Filter::around(move |request, next| {
        let render = render.clone();
        async move {
            match next.call(request).await {
                Err(HandlerError::Lens(failure)) => {
                    debug!(failures = %failure, "lens failure caught");
                    Ok(render(&failure))
                }
                other => other,
            }
        }
    })
}

/// Turn [`HandlerError::Upstream`] into a standardised server response.
pub fn handle_upstream_request_failed() -> Filter {
    Filter::around(|request, next| async move {
        match next.call(request).await {
            Err(HandlerError::Upstream(failure)) => Ok(upstream_failure_response(&failure)),
            other => other,
        }
    })
}

fn upstream_failure_response(failure: &UpstreamRequestFailed) -> Response<Body> {
    let status = match failure.kind() {
        UpstreamFailureKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        UpstreamFailureKind::NotFound => StatusCode::NOT_FOUND,
        UpstreamFailureKind::ClientError | UpstreamFailureKind::ServerError => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };
    warn!(
        upstream_status = %failure.status(),
        kind = %failure.kind(),
        status = %status,
        "upstream request failed"
    );
    response::text(status, failure.message())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpHandler;
    use crate::lens::Query;
    use axum::http::Request;

    #[tokio::test]
    async fn test_catch_lens_failure_renders_response() {
        let limit = Query::int().required("limit");
        let handler = catch_lens_failure(|failure| {
            response::text(StatusCode::BAD_REQUEST, failure.to_string())
        })
        .apply(HttpHandler::new(move |request| {
            let limit = limit.clone();
            async move {
                limit.extract(&request)?;
                Ok(response::empty(StatusCode::OK))
            }
        }));

        let response = handler
            .call(Request::get("/?limit=x").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response::body_text(response.into_body(), usize::MAX)
                .await
                .unwrap(),
            "query 'limit' must be integer"
        );
    }

    #[tokio::test]
    async fn test_other_errors_pass_through() {
        let handler = handle_upstream_request_failed().apply(HttpHandler::new(|_| async {
            Err(HandlerError::Internal("boom".into()))
        }));
        let err = handler.call(Request::new(Body::empty())).await.unwrap_err();
        assert!(matches!(err, HandlerError::Internal(_)));
    }
}
