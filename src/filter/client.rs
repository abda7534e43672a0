//! Filters for the calling side of an HTTP exchange.

use axum::http::{Response, StatusCode};
use axum::body::Body;
use tracing::warn;

use super::upstream::UpstreamRequestFailed;
use super::Filter;
use crate::http::{response, HandlerError};

/// Upper bound on how much of a rejected body is kept as the failure message.
/// Longer bodies are truncated to this many bytes.
pub const MAX_FAILURE_BODY: usize = 64 * 1024;

/// Fail with [`UpstreamRequestFailed`] unless the response is 2xx.
pub fn handle_upstream_request_failed() -> Filter {
    handle_upstream_request_failed_with(|response| response.status().is_success())
}

/// Fail with [`UpstreamRequestFailed`] unless `acceptable` holds for the
/// response. The failure keeps the original status and body text.
pub fn handle_upstream_request_failed_with<F>(acceptable: F) -> Filter
where
    F: Fn(&Response<Body>) -> bool + Send + Sync + 'static,
{
    let acceptable = std::sync::Arc::new(acceptable);
    Filter::around(move |request, next| {
        let acceptable = acceptable.clone();
        async move {
            let upstream = next.call(request).await?;
            if acceptable(&upstream) {
                return Ok(upstream);
            }
            let status: StatusCode = upstream.status();
            let message =
                match response::body_text_truncated(upstream.into_body(), MAX_FAILURE_BODY).await {
                    Ok((text, false)) => text,
                    Ok((text, true)) => {
                        warn!(status = %status, limit = MAX_FAILURE_BODY, "upstream body truncated");
                        text
                    }
                    Err(error) => {
                        warn!(status = %status, %error, "upstream body unreadable");
                        format!("upstream body unreadable: {error}")
                    }
                };
            warn!(status = %status, "upstream response not acceptable");
            Err(HandlerError::Upstream(UpstreamRequestFailed::new(status, message)))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpHandler;
    use axum::http::Request;

    fn upstream(status: StatusCode) -> HttpHandler {
        HttpHandler::new(move |_| async move {
            Ok(response::text(status, status.as_u16().to_string()))
        })
    }

    #[tokio::test]
    async fn test_passes_successful_responses() {
        let handler = handle_upstream_request_failed().apply(upstream(StatusCode::OK));
        let response = handler.call(Request::new(Body::empty())).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_fails_when_predicate_rejects() {
        let handler = handle_upstream_request_failed_with(|_| false)
            .apply(upstream(StatusCode::NOT_FOUND));
        let err = handler.call(Request::new(Body::empty())).await.unwrap_err();
        match err {
            HandlerError::Upstream(failure) => {
                assert_eq!(failure.status(), StatusCode::NOT_FOUND);
                assert_eq!(failure.message(), "404");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
