//! Pre-flight extraction: validate declared parameters before a handler runs.
//!
//! # Design Decisions
//! - Every declared check runs; failures are collected, never short-circuited
//! - Pre-flight probes (`OPTIONS`) skip validation
//! - A route-level policy overrides the contract default

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use super::meta::RouteMeta;
use super::route::RouteTemplate;
use crate::config::schema::PreFlightMode;
use crate::filter::Filter;
use crate::lens::{validate_all, LensFailure, Validate};
use crate::observability::metrics;
use crate::routing::matcher::is_pre_flight;

type SelectChecks = dyn Fn(&RouteMeta) -> Vec<Arc<dyn Validate>> + Send + Sync;

/// Which declared parameters are validated before the handler runs.
#[derive(Clone, Default)]
pub enum PreFlightExtraction {
    /// Every declared non-body parameter.
    #[default]
    All,
    /// Nothing; handlers extract (and fail) lazily.
    None,
    /// A caller-chosen subset.
    Custom(Arc<SelectChecks>),
}

impl PreFlightExtraction {
    pub fn custom<F>(select: F) -> Self
    where
        F: Fn(&RouteMeta) -> Vec<Arc<dyn Validate>> + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(select))
    }

    /// The checks to run for a route described by `meta`.
    pub fn checks(&self, meta: &RouteMeta) -> Vec<Arc<dyn Validate>> {
        match self {
            PreFlightExtraction::All => meta.request_params().to_vec(),
            PreFlightExtraction::None => Vec::new(),
            PreFlightExtraction::Custom(select) => select(meta),
        }
    }
}

impl fmt::Debug for PreFlightExtraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PreFlightExtraction::All => "All",
            PreFlightExtraction::None => "None",
            PreFlightExtraction::Custom(_) => "Custom",
        })
    }
}

impl From<PreFlightMode> for PreFlightExtraction {
    fn from(mode: PreFlightMode) -> Self {
        match mode {
            PreFlightMode::All => PreFlightExtraction::All,
            PreFlightMode::None => PreFlightExtraction::None,
        }
    }
}

/// Filter failing with a [`LensFailure`] listing every failing check.
pub(crate) fn pre_flight_extraction_filter(
    meta: &RouteMeta,
    default: &PreFlightExtraction,
) -> Filter {
    let policy = meta.pre_flight_override().unwrap_or(default);
    let checks: Arc<[Arc<dyn Validate>]> = policy.checks(meta).into();
    if checks.is_empty() {
        return Filter::no_op();
    }
    Filter::around(move |request, next| {
        let checks = checks.clone();
        async move {
            if is_pre_flight(&request) {
                return next.call(request).await;
            }
            let failures = validate_all(&request, &checks);
            if failures.is_empty() {
                return next.call(request).await;
            }
            let route = request
                .extensions()
                .get::<RouteTemplate>()
                .map(|t| t.as_str().to_string())
                .unwrap_or_default();
            debug!(route = %route, count = failures.len(), "pre-flight extraction failed");
            metrics::record_lens_failure(&route, failures.len());
            Err(LensFailure::new(failures).with_target(&request).into())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HandlerError, HttpHandler};
    use crate::lens::Query;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};

    fn meta() -> RouteMeta {
        RouteMeta::new()
            .param(Query::int().required("limit"))
            .param(Query::string().required("q"))
    }

    async fn run(policy: &PreFlightExtraction, request: Request<Body>) -> Result<StatusCode, HandlerError> {
        pre_flight_extraction_filter(&meta(), policy)
            .apply(HttpHandler::status(StatusCode::OK))
            .call(request)
            .await
            .map(|r| r.status())
    }

    #[tokio::test]
    async fn test_all_reports_every_failure() {
        let request = Request::get("/?limit=x").body(Body::empty()).unwrap();
        match run(&PreFlightExtraction::All, request).await {
            Err(HandlerError::Lens(failure)) => {
                assert_eq!(failure.failures().len(), 2);
                assert_eq!(
                    failure.to_string(),
                    "query 'limit' must be integer, query 'q' is required"
                );
            }
            other => panic!("expected lens failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_none_and_custom_policies() {
        let request = || Request::get("/?limit=x").body(Body::empty()).unwrap();
        assert_eq!(run(&PreFlightExtraction::None, request()).await.unwrap(), StatusCode::OK);

        let only_q = PreFlightExtraction::custom(|meta| {
            meta.request_params()
                .iter()
                .filter(|p| p.meta().name == "q")
                .cloned()
                .collect()
        });
        let err = run(&only_q, request()).await.unwrap_err();
        assert_eq!(err.to_string(), "query 'q' is required");
    }

    #[tokio::test]
    async fn test_pre_flight_probe_skips_validation() {
        let probe = Request::builder()
            .method(Method::OPTIONS)
            .uri("/")
            .body(Body::empty())
            .unwrap();
        assert_eq!(run(&PreFlightExtraction::All, probe).await.unwrap(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_route_override_wins() {
        let meta = meta().pre_flight_extraction(PreFlightExtraction::None);
        let response = pre_flight_extraction_filter(&meta, &PreFlightExtraction::All)
            .apply(HttpHandler::status(StatusCode::OK))
            .call(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
