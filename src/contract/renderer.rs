//! Response rendering for contract-level outcomes.
//!
//! # Responsibilities
//! - Not-found responses for paths under the contract root
//! - Bad-request responses listing every failed parameter
//! - The contract description served on the description route

use axum::body::Body;
use axum::http::{Response, StatusCode};
use serde_json::{json, Value};

use super::route::ContractRoute;
use super::security::Security;
use crate::http::response;
use crate::lens::{Failure, LensFailure, Meta};
use crate::routing::PathSegments;

pub trait ContractRenderer: Send + Sync {
    fn not_found(&self) -> Response<Body>;

    fn bad_request(&self, failure: &LensFailure) -> Response<Body>;

    fn description(
        &self,
        root: &PathSegments,
        security: &dyn Security,
        routes: &[ContractRoute],
    ) -> Response<Body>;
}

/// Plain-text renderer: empty 404, one failure per line on 400, and a
/// line-per-route description.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRenderer;

impl ContractRenderer for NoRenderer {
    fn not_found(&self) -> Response<Body> {
        response::empty(StatusCode::NOT_FOUND)
    }

    fn bad_request(&self, failure: &LensFailure) -> Response<Body> {
        let lines = failure
            .failures()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n");
        response::text(StatusCode::BAD_REQUEST, lines)
    }

    fn description(
        &self,
        root: &PathSegments,
        _security: &dyn Security,
        routes: &[ContractRoute],
    ) -> Response<Body> {
        let listing = routes
            .iter()
            .map(|route| format!("{}: {}", route.method(), route.describe_for(root)))
            .collect::<Vec<_>>()
            .join("\n");
        response::text(StatusCode::OK, listing)
    }
}

/// JSON renderer for error bodies and a JSON route listing.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonErrorRenderer;

impl JsonErrorRenderer {
    fn param(meta: &Meta) -> Value {
        json!({
            "name": meta.name,
            "in": meta.location.to_string(),
            "type": meta.param_type.to_string(),
            "required": meta.required,
        })
    }

    fn failure(failure: &Failure) -> Value {
        let meta = failure.meta();
        json!({
            "name": meta.name,
            "type": meta.location.to_string(),
            "required": meta.required,
            "reason": failure.reason(),
        })
    }
}

impl ContractRenderer for JsonErrorRenderer {
    fn not_found(&self) -> Response<Body> {
        response::json(
            StatusCode::NOT_FOUND,
            &json!({ "message": "No route found on this path. Have you used the correct HTTP verb?" }),
        )
    }

    fn bad_request(&self, failure: &LensFailure) -> Response<Body> {
        let params: Vec<Value> = failure.failures().iter().map(Self::failure).collect();
        response::json(
            StatusCode::BAD_REQUEST,
            &json!({ "message": "Missing/invalid parameters", "params": params }),
        )
    }

    fn description(
        &self,
        root: &PathSegments,
        security: &dyn Security,
        routes: &[ContractRoute],
    ) -> Response<Body> {
        let routes: Vec<Value> = routes
            .iter()
            .map(|route| {
                let meta = route.meta();
                json!({
                    "method": route.method().as_str(),
                    "path": route.describe_for(root),
                    "summary": meta.summary_text(),
                    "operationId": meta.operation_id_text(),
                    "tags": route.tags().iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
                    "params": route.non_body_params().iter().map(Self::param).collect::<Vec<_>>(),
                })
            })
            .collect();
        response::json(
            StatusCode::OK,
            &json!({ "security": security.name(), "routes": routes }),
        )
    }
}
