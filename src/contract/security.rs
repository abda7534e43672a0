//! Security collaborators.
//!
//! A [`Security`] is an opaque filter plus a name for descriptions. The
//! contract applies the global one to every route and the not-found
//! fallback; routes may add their own on top.

use std::sync::Arc;

use axum::http::StatusCode;
use tracing::warn;

use crate::filter::Filter;
use crate::http::response;
use crate::lens::RequestLens;
use crate::routing::matcher::is_pre_flight;

pub trait Security: Send + Sync {
    fn filter(&self) -> Filter;

    /// Scheme name, as shown in contract descriptions.
    fn name(&self) -> &str;
}

/// Lets every request through.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSecurity;

impl Security for NoSecurity {
    fn filter(&self) -> Filter {
        Filter::no_op()
    }

    fn name(&self) -> &str {
        "none"
    }
}

/// Checks an API key read through a query or header lens. Missing, malformed
/// and rejected keys all answer `401 Unauthorized`.
pub struct ApiKeySecurity<T> {
    param: RequestLens<T>,
    accept: Arc<dyn Fn(&T) -> bool + Send + Sync>,
    authorize_pre_flight: bool,
}

impl<T: Send + Sync + 'static> ApiKeySecurity<T> {
    pub fn new<F>(param: RequestLens<T>, accept: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            param,
            accept: Arc::new(accept),
            authorize_pre_flight: true,
        }
    }

    /// Let pre-flight probes through without a key.
    pub fn skip_pre_flight(mut self) -> Self {
        self.authorize_pre_flight = false;
        self
    }
}

impl<T: Send + Sync + 'static> Security for ApiKeySecurity<T> {
    fn filter(&self) -> Filter {
        let param = self.param.clone();
        let accept = self.accept.clone();
        let authorize_pre_flight = self.authorize_pre_flight;
        Filter::around(move |request, next| {
            let param = param.clone();
            let accept = accept.clone();
            async move {
                if !authorize_pre_flight && is_pre_flight(&request) {
                    return next.call(request).await;
                }
                match param.extract(&request) {
                    Ok(key) if accept(&key) => next.call(request).await,
                    Ok(_) => {
                        warn!(param = %param.meta(), "rejected request: invalid API key");
                        Ok(response::empty(StatusCode::UNAUTHORIZED))
                    }
                    Err(failure) => {
                        warn!(reason = %failure, "rejected request: missing API key");
                        Ok(response::empty(StatusCode::UNAUTHORIZED))
                    }
                }
            }
        })
    }

    fn name(&self) -> &str {
        "api_key"
    }
}
