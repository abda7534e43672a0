//! Filters: composable handler-to-handler transforms.
//!
//! # Data Flow
//! ```text
//! FilterChain [A, B, C].apply(h)  ==  A(B(C(h)))
//!
//! Request  ──► A before ──► B before ──► C before ──► h
//! Response ◄── A after  ◄── B after  ◄── C after  ◄──┘
//! ```
//!
//! # Design Decisions
//! - A chain is an explicit ordered list; `apply` folds right-to-left so the
//!   first-declared filter is the outermost
//! - Composition is associative: `(A.then(B)).then(C) == A.then(B.then(C))`
//! - Filters are immutable and shared; applying one never mutates it

pub mod client;
pub mod server;
pub mod upstream;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::http::Request;

use crate::http::{HandlerResult, HttpHandler};

type FilterFn = dyn Fn(HttpHandler) -> HttpHandler + Send + Sync;

/// A single transform stage wrapping a handler.
#[derive(Clone)]
pub struct Filter(Arc<FilterFn>);

impl Filter {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(HttpHandler) -> HttpHandler + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Build a filter from an async `(request, next)` function, in the style
    /// of `axum::middleware::from_fn`.
    pub fn around<F, Fut>(f: F) -> Self
    where
        F: Fn(Request<Body>, HttpHandler) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let f = Arc::new(f);
        Self::new(move |next| {
            let f = f.clone();
            HttpHandler::new(move |request| (*f)(request, next.clone()))
        })
    }

    /// The identity transform.
    pub fn no_op() -> Self {
        Self::new(|next| next)
    }

    pub fn apply(&self, next: HttpHandler) -> HttpHandler {
        (self.0)(next)
    }

    /// `self` outside, `next` inside.
    pub fn then(self, next: impl Into<FilterChain>) -> FilterChain {
        FilterChain::from(self).then(next)
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Filter")
    }
}

/// Ordered list of filters, outermost first.
#[derive(Clone, Default, Debug)]
pub struct FilterChain {
    stages: Vec<Filter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `next` inside everything already in the chain.
    pub fn then(mut self, next: impl Into<FilterChain>) -> Self {
        self.stages.extend(next.into().stages);
        self
    }

    /// Wrap `handler` in every stage. The first stage ends up outermost.
    pub fn apply(&self, handler: HttpHandler) -> HttpHandler {
        self.stages
            .iter()
            .rev()
            .fold(handler, |next, stage| stage.apply(next))
    }

    /// Collapse the chain into a single filter.
    pub fn into_filter(self) -> Filter {
        Filter::new(move |next| self.apply(next))
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl From<Filter> for FilterChain {
    fn from(filter: Filter) -> Self {
        Self {
            stages: vec![filter],
        }
    }
}

impl FromIterator<Filter> for FilterChain {
    fn from_iter<I: IntoIterator<Item = Filter>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}
