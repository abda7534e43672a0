//! Route specifications: a path prefix plus typed path parameters.

use std::fmt;
use std::sync::Arc;

use axum::http::Method;

use super::meta::RouteMeta;
use super::route::ContractRoute;
use crate::http::HttpHandler;
use crate::lens::{ExtractedParts, PathLens, PathParam};
use crate::routing::PathSegments;

/// Path template of a route: literal prefix segments followed by an ordered
/// list of path lenses, one per remaining segment.
#[derive(Clone)]
pub struct RouteSpec {
    prefix: PathSegments,
    path_lenses: Vec<Arc<dyn PathParam>>,
    meta: RouteMeta,
}

impl RouteSpec {
    /// Spec for the literal prefix `path`, with no parameters yet.
    pub fn new(path: &str) -> Self {
        Self {
            prefix: PathSegments::new(path),
            path_lenses: Vec::new(),
            meta: RouteMeta::default(),
        }
    }

    /// Append a typed path parameter.
    pub fn path<T: Send + Sync + 'static>(mut self, lens: PathLens<T>) -> Self {
        self.path_lenses.push(Arc::new(lens));
        self
    }

    /// Append a literal segment after the parameters declared so far.
    pub fn fixed(self, segment: &str) -> Self {
        self.path(crate::lens::Path::fixed(segment))
    }

    pub fn with_meta(mut self, meta: RouteMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn prefix(&self) -> &PathSegments {
        &self.prefix
    }

    pub fn path_lenses(&self) -> &[Arc<dyn PathParam>] {
        &self.path_lenses
    }

    pub fn meta(&self) -> &RouteMeta {
        &self.meta
    }

    /// The literal prefix mounted under `root`.
    pub fn path_fn(&self, root: &PathSegments) -> PathSegments {
        root.join(&self.prefix)
    }

    /// Template string such as `/v1/items/{id}/history`.
    pub fn describe(&self, root: &PathSegments) -> String {
        let parts: Vec<String> = self
            .path_fn(root)
            .tokens()
            .iter()
            .cloned()
            .chain(self.path_lenses.iter().map(|lens| lens.describe()))
            .collect();
        if parts.is_empty() {
            return "/".to_string();
        }
        parts.iter().map(|part| format!("/{part}")).collect()
    }

    /// Bind to a method and a factory that builds the handler from the
    /// extracted path values.
    pub fn bind<F>(self, method: Method, factory: F) -> ContractRoute
    where
        F: Fn(ExtractedParts) -> HttpHandler + Send + Sync + 'static,
    {
        ContractRoute::new(method, self, Arc::new(factory))
    }

    /// Bind to a method and a handler that ignores path values.
    pub fn bind_handler(self, method: Method, handler: HttpHandler) -> ContractRoute {
        self.bind(method, move |_| handler.clone())
    }
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSpec")
            .field("template", &self.describe(&PathSegments::root()))
            .field("meta", &self.meta)
            .finish()
    }
}
