//! Query and header lenses.
//!
//! # Responsibilities
//! - Locate a raw value in the request (query string, header map)
//! - Parse it into a typed value, or report Missing / Invalid
//! - Expose an erased [`Validate`] view for pre-flight checks
//!
//! # Design Decisions
//! - Query strings are decoded with `application/x-www-form-urlencoded` rules
//! - First occurrence wins for repeated query keys
//! - Header values that are not visible ASCII count as invalid

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderMap, Request, Uri};

use super::failure::{Failure, LensFailure};
use super::meta::{LensId, Location, Meta, ParamType};
use super::path::{parse_bool, Parse};

/// Raw lookup result: absent, present-but-unreadable, or present.
enum Raw {
    Absent,
    Unreadable,
    Present(String),
}

fn raw_value(location: Location, name: &str, uri: &Uri, headers: &HeaderMap) -> Raw {
    match location {
        Location::Query => uri
            .query()
            .and_then(|query| {
                url::form_urlencoded::parse(query.as_bytes())
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| Raw::Present(value.into_owned()))
            })
            .unwrap_or(Raw::Absent),
        Location::Header => match headers.get(name) {
            None => Raw::Absent,
            Some(value) => value
                .to_str()
                .map(|v| Raw::Present(v.to_string()))
                .unwrap_or(Raw::Unreadable),
        },
        // Path values are bound by the route, never looked up on the request.
        Location::Path => Raw::Absent,
    }
}

/// Untyped recipe for a query or header lens.
pub struct ParamLensSpec<T> {
    location: Location,
    param_type: ParamType,
    parse: Parse<T>,
}

impl<T: Send + Sync + 'static> ParamLensSpec<T> {
    pub fn new<F>(location: Location, param_type: ParamType, parse: F) -> Self
    where
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            location,
            param_type,
            parse: Arc::new(parse),
        }
    }

    /// Post-process parsed values. Returning `None` marks the value invalid.
    pub fn map<U, F>(self, f: F) -> ParamLensSpec<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let parse = self.parse;
        ParamLensSpec {
            location: self.location,
            param_type: self.param_type,
            parse: Arc::new(move |raw| parse(raw).and_then(&f)),
        }
    }

    /// Lens failing with `Missing` when the parameter is absent.
    pub fn required(&self, name: impl Into<String>) -> RequestLens<T> {
        let meta = Meta::new(name, self.location, true, self.param_type);
        let parse = self.parse.clone();
        let failed = meta.clone();
        RequestLens::from_raw(meta, move |raw| match raw {
            Raw::Absent => Err(Failure::Missing(failed.clone())),
            Raw::Unreadable => Err(Failure::Invalid(failed.clone())),
            Raw::Present(value) => parse(&value).ok_or_else(|| Failure::Invalid(failed.clone())),
        })
    }

    /// Lens yielding `None` when absent, still failing on unparseable values.
    pub fn optional(&self, name: impl Into<String>) -> RequestLens<Option<T>> {
        let meta = Meta::new(name, self.location, false, self.param_type);
        let parse = self.parse.clone();
        let failed = meta.clone();
        RequestLens::from_raw(meta, move |raw| match raw {
            Raw::Absent => Ok(None),
            Raw::Unreadable => Err(Failure::Invalid(failed.clone())),
            Raw::Present(value) => parse(&value)
                .map(Some)
                .ok_or_else(|| Failure::Invalid(failed.clone())),
        })
    }

    /// Lens yielding `default` when absent.
    pub fn defaulted(&self, name: impl Into<String>, default: T) -> RequestLens<T>
    where
        T: Clone,
    {
        let optional = self.optional(name);
        let mut meta = optional.meta.clone();
        meta.required = false;
        RequestLens {
            id: LensId::next(),
            meta,
            get: Arc::new(move |source| {
                (optional.get)(source).map(|value| value.unwrap_or_else(|| default.clone()))
            }),
        }
    }
}

macro_rules! param_entry_point {
    ($(#[$doc:meta])* $name:ident, $location:expr) => {
        $(#[$doc])*
        pub struct $name;

        impl $name {
            pub fn string() -> ParamLensSpec<String> {
                ParamLensSpec::new($location, ParamType::String, |raw| Some(raw.to_string()))
            }

            pub fn int() -> ParamLensSpec<i64> {
                Self::of(ParamType::Integer)
            }

            pub fn number() -> ParamLensSpec<f64> {
                Self::of(ParamType::Number)
            }

            pub fn boolean() -> ParamLensSpec<bool> {
                ParamLensSpec::new($location, ParamType::Boolean, parse_bool)
            }

            pub fn of<T>(param_type: ParamType) -> ParamLensSpec<T>
            where
                T: FromStr + Send + Sync + 'static,
            {
                ParamLensSpec::new($location, param_type, |raw| raw.parse().ok())
            }

            pub fn enumerated(values: &[&str]) -> ParamLensSpec<String> {
                let allowed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                ParamLensSpec::new($location, ParamType::Enum, move |raw| {
                    allowed.iter().find(|v| v.as_str() == raw).cloned()
                })
            }
        }
    };
}

param_entry_point!(
    /// Entry point for query-string lenses.
    Query,
    Location::Query
);
param_entry_point!(
    /// Entry point for header lenses. Names are matched case-insensitively.
    Header,
    Location::Header
);

type Getter<T> = Arc<dyn Fn(&RawSource<'_>) -> Result<T, LensFailure> + Send + Sync>;

/// Borrowed view of the parts of a request a lens can read.
struct RawSource<'a> {
    uri: &'a Uri,
    headers: &'a HeaderMap,
}

impl<'a> RawSource<'a> {
    fn of<B>(request: &'a Request<B>) -> Self {
        Self {
            uri: request.uri(),
            headers: request.headers(),
        }
    }

    fn lookup(&self, location: Location, name: &str) -> Raw {
        raw_value(location, name, self.uri, self.headers)
    }
}

/// Typed extractor bound to a query parameter or header.
pub struct RequestLens<T> {
    id: LensId,
    meta: Meta,
    get: Getter<T>,
}

impl<T> Clone for RequestLens<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            meta: self.meta.clone(),
            get: self.get.clone(),
        }
    }
}

impl<T> fmt::Debug for RequestLens<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLens")
            .field("id", &self.id)
            .field("meta", &self.meta)
            .finish()
    }
}

impl<T: Send + Sync + 'static> RequestLens<T> {
    fn from_raw<F>(meta: Meta, f: F) -> Self
    where
        F: Fn(Raw) -> Result<T, Failure> + Send + Sync + 'static,
    {
        let location = meta.location;
        let name = meta.name.clone();
        Self {
            id: LensId::next(),
            meta,
            get: Arc::new(move |source| {
                f(source.lookup(location, &name)).map_err(LensFailure::single)
            }),
        }
    }

    pub fn id(&self) -> LensId {
        self.id
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.meta.description = Some(description.into());
        self
    }

    pub fn extract<B>(&self, request: &Request<B>) -> Result<T, LensFailure> {
        (self.get)(&RawSource::of(request)).map_err(|failure| failure.with_target(request))
    }
}

/// Erased, checkable view of a request lens, used for pre-flight validation.
pub trait Validate: Send + Sync {
    fn meta(&self) -> &Meta;

    /// Every failure this parameter has on `request`; empty when valid.
    fn validate(&self, request: &Request<Body>) -> Vec<Failure>;
}

impl<T: Send + Sync + 'static> Validate for RequestLens<T> {
    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn validate(&self, request: &Request<Body>) -> Vec<Failure> {
        match self.extract(request) {
            Ok(_) => Vec::new(),
            Err(failure) => failure.into_failures(),
        }
    }
}

/// Run every check and collect all failures. Never stops at the first one.
pub fn validate_all(request: &Request<Body>, checks: &[Arc<dyn Validate>]) -> Vec<Failure> {
    checks
        .iter()
        .flat_map(|check| check.validate(request))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[test]
    fn test_required_query() {
        let limit = Query::int().required("limit");
        assert_eq!(limit.extract(&request("/items?limit=10")).unwrap(), 10);

        let missing = limit.extract(&request("/items")).unwrap_err();
        assert_eq!(missing.failures(), &[Failure::Missing(limit.meta().clone())]);
        assert_eq!(missing.target().unwrap().uri, "/items");

        let invalid = limit.extract(&request("/items?limit=ten")).unwrap_err();
        assert_eq!(invalid.to_string(), "query 'limit' must be integer");
    }

    #[test]
    fn test_query_is_form_decoded() {
        let q = Query::string().required("q");
        assert_eq!(q.extract(&request("/search?q=hello+world%21")).unwrap(), "hello world!");
        assert_eq!(q.extract(&request("/search?q=a&q=b")).unwrap(), "a");
    }

    #[test]
    fn test_optional_and_defaulted() {
        let offset = Query::int().optional("offset");
        assert_eq!(offset.extract(&request("/items")).unwrap(), None);
        assert_eq!(offset.extract(&request("/items?offset=5")).unwrap(), Some(5));
        assert!(offset.extract(&request("/items?offset=x")).is_err());

        let page = Query::int().defaulted("page", 1);
        assert_eq!(page.extract(&request("/items")).unwrap(), 1);
        assert_eq!(page.extract(&request("/items?page=3")).unwrap(), 3);
        assert!(!page.meta().required);
    }

    #[test]
    fn test_header_lens() {
        let trace = Header::boolean().required("X-Trace");
        let req = Request::get("/")
            .header("x-trace", "true")
            .body(Body::empty())
            .unwrap();
        assert!(trace.extract(&req).unwrap());
        assert_eq!(
            trace.extract(&request("/")).unwrap_err().to_string(),
            "header 'X-Trace' is required"
        );
    }

    #[test]
    fn test_validate_all_collects_everything() {
        let checks: Vec<Arc<dyn Validate>> = vec![
            Arc::new(Query::string().required("a")),
            Arc::new(Query::int().required("b")),
            Arc::new(Query::int().optional("c")),
        ];
        let failures = validate_all(&request("/?b=nope"), &checks);
        let messages: Vec<String> = failures.iter().map(ToString::to_string).collect();
        assert_eq!(
            messages,
            vec!["query 'a' is required", "query 'b' must be integer"]
        );
    }
}
