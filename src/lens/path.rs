//! Path parameter lenses.
//!
//! A [`PathLens`] turns one path segment into a typed value. Route specs keep
//! their lenses type-erased behind [`PathParam`] so a route can declare any
//! mix of parameter types; handlers get the typed value back through
//! [`ExtractedParts`](super::ExtractedParts) using the same lens instance.

use std::any::Any;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::failure::{Failure, LensFailure};
use super::meta::{LensId, Location, Meta, ParamType};

pub(crate) type Parse<T> = Arc<dyn Fn(&str) -> Option<T> + Send + Sync>;

/// Untyped recipe for a path lens: a declared type and a parser.
pub struct PathLensSpec<T> {
    param_type: ParamType,
    parse: Parse<T>,
}

impl<T: Send + Sync + 'static> PathLensSpec<T> {
    pub fn new<F>(param_type: ParamType, parse: F) -> Self
    where
        F: Fn(&str) -> Option<T> + Send + Sync + 'static,
    {
        Self {
            param_type,
            parse: Arc::new(parse),
        }
    }

    /// Post-process parsed values. Returning `None` marks the segment invalid.
    pub fn map<U, F>(self, f: F) -> PathLensSpec<U>
    where
        U: Send + Sync + 'static,
        F: Fn(T) -> Option<U> + Send + Sync + 'static,
    {
        let parse = self.parse;
        PathLensSpec {
            param_type: self.param_type,
            parse: Arc::new(move |raw| parse(raw).and_then(&f)),
        }
    }

    /// Bind the recipe to a parameter name.
    pub fn of(&self, name: impl Into<String>) -> PathLens<T> {
        PathLens {
            id: LensId::next(),
            meta: Meta::new(name, Location::Path, true, self.param_type),
            parse: self.parse.clone(),
            fixed: false,
        }
    }
}

/// Entry point for path lenses.
pub struct Path;

impl Path {
    /// Any non-empty segment.
    pub fn string() -> PathLensSpec<String> {
        PathLensSpec::new(ParamType::String, |raw| {
            (!raw.is_empty()).then(|| raw.to_string())
        })
    }

    pub fn int() -> PathLensSpec<i64> {
        Self::of(ParamType::Integer)
    }

    pub fn number() -> PathLensSpec<f64> {
        Self::of(ParamType::Number)
    }

    pub fn boolean() -> PathLensSpec<bool> {
        PathLensSpec::new(ParamType::Boolean, parse_bool)
    }

    /// Any [`FromStr`] type, e.g. a domain enum.
    pub fn of<T>(param_type: ParamType) -> PathLensSpec<T>
    where
        T: FromStr + Send + Sync + 'static,
    {
        PathLensSpec::new(param_type, |raw| raw.parse().ok())
    }

    /// One of a closed set of literal values.
    pub fn enumerated(values: &[&str]) -> PathLensSpec<String> {
        let allowed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
        PathLensSpec::new(ParamType::Enum, move |raw| {
            allowed.iter().find(|v| v.as_str() == raw).cloned()
        })
    }

    /// A literal segment. Anything else fails to bind.
    pub fn fixed(value: &str) -> PathLens<String> {
        let expected = value.trim_matches('/').to_string();
        let check = expected.clone();
        PathLens {
            id: LensId::next(),
            meta: Meta::new(expected, Location::Path, true, ParamType::String),
            parse: Arc::new(move |raw| (raw == check).then(|| raw.to_string())),
            fixed: true,
        }
    }
}

pub(crate) fn parse_bool(raw: &str) -> Option<bool> {
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Typed extractor for a single path segment.
pub struct PathLens<T> {
    id: LensId,
    meta: Meta,
    parse: Parse<T>,
    fixed: bool,
}

impl<T> Clone for PathLens<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            meta: self.meta.clone(),
            parse: self.parse.clone(),
            fixed: self.fixed,
        }
    }
}

impl<T> fmt::Debug for PathLens<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathLens")
            .field("id", &self.id)
            .field("meta", &self.meta)
            .field("fixed", &self.fixed)
            .finish()
    }
}

impl<T: Send + Sync + 'static> PathLens<T> {
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

    pub fn extract(&self, segment: &str) -> Result<T, LensFailure> {
        (self.parse)(segment).ok_or_else(|| LensFailure::single(Failure::Invalid(self.meta.clone())))
    }
}

/// Type-erased view of a [`PathLens`], as stored in a route spec.
pub trait PathParam: Send + Sync {
    fn id(&self) -> LensId;

    fn meta(&self) -> &Meta;

    /// True for literal segments created with [`Path::fixed`].
    fn is_fixed(&self) -> bool;

    /// Template fragment: `{name}` for parameters, the literal for fixed segments.
    fn describe(&self) -> String;

    fn extract_value(&self, segment: &str) -> Result<Arc<dyn Any + Send + Sync>, LensFailure>;
}

impl<T: Send + Sync + 'static> PathParam for PathLens<T> {
    fn id(&self) -> LensId {
        self.id
    }

    fn meta(&self) -> &Meta {
        &self.meta
    }

    fn is_fixed(&self) -> bool {
        self.fixed
    }

    fn describe(&self) -> String {
        if self.fixed {
            self.meta.name.clone()
        } else {
            format!("{{{}}}", self.meta.name)
        }
    }

    fn extract_value(&self, segment: &str) -> Result<Arc<dyn Any + Send + Sync>, LensFailure> {
        self.extract(segment)
            .map(|value| Arc::new(value) as Arc<dyn Any + Send + Sync>)
    }
}
