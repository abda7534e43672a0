//! Parameter metadata shared by every lens.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Process-unique identity of a lens. Clones of a lens share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LensId(u64);

impl LensId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Where in the request a parameter lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Location {
    Path,
    Query,
    Header,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Location::Path => "path",
            Location::Query => "query",
            Location::Header => "header",
        })
    }
}

/// Declared value type of a parameter, used in failure messages and route
/// descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    String,
    Integer,
    Number,
    Boolean,
    Enum,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamType::String => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Enum => "enum",
        })
    }
}

/// Name, location and type of one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Meta {
    pub name: String,
    pub location: Location,
    pub required: bool,
    pub param_type: ParamType,
    pub description: Option<String>,
}

impl Meta {
    pub fn new(
        name: impl Into<String>,
        location: Location,
        required: bool,
        param_type: ParamType,
    ) -> Self {
        Self {
            name: name.into(),
            location,
            required,
            param_type,
            description: None,
        }
    }
}

impl fmt::Display for Meta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} '{}'", self.location, self.name)
    }
}
