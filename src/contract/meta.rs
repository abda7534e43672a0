//! Declarative route metadata.

use std::fmt;
use std::sync::Arc;

use super::preflight::PreFlightExtraction;
use super::security::Security;
use crate::filter::Filter;
use crate::lens::{Meta, Validate};

/// Grouping label for routes in a description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag {
    pub name: String,
    pub description: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn described(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Metadata attached to one route. Shared by every request to that route.
#[derive(Clone, Default)]
pub struct RouteMeta {
    summary: String,
    description: Option<String>,
    operation_id: Option<String>,
    tags: Vec<Tag>,
    request_params: Vec<Arc<dyn Validate>>,
    security: Option<Arc<dyn Security>>,
    pre_flight_extraction: Option<PreFlightExtraction>,
}

impl RouteMeta {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn operation_id(mut self, operation_id: impl Into<String>) -> Self {
        self.operation_id = Some(operation_id.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Declare a non-body parameter (query or header lens).
    pub fn param(mut self, lens: impl Validate + 'static) -> Self {
        self.request_params.push(Arc::new(lens));
        self
    }

    /// Security applied to this route in addition to the contract's.
    pub fn security(mut self, security: impl Security + 'static) -> Self {
        self.security = Some(Arc::new(security));
        self
    }

    /// Override the contract-wide pre-flight extraction policy.
    pub fn pre_flight_extraction(mut self, policy: PreFlightExtraction) -> Self {
        self.pre_flight_extraction = Some(policy);
        self
    }

    pub fn summary_text(&self) -> &str {
        &self.summary
    }

    pub fn description_text(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn operation_id_text(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn request_params(&self) -> &[Arc<dyn Validate>] {
        &self.request_params
    }

    pub fn route_security(&self) -> Option<&Arc<dyn Security>> {
        self.security.as_ref()
    }

    pub fn pre_flight_override(&self) -> Option<&PreFlightExtraction> {
        self.pre_flight_extraction.as_ref()
    }

    /// The per-route security filter, or the identity filter when unset.
    pub(crate) fn security_filter(&self) -> Filter {
        self.security
            .as_ref()
            .map(|security| security.filter())
            .unwrap_or_else(Filter::no_op)
    }
}

impl fmt::Debug for RouteMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMeta")
            .field("summary", &self.summary)
            .field("operation_id", &self.operation_id)
            .field("tags", &self.tags)
            .field(
                "request_params",
                &self
                    .request_params
                    .iter()
                    .map(|p| p.meta())
                    .collect::<Vec<&Meta>>(),
            )
            .field("security", &self.security.as_ref().map(|s| s.name().to_string()))
            .field("pre_flight_extraction", &self.pre_flight_extraction)
            .finish()
    }
}
