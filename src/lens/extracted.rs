//! Per-request store of bound path values.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::meta::LensId;
use super::path::PathLens;

/// Values bound from the path, keyed by the identity of the lens that bound
/// them. Created fresh for every matching request.
#[derive(Clone, Default)]
pub struct ExtractedParts {
    values: HashMap<LensId, Arc<dyn Any + Send + Sync>>,
}

impl ExtractedParts {
    pub(crate) fn new(values: HashMap<LensId, Arc<dyn Any + Send + Sync>>) -> Self {
        Self { values }
    }

    /// The value bound by `lens`, or `None` if that lens did not take part in
    /// the match.
    pub fn get<T>(&self, lens: &PathLens<T>) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.values
            .get(&lens.id())
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ExtractedParts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractedParts")
            .field("lenses", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lens::{Path, PathParam};

    #[test]
    fn test_lookup_by_lens_identity() {
        let id = Path::int().of("id");
        let other = Path::int().of("id");

        let mut values = HashMap::new();
        values.insert(id.id(), id.extract_value("7").unwrap());
        let parts = ExtractedParts::new(values);

        assert_eq!(parts.get(&id), Some(7));
        assert_eq!(parts.get(&id.clone()), Some(7));
        // same name, different lens
        assert_eq!(parts.get(&other), None);
    }
}
