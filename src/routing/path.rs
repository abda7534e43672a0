//! Path segment sequences.
//!
//! # Responsibilities
//! - Split a URL path into ordered, non-empty tokens
//! - Element-wise prefix comparison and stripping
//! - Render a sequence back into a `/`-joined path
//!
//! # Design Decisions
//! - Tokens are percent-decoded once, at construction
//! - Empty tokens (`//`, leading or trailing `/`) are dropped
//! - Immutable: every operation returns a new sequence

use std::fmt;

/// Immutable, ordered sequence of URL path tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathSegments {
    tokens: Vec<String>,
}

impl PathSegments {
    /// The empty path (`/`).
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse a path such as `/v1/items/42`.
    pub fn new(path: &str) -> Self {
        let tokens = path
            .split('/')
            .filter(|t| !t.is_empty())
            .map(|t| {
                urlencoding::decode(t)
                    .map(|decoded| decoded.into_owned())
                    .unwrap_or_else(|_| t.to_string())
            })
            .collect();
        Self { tokens }
    }

    /// Build from already-split tokens. Empty tokens are discarded.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|t: &String| !t.is_empty())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// True iff `prefix` is no longer than `self` and every token of `prefix`
    /// equals the token at the same index.
    pub fn starts_with(&self, prefix: &PathSegments) -> bool {
        prefix.len() <= self.len()
            && prefix
                .tokens
                .iter()
                .zip(self.tokens.iter())
                .all(|(p, t)| p == t)
    }

    /// Remove a prefix previously verified with [`starts_with`](Self::starts_with).
    pub fn without(&self, prefix: &PathSegments) -> PathSegments {
        debug_assert!(
            self.starts_with(prefix),
            "`{prefix}` is not a prefix of `{self}`"
        );
        Self {
            tokens: self.tokens[prefix.len().min(self.len())..].to_vec(),
        }
    }

    /// Concatenate two sequences.
    pub fn join(&self, other: &PathSegments) -> PathSegments {
        let mut tokens = self.tokens.clone();
        tokens.extend(other.tokens.iter().cloned());
        Self { tokens }
    }
}

impl fmt::Display for PathSegments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            return f.write_str("/");
        }
        for token in &self.tokens {
            write!(f, "/{token}")?;
        }
        Ok(())
    }
}

impl From<&str> for PathSegments {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drops_empty_tokens() {
        let path = PathSegments::new("//v1/items//42/");
        assert_eq!(path.tokens(), &["v1", "items", "42"]);
        assert!(PathSegments::new("/").is_empty());
        assert!(PathSegments::new("").is_empty());
    }

    #[test]
    fn test_tokens_are_percent_decoded() {
        let path = PathSegments::new("/files/a%20b");
        assert_eq!(path.get(1), Some("a b"));
    }

    #[test]
    fn test_starts_with_is_element_wise() {
        let full = PathSegments::new("/v1/items/42");
        assert!(full.starts_with(&PathSegments::new("/v1")));
        assert!(full.starts_with(&PathSegments::new("/v1/items")));
        assert!(full.starts_with(&PathSegments::root()));
        assert!(full.starts_with(&full));

        // "/v1/item" is a string prefix but not a segment prefix
        assert!(!full.starts_with(&PathSegments::new("/v1/item")));
        assert!(!full.starts_with(&PathSegments::new("/v1/items/42/extra")));
    }

    #[test]
    fn test_without_strips_prefix() {
        let full = PathSegments::new("/v1/items/42");
        let rest = full.without(&PathSegments::new("/v1/items"));
        assert_eq!(rest.tokens(), &["42"]);
        assert!(full.without(&full).is_empty());
    }

    #[test]
    fn test_join_and_display() {
        let joined = PathSegments::new("/v1").join(&PathSegments::new("items"));
        assert_eq!(joined.to_string(), "/v1/items");
        assert_eq!(PathSegments::root().to_string(), "/");
        assert_eq!(PathSegments::root().join(&PathSegments::root()), PathSegments::root());
    }
}
