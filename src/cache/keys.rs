//! Cache key definitions.
//!
//! Keys are namespaced strings of the form `{namespace}:{kind}[:{identifier}]`.
//! Namespace and kind are fixed, colon-free tokens and the identifier is
//! always the last segment, so two distinct resources never share a key.

use std::fmt;

/// Kind segment for a collection listing.
pub const KIND_LIST: &str = "list";
/// Kind segment for a single entry.
pub const KIND_SINGLE: &str = "single";

/// Namespaced cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Compose a key from its segments.
    pub fn compose(namespace: &'static str, kind: &'static str, identifier: Option<&str>) -> Self {
        debug_assert!(!namespace.is_empty() && !namespace.contains(':'));
        debug_assert!(!kind.is_empty() && !kind.contains(':'));

        match identifier {
            Some(identifier) => Self(format!("{namespace}:{kind}:{identifier}")),
            None => Self(format!("{namespace}:{kind}")),
        }
    }

    /// `{namespace}:list`
    pub fn list(namespace: &'static str) -> Self {
        Self::compose(namespace, KIND_LIST, None)
    }

    /// `{namespace}:single:{identifier}`
    pub fn single(namespace: &'static str, identifier: &str) -> Self {
        Self::compose(namespace, KIND_SINGLE, Some(identifier))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading namespace segment, used as a metrics label.
    pub fn namespace(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
