//! Document resources
//!
//! Provides [`Resource`], the comparable identifier every savable document is
//! keyed by. A resource is a `scheme://path` pair; the scheme tells which
//! content source backs it (`file` for disk, private schemes for virtual
//! documents).

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Scheme for ordinary on-disk documents
pub const FILE_SCHEME: &str = "file";

/// Identifier of a savable document
///
/// # Examples
/// - `file:///home/me/notes.md`
/// - `conflictResolution:///home/me/notes.md`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Resource {
    scheme: String,
    path: String,
}

impl Resource {
    /// Create resource from scheme and path
    #[inline]
    #[must_use]
    pub fn new(scheme: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            path: path.into(),
        }
    }

    /// Create an on-disk resource
    #[inline]
    #[must_use]
    pub fn file(path: impl Into<String>) -> Self {
        Self::new(FILE_SCHEME, path)
    }

    /// Get scheme
    #[inline]
    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Get path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Check whether this is an on-disk resource
    #[inline]
    #[must_use]
    pub fn is_file(&self) -> bool {
        self.scheme == FILE_SCHEME
    }

    /// Same path under another scheme
    #[inline]
    #[must_use]
    pub fn with_scheme(&self, scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            path: self.path.clone(),
        }
    }

    /// Last path segment, used for display names
    ///
    /// Falls back to the full path when it has no separators.
    #[must_use]
    pub fn basename(&self) -> &str {
        self.path
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(&self.path)
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}", self.scheme, self.path)
    }
}

impl FromStr for Resource {
    type Err = ResourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scheme, path) = s
            .split_once("://")
            .ok_or_else(|| ResourceError::MissingScheme(s.to_string()))?;

        if scheme.is_empty() {
            return Err(ResourceError::MissingScheme(s.to_string()));
        }
        if !scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        {
            return Err(ResourceError::InvalidScheme(scheme.to_string()));
        }
        if path.is_empty() {
            return Err(ResourceError::EmptyPath);
        }

        Ok(Self::new(scheme, path))
    }
}

/// Errors when parsing resources
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    /// No `scheme://` prefix
    #[error("missing scheme in resource: '{0}'")]
    MissingScheme(String),

    /// Scheme contains characters outside `[A-Za-z0-9+.-]`
    #[error("invalid scheme: '{0}'")]
    InvalidScheme(String),

    /// Nothing after the scheme separator
    #[error("empty resource path")]
    EmptyPath,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resource_parse_and_display() {
        let r = Resource::from_str("file:///tmp/notes.md").unwrap();
        assert_eq!(r.scheme(), "file");
        assert_eq!(r.path(), "/tmp/notes.md");
        assert_eq!(r.to_string(), "file:///tmp/notes.md");
        assert!(r.is_file());
    }

    #[test]
    fn resource_parse_rejects_bad_input() {
        assert!(matches!(
            Resource::from_str("/tmp/notes.md"),
            Err(ResourceError::MissingScheme(_))
        ));
        assert!(matches!(
            Resource::from_str("://x"),
            Err(ResourceError::MissingScheme(_))
        ));
        assert!(matches!(
            Resource::from_str("bad scheme://x"),
            Err(ResourceError::InvalidScheme(_))
        ));
        assert_eq!(Resource::from_str("file://"), Err(ResourceError::EmptyPath));
    }

    #[test]
    fn resource_with_scheme_keeps_path() {
        let r = Resource::file("/a/b.txt");
        let virt = r.with_scheme("conflictResolution");
        assert_eq!(virt.path(), r.path());
        assert_ne!(virt, r);
        assert_eq!(virt.with_scheme(FILE_SCHEME), r);
    }

    #[test]
    fn resource_basename() {
        assert_eq!(Resource::file("/a/b.txt").basename(), "b.txt");
        assert_eq!(Resource::file("b.txt").basename(), "b.txt");
        assert_eq!(Resource::file("/a/dir/").basename(), "dir");
    }

    proptest! {
        #[test]
        fn display_parses_back(scheme in "[a-z][a-z0-9+.-]{0,8}", path in "/[a-zA-Z0-9_./-]{1,24}") {
            let r = Resource::new(scheme, path);
            let parsed = Resource::from_str(&r.to_string()).unwrap();
            prop_assert_eq!(parsed, r);
        }
    }
}
