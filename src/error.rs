//! Decoding errors and the breadcrumb path that locates them.
//!
//! Every failure raised by the engine is a [`DecodeError`] carrying the full
//! [`CodingPath`] from the document root to the node being decoded when the
//! failure happened. There is no local recovery: the first error aborts the
//! whole top-level call.

use std::fmt;
use thiserror::Error;

use crate::value::TreeError;

// ============================================================================
// Coding Path
// ============================================================================

/// One step from a container to a nested value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// A named field of a keyed container.
    Key(String),
    /// A position inside an unkeyed container.
    Index(usize),
}

impl PathSegment {
    /// Shorthand for [`PathSegment::Key`].
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "[{}]", i),
        }
    }
}

/// Append-only trail of segments from the root to the current position.
///
/// A path is extended by producing a new path ([`CodingPath::child`]); an
/// existing path is never changed after it has been handed to a container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CodingPath(Vec<PathSegment>);

impl CodingPath {
    /// The empty path (document root).
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns a new path with `segment` appended.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment);
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Key segments only, handy for assertions on keyed paths.
    pub fn keys(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|s| match s {
                PathSegment::Key(k) => Some(k.as_str()),
                PathSegment::Index(_) => None,
            })
            .collect()
    }
}

impl From<Vec<PathSegment>> for CodingPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl fmt::Display for CodingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(k) if i > 0 => write!(f, ".{}", k)?,
                other => write!(f, "{}", other)?,
            }
        }
        Ok(())
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Coarse classification of a [`DecodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    KeyNotFound,
    TypeMismatch,
    ValueCorrupted,
    NamespaceUnresolved,
}

/// A terminal decoding failure.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum DecodeError {
    /// A required keyed field is absent. The path ends with the missing key.
    #[error("key not found at {path}: no value associated with key `{key}`")]
    KeyNotFound { key: String, path: CodingPath },

    /// A value is present but its shape does not match what was requested.
    #[error("type mismatch at {path}: expected {expected}, {message}")]
    TypeMismatch {
        expected: &'static str,
        message: String,
        path: CodingPath,
    },

    /// The shape is right but the content is invalid for the requested
    /// interpretation (bad base64, unparsable date, out-of-range number).
    #[error("value corrupted at {path}: {message}")]
    ValueCorrupted { message: String, path: CodingPath },

    /// A namespace-qualified lookup found no declaration in scope (XML only).
    #[error("namespace `{prefix}` is not declared in scope at {path}")]
    NamespaceUnresolved { prefix: String, path: CodingPath },
}

impl DecodeError {
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            Self::KeyNotFound { .. } => DecodeErrorKind::KeyNotFound,
            Self::TypeMismatch { .. } => DecodeErrorKind::TypeMismatch,
            Self::ValueCorrupted { .. } => DecodeErrorKind::ValueCorrupted,
            Self::NamespaceUnresolved { .. } => DecodeErrorKind::NamespaceUnresolved,
        }
    }

    pub fn path(&self) -> &CodingPath {
        match self {
            Self::KeyNotFound { path, .. }
            | Self::TypeMismatch { path, .. }
            | Self::ValueCorrupted { path, .. }
            | Self::NamespaceUnresolved { path, .. } => path,
        }
    }

    pub(crate) fn key_not_found(path: &CodingPath, key: &str) -> Self {
        Self::KeyNotFound {
            key: key.to_string(),
            path: path.child(PathSegment::key(key)),
        }
    }

    pub(crate) fn type_mismatch(
        path: &CodingPath,
        expected: &'static str,
        message: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            expected,
            message: message.into(),
            path: path.clone(),
        }
    }

    /// Builds a [`DecodeError::ValueCorrupted`]. Schema types use this to
    /// report content they reject after a structurally successful decode.
    pub fn corrupted(path: &CodingPath, message: impl Into<String>) -> Self {
        Self::ValueCorrupted {
            message: message.into(),
            path: path.clone(),
        }
    }

    pub(crate) fn namespace_unresolved(path: &CodingPath, prefix: &str) -> Self {
        Self::NamespaceUnresolved {
            prefix: prefix.to_string(),
            path: path.clone(),
        }
    }
}

/// Failure of a text-to-value convenience call: either the tree could not
/// be built or the built tree could not be decoded.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = CodingPath::root()
            .child(PathSegment::key("channel"))
            .child(PathSegment::key("item"))
            .child(PathSegment::Index(3))
            .child(PathSegment::key("title"));
        assert_eq!(path.to_string(), "channel.item[3].title");
        assert_eq!(CodingPath::root().to_string(), "<root>");
    }

    #[test]
    fn test_child_does_not_mutate_parent() {
        let parent = CodingPath::root().child(PathSegment::key("a"));
        let child = parent.child(PathSegment::key("b"));
        assert_eq!(parent.len(), 1);
        assert_eq!(child.keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_key_not_found_path_ends_with_key() {
        let err = DecodeError::key_not_found(&CodingPath::root(), "title");
        assert_eq!(err.kind(), DecodeErrorKind::KeyNotFound);
        assert_eq!(err.path().keys(), vec!["title"]);
        assert!(err.to_string().contains("`title`"));
    }
}
