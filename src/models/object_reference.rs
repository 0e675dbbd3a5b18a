//! A parsed pointer into the object store.

use std::fmt;

/// A `(container, key)` pair parsed from an `s3://container/key` URI.
///
/// Only [`crate::validators::parse_object_reference`] builds these, so a value
/// of this type always satisfies the container naming rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectReference {
    /// Bucket name: 3–63 characters of lowercase letters, digits, `.` or `-`.
    container: String,

    /// Object key, verbatim. May contain `/`.
    key: String,
}

impl ObjectReference {
    pub(crate) fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s3://{}/{}", self.container, self.key)
    }
}
