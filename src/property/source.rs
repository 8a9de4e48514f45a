//! Provenance of a property value

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a property set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A site file on the local filesystem
    LocalFile,
    /// A default file extracted from a packaged archive
    EmbeddedDefault,
    /// Built in memory (tests, generated sets)
    Synthesized,
}

/// Provenance tag returned alongside a looked-up value.
///
/// `Source::none()` (empty location, no kind) means the key was not found
/// in any consulted set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Source {
    /// Path of the answering file; archive members are `archive/member`
    pub location: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<SourceKind>,
}

impl Source {
    pub fn new(location: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            location: location.into(),
            kind: Some(kind),
        }
    }

    pub fn local(location: impl Into<String>) -> Self {
        Self::new(location, SourceKind::LocalFile)
    }

    pub fn embedded(location: impl Into<String>) -> Self {
        Self::new(location, SourceKind::EmbeddedDefault)
    }

    pub fn synthesized(location: impl Into<String>) -> Self {
        Self::new(location, SourceKind::Synthesized)
    }

    /// The "not found anywhere" marker
    pub fn none() -> Self {
        Self::default()
    }

    pub fn is_none(&self) -> bool {
        self.kind.is_none() && self.location.is_empty()
    }

    /// Final path component of the location, for compact display
    pub fn file_name(&self) -> &str {
        self.location
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.location)
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "<none>")
        } else {
            write!(f, "{}", self.location)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_source() {
        assert!(Source::none().is_none());
        assert!(!Source::local("/etc/hadoop/core-site.xml").is_none());
        assert_eq!(Source::none().to_string(), "<none>");
    }

    #[test]
    fn test_file_name_of_archive_member() {
        let src = Source::embedded("/usr/lib/hadoop/hadoop-common-2.6.0.jar/core-default.xml");
        assert_eq!(src.file_name(), "core-default.xml");
        assert_eq!(src.kind, Some(SourceKind::EmbeddedDefault));
    }
}
