//! Error types for property files, archive lookup and layer resolution

use std::io;
use std::path::PathBuf;

/// Errors raised while locating, parsing, mutating or saving configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No archive, member or file matched the search criteria
    #[error("{what} not found (searched: {searched})")]
    NotFound { what: String, searched: String },

    #[error("Failed to parse {path}: {message}")]
    ParseError { path: String, message: String },

    #[error("IO error while {op} {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("Invalid pattern '{pattern}': {message}")]
    PatternError { pattern: String, message: String },

    /// A mutation was routed to a layer that has nowhere to write
    #[error("{subsystem} layer has no override file to write to")]
    NoOverride { subsystem: String },
}

impl ConfigError {
    pub(crate) fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        ConfigError::IoError {
            path: path.into(),
            op,
            source,
        }
    }

    /// True for the recoverable "nothing matched" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }
}
