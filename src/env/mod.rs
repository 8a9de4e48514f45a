//! Shell environment files (`*-env.sh`)
//!
//! Only `export NAME=value` lines are understood. Saving rewrites the lines
//! of modified variables and passes every other byte through unchanged.

mod file;
mod set;
mod var;

pub use file::{parse_export, EnvFile};
pub use set::EnvFileSet;
pub use var::EnvVar;

use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum EnvError {
    #[error("{what} not found (searched: {searched})")]
    NotFound { what: String, searched: String },

    #[error("Failed to parse {}{}: {message}", path.display(), line.map(|l| format!(" line {}", l)).unwrap_or_default())]
    ParseError {
        path: PathBuf,
        line: Option<usize>,
        message: String,
    },

    #[error("IO error while {op} {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// The file changed on disk since it was loaded
    #[error("{} line {line} no longer declares {name}; reload and retry", path.display())]
    StaleLine {
        path: PathBuf,
        line: usize,
        name: String,
    },
}

impl EnvError {
    pub(crate) fn io(op: &'static str, path: &Path, source: io::Error) -> Self {
        EnvError::IoError {
            path: path.to_path_buf(),
            op,
            source,
        }
    }
}
