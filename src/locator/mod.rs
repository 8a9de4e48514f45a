//! Locating packaged default property sets
//!
//! Searches an ordered list of directory globs for the first archive whose
//! file name matches one of a set of version/name patterns, then extracts
//! the requested default file from it.

mod archive;
mod dirs;

pub use archive::extract_defaults;
pub use dirs::expand_dir_glob;

use std::fs;
use std::path::PathBuf;

use regex_lite::Regex;

use crate::error::ConfigError;
use crate::property::PropertySet;

/// Compiled archive name patterns. Each pattern must match the whole
/// file name.
#[derive(Debug, Clone)]
pub struct ArchivePatterns {
    patterns: Vec<Regex>,
}

impl ArchivePatterns {
    pub fn new(patterns: &[&str]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&format!("^(?:{})$", p)).map_err(|e| ConfigError::PatternError {
                    pattern: p.to_string(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn matches(&self, file_name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(file_name))
    }

    fn describe(&self) -> String {
        self.patterns
            .iter()
            .map(|re| re.as_str().to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Find the first matching archive.
///
/// Directory globs are tried in order and each expands to directories in
/// sorted order; within a directory, files are checked in name order.
pub fn find_archive(base_dirs: &[String], patterns: &ArchivePatterns) -> Result<PathBuf, ConfigError> {
    for glob in base_dirs {
        for dir in expand_dir_glob(glob)? {
            let entries = fs::read_dir(&dir).map_err(|e| ConfigError::io("listing", &dir, e))?;
            let mut names: Vec<String> = entries
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().map(|t| !t.is_dir()).unwrap_or(false))
                .map(|entry| entry.file_name().to_string_lossy().into_owned())
                .collect();
            names.sort();

            tracing::debug!(dir = %dir.display(), candidates = names.len(), "scanning for archive");
            if let Some(name) = names.iter().find(|n| patterns.matches(n)) {
                let found = dir.join(name);
                tracing::info!(archive = %found.display(), "matched archive");
                return Ok(found);
            }
        }
    }

    Err(ConfigError::NotFound {
        what: format!("archive matching [{}]", patterns.describe()),
        searched: base_dirs.join(", "),
    })
}

/// Locate the archive matching `name_patterns` under `base_dirs` and load
/// `member` from it as an embedded default.
///
/// A missing member inside the matched archive is `NotFound`; later
/// archives are not consulted.
pub fn locate(
    base_dirs: &[String],
    name_patterns: &[&str],
    member: &str,
) -> Result<PropertySet, ConfigError> {
    let patterns = ArchivePatterns::new(name_patterns)?;
    let archive = find_archive(base_dirs, &patterns)?;
    extract_defaults(&archive, member)
}
