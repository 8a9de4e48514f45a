//! Tool settings (`~/.config/hadoopconf/config.toml`)
//!
//! Optional; supplies defaults that command-line flags and `HADOOP_CONF`
//! override.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit settings file
pub const SETTINGS_ENV: &str = "HADOOPCONF_CONFIG";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {}: {source}", path.display())]
    IoError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse settings file {}: {source}", path.display())]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base directory for site and env files
    pub conf_dir: Option<PathBuf>,

    /// Base directory for packaged archives
    pub archive_dir: Option<PathBuf>,

    /// Back up files before overwriting them (default: true)
    pub backup: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            conf_dir: None,
            archive_dir: None,
            backup: true,
        }
    }
}

impl Settings {
    /// Default settings file path, honouring `HADOOPCONF_CONFIG`
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(SETTINGS_ENV) {
            if !path.is_empty() {
                return Some(PathBuf::from(path));
            }
        }
        std::env::var("HOME")
            .ok()
            .map(|home| PathBuf::from(home).join(".config/hadoopconf/config.toml"))
    }

    /// Load from the default location; a missing file means defaults
    pub fn load_default() -> Result<Self, SettingsError> {
        match Self::default_path() {
            Some(path) => Self::load_optional(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load `path`, or return defaults if it does not exist
    pub fn load_optional(path: &Path) -> Result<Self, SettingsError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents).map_err(|source| SettingsError::ParseError {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(source) => Err(SettingsError::IoError {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
