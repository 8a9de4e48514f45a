use std::fs;
use std::path::{Path, PathBuf};

use super::file::EnvFile;
use super::var::EnvVar;
use super::EnvError;

const ENV_FILE_SUFFIX: &str = "-env.sh";

/// Environment files searched in order; on a name collision the first
/// file declaring the variable wins.
#[derive(Debug, Clone, Default)]
pub struct EnvFileSet {
    files: Vec<EnvFile>,
}

impl EnvFileSet {
    /// Load every `*-env.sh` file from the first of `base`,
    /// `base/etc/hadoop` and `base/conf` that has any.
    pub fn discover(base: &Path) -> Result<Self, EnvError> {
        let candidates = [
            base.to_path_buf(),
            base.join("etc").join("hadoop"),
            base.join("conf"),
        ];
        for dir in &candidates {
            let found = env_files_in(dir);
            if !found.is_empty() {
                tracing::debug!(dir = %dir.display(), files = found.len(), "found env files");
                return Self::from_paths(&found);
            }
        }

        Err(EnvError::NotFound {
            what: format!("*{}", ENV_FILE_SUFFIX),
            searched: candidates
                .iter()
                .map(|d| d.display().to_string())
                .collect::<Vec<_>>()
                .join(", "),
        })
    }

    pub fn from_paths(paths: &[PathBuf]) -> Result<Self, EnvError> {
        let files = paths
            .iter()
            .map(|p| EnvFile::load(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { files })
    }

    pub fn files(&self) -> &[EnvFile] {
        &self.files
    }

    pub fn get(&self, name: &str) -> Option<&EnvVar> {
        self.files.iter().find_map(|f| f.get(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut EnvVar> {
        self.files.iter_mut().find_map(|f| f.get_mut(name))
    }

    /// Names across all files in search order, duplicates included
    pub fn keys(&self) -> Vec<String> {
        self.files.iter().flat_map(|f| f.keys()).collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.files.iter().any(EnvFile::is_dirty)
    }

    /// Save each file in order, stopping at the first failure. Files
    /// before the failing one stay saved.
    pub fn save(&mut self, backup: bool) -> Result<(), EnvError> {
        for file in &mut self.files {
            file.save(backup)?;
        }
        Ok(())
    }
}

/// `*-env.sh` regular files directly in `dir`, sorted; empty if unreadable
fn env_files_in(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_file()).unwrap_or(false))
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(ENV_FILE_SUFFIX))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files
}
