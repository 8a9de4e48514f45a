//! Directory glob expansion
//!
//! Literal leading components are taken as-is; only the part after the
//! first wildcard is walked and matched.

use std::path::{Component, Path, PathBuf};

use globset::GlobBuilder;
use walkdir::WalkDir;

use crate::error::ConfigError;

fn has_wildcard(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// Expand `pattern` to the existing directories it names, sorted by path.
///
/// A pattern without wildcards yields itself if it is a directory, and
/// nothing otherwise.
pub fn expand_dir_glob(pattern: &str) -> Result<Vec<PathBuf>, ConfigError> {
    let path = Path::new(pattern);
    if !has_wildcard(pattern) {
        return Ok(if path.is_dir() {
            vec![path.to_path_buf()]
        } else {
            Vec::new()
        });
    }

    let mut root = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        let literal = match component {
            Component::Normal(part) => !has_wildcard(&part.to_string_lossy()),
            _ => true,
        };
        if depth == 0 && literal {
            root.push(component.as_os_str());
        } else {
            depth += 1;
        }
    }
    if root.as_os_str().is_empty() {
        root.push(".");
    }

    let matcher = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| ConfigError::PatternError {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?
        .compile_matcher();

    let mut dirs: Vec<PathBuf> = WalkDir::new(&root)
        .min_depth(depth)
        .max_depth(depth)
        .follow_links(true)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|e| e.file_type().is_dir() && matcher.is_match(e.path()))
        .map(|e| e.into_path())
        .collect();
    dirs.sort();

    tracing::debug!(pattern, matched = dirs.len(), "expanded directory glob");
    Ok(dirs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_literal_directory() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().to_string_lossy().to_string();
        assert_eq!(expand_dir_glob(&pattern).unwrap(), vec![dir.path().to_path_buf()]);
    }

    #[test]
    fn test_literal_missing_directory() {
        let dir = TempDir::new().unwrap();
        let pattern = dir.path().join("nope").to_string_lossy().to_string();
        assert!(expand_dir_glob(&pattern).unwrap().is_empty());
    }

    #[test]
    fn test_wildcard_expansion_is_sorted_and_dirs_only() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("process/20-hdfs")).unwrap();
        fs::create_dir_all(dir.path().join("process/10-yarn")).unwrap();
        fs::write(dir.path().join("process/30-file"), "").unwrap();

        let pattern = dir.path().join("process/*").to_string_lossy().to_string();
        let dirs = expand_dir_glob(&pattern).unwrap();

        assert_eq!(
            dirs,
            vec![
                dir.path().join("process/10-yarn"),
                dir.path().join("process/20-hdfs"),
            ]
        );
    }

    #[test]
    fn test_wildcard_in_middle() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("a1/lib")).unwrap();
        fs::create_dir_all(dir.path().join("a2/lib")).unwrap();
        fs::create_dir_all(dir.path().join("b1/lib")).unwrap();

        let pattern = dir.path().join("a*/lib").to_string_lossy().to_string();
        let dirs = expand_dir_glob(&pattern).unwrap();

        assert_eq!(dirs, vec![dir.path().join("a1/lib"), dir.path().join("a2/lib")]);
    }

    #[test]
    fn test_invalid_glob() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/[", dir.path().display());
        assert!(matches!(
            expand_dir_glob(&pattern),
            Err(ConfigError::PatternError { .. })
        ));
    }
}
