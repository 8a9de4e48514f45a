//! Atomic file replacement and timestamped backups
//!
//! Both the property file and env file writers go through here so that a
//! crash mid-write never leaves a half-written configuration file behind.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use tempfile::NamedTempFile;

/// Suffix format appended to backups, e.g. `hadoop-env.sh.2024-03-01_14_05.123`
const BACKUP_SUFFIX_FORMAT: &str = ".%Y-%m-%d_%H_%M.%3f";

/// Write `contents` to `path` atomically (write-then-rename).
///
/// The temp file lives in the target's directory so the final rename never
/// crosses a filesystem boundary. Permissions of an existing target are kept.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut temp = NamedTempFile::new_in(&parent)?;
    temp.write_all(contents)?;
    temp.as_file().sync_all()?;

    match fs::metadata(path) {
        Ok(meta) => temp.as_file().set_permissions(meta.permissions())?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => set_new_file_mode(temp.as_file())?,
        Err(e) => return Err(e),
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(unix)]
fn set_new_file_mode(file: &fs::File) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_new_file_mode(_file: &fs::File) -> io::Result<()> {
    Ok(())
}

/// Copy `path` to a timestamped sibling before it gets overwritten.
///
/// Returns `Ok(None)` when there is no original to preserve.
pub fn backup(path: &Path) -> io::Result<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }
    let backup_path = backup_path_for(path);
    fs::copy(path, &backup_path)?;
    tracing::info!(original = %path.display(), backup = %backup_path.display(), "created backup");
    Ok(Some(backup_path))
}

fn backup_path_for(path: &Path) -> PathBuf {
    let suffix = Local::now().format(BACKUP_SUFFIX_FORMAT).to_string();
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_atomic_creates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("core-site.xml");

        write_atomic(&path, b"<configuration/>").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "<configuration/>");
    }

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_temp() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hadoop-env.sh");
        fs::write(&path, "old").unwrap();

        write_atomic(&path, b"new").unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("yarn-env.sh");
        fs::write(&path, "x").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();

        write_atomic(&path, b"y").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o755);
    }

    #[test]
    fn test_backup_copies_original() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hdfs-site.xml");
        fs::write(&path, "original").unwrap();

        let backup_path = backup(&path).unwrap().unwrap();

        assert_ne!(backup_path, path);
        assert!(backup_path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("hdfs-site.xml."));
        assert_eq!(fs::read_to_string(&backup_path).unwrap(), "original");
        assert_eq!(fs::read_to_string(&path).unwrap(), "original");
    }

    #[test]
    fn test_backup_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(backup(&dir.path().join("absent.xml")).unwrap().is_none());
    }
}
