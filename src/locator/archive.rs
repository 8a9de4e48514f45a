//! Reading default property files out of packaged (zip) archives

use std::fs::File;
use std::io::Read;
use std::path::Path;

use zip::result::ZipError;
use zip::ZipArchive;

use crate::error::ConfigError;
use crate::property::{PropertySet, Source};

/// Extract `member` from the archive at `archive` and parse it as an
/// embedded default, tagged `archive/member`.
pub fn extract_defaults(archive: &Path, member: &str) -> Result<PropertySet, ConfigError> {
    let file = File::open(archive).map_err(|e| ConfigError::io("opening archive", archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| zip_error(archive, e))?;

    let text = {
        let mut entry = zip.by_name(member).map_err(|e| match e {
            ZipError::FileNotFound => ConfigError::NotFound {
                what: member.to_string(),
                searched: archive.display().to_string(),
            },
            other => zip_error(archive, other),
        })?;
        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|e| ConfigError::io("reading archive member", archive.join(member), e))?;
        text
    };

    let origin = Source::embedded(archive.join(member).to_string_lossy());
    PropertySet::parse(&text, origin)
}

fn zip_error(archive: &Path, err: ZipError) -> ConfigError {
    match err {
        ZipError::Io(source) => ConfigError::io("reading archive", archive, source),
        other => ConfigError::ParseError {
            path: archive.display().to_string(),
            message: other.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::ConfSource;
    use crate::property::SourceKind;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn write_jar(path: &Path, members: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).unwrap());
        for (name, body) in members {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    const CORE_DEFAULT: &str = "<configuration><property>\
        <name>hadoop.common.configuration.version</name><value>0.23.0</value>\
        </property></configuration>";

    #[test]
    fn test_extract_member() {
        let dir = TempDir::new().unwrap();
        let jar = dir.path().join("hadoop-common-2.1.0-beta.jar");
        write_jar(&jar, &[("META-INF/MANIFEST.MF", ""), ("core-default.xml", CORE_DEFAULT)]);

        let set = extract_defaults(&jar, "core-default.xml").unwrap();

        assert_eq!(set.get("hadoop.common.configuration.version"), "0.23.0");
        assert_eq!(set.origin().kind, Some(SourceKind::EmbeddedDefault));
        assert!(set.origin().location.ends_with("hadoop-common-2.1.0-beta.jar/core-default.xml"));
    }

    #[test]
    fn test_missing_member_is_not_found() {
        let dir = TempDir::new().unwrap();
        let jar = dir.path().join("hadoop-common-2.1.0.jar");
        write_jar(&jar, &[("core-default.xml", CORE_DEFAULT)]);

        let err = extract_defaults(&jar, "hdfs-default.xml").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_not_a_zip() {
        let dir = TempDir::new().unwrap();
        let jar = dir.path().join("broken.jar");
        std::fs::write(&jar, "definitely not a zip").unwrap();

        let err = extract_defaults(&jar, "core-default.xml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_malformed_member() {
        let dir = TempDir::new().unwrap();
        let jar = dir.path().join("hadoop-common-2.1.0.jar");
        write_jar(&jar, &[("core-default.xml", "<configuration><property>")]);

        let err = extract_defaults(&jar, "core-default.xml").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
        assert!(err.to_string().contains("core-default.xml"));
    }
}
