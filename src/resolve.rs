//! Building a cluster configuration from a conf directory and an archive
//! directory.
//!
//! Two steps, mirroring where the data lives:
//! 1. `DefaultSets::locate` finds each subsystem's packaged default
//! 2. `HadoopConf::load` finds the site files and layers them on top

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::ConfigError;
use crate::layer::{ConfSource, ConfigLayer, MultiSourceConfig};
use crate::locator::{self, expand_dir_glob};
use crate::property::{PropertySet, Source};
use crate::settings::Settings;
use crate::subsystem::Subsystem;

/// Places commonly holding a live cluster configuration
pub const WELL_KNOWN_CONF_GLOBS: &[&str] = &[
    "/etc/hadoop",
    "/etc/hadoop/*",
    "/var/run/cloudera-scm-agent/process/*",
];

/// Everything resolution needs, fixed once per invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    /// Base directory for site and env files
    pub conf_dir: PathBuf,
    /// Base directory for packaged archives
    pub archive_dir: PathBuf,
    /// Whether saves back up the files they replace
    pub backup: bool,
}

impl ResolveContext {
    /// Combine command-line values, the `HADOOP_CONF` environment value and
    /// the settings file.
    ///
    /// Precedence: flag > environment > settings file > `.`. The archive
    /// directory falls back to the conf directory.
    pub fn new(
        conf_flag: Option<PathBuf>,
        archive_flag: Option<PathBuf>,
        no_backup_flag: bool,
        env_conf: Option<String>,
        settings: &Settings,
    ) -> Self {
        let conf_dir = conf_flag
            .or_else(|| env_conf.filter(|s| !s.is_empty()).map(PathBuf::from))
            .or_else(|| settings.conf_dir.clone())
            .unwrap_or_else(|| PathBuf::from("."));
        let archive_dir = archive_flag
            .or_else(|| settings.archive_dir.clone())
            .unwrap_or_else(|| conf_dir.clone());
        Self {
            conf_dir,
            archive_dir,
            backup: !no_backup_flag && settings.backup,
        }
    }
}

/// Packaged defaults per subsystem; optional subsystems may be missing
#[derive(Debug, Clone, Default)]
pub struct DefaultSets {
    sets: BTreeMap<Subsystem, PropertySet>,
}

impl DefaultSets {
    /// Locate every subsystem's default under `archive_base`.
    ///
    /// Failures for mandatory subsystems are returned; failures for
    /// optional ones are logged and leave that subsystem without defaults.
    pub fn locate(archive_base: &Path) -> Result<Self, ConfigError> {
        let mut sets = BTreeMap::new();
        for subsystem in Subsystem::ALL {
            match locate_one(subsystem, archive_base) {
                Ok(set) => {
                    sets.insert(subsystem, set);
                }
                Err(e) if subsystem.is_mandatory() => return Err(e),
                Err(e) => {
                    tracing::warn!(%subsystem, error = %e, "no packaged defaults, continuing without them");
                }
            }
        }
        Ok(Self { sets })
    }

    pub fn insert(&mut self, subsystem: Subsystem, set: PropertySet) {
        self.sets.insert(subsystem, set);
    }

    pub fn get(&self, subsystem: Subsystem) -> Option<&PropertySet> {
        self.sets.get(&subsystem)
    }

    fn take(&mut self, subsystem: Subsystem) -> Option<PropertySet> {
        self.sets.remove(&subsystem)
    }
}

fn locate_one(subsystem: Subsystem, archive_base: &Path) -> Result<PropertySet, ConfigError> {
    let mut set = locator::locate(
        &subsystem.archive_dirs(archive_base),
        subsystem.archive_patterns(),
        subsystem.default_file(),
    )?;
    for key in subsystem.extra_default_keys() {
        set.insert_missing(&key, "");
    }
    Ok(set)
}

/// Candidate site directories under a conf base, in search order
pub fn site_dir_candidates(base: &Path) -> Vec<PathBuf> {
    vec![base.join("etc/hadoop"), base.join("conf"), base.to_path_buf()]
}

/// First candidate directory holding `core-site.xml`
pub fn find_site_dir(base: &Path) -> Result<PathBuf, ConfigError> {
    find_site_file(base, Subsystem::Core.site_file())
        .and_then(|path| path.parent().map(Path::to_path_buf))
        .ok_or_else(|| not_found(base, Subsystem::Core.site_file()))
}

/// First existing `file` among the candidate site directories
pub fn find_site_file(base: &Path, file: &str) -> Option<PathBuf> {
    site_dir_candidates(base)
        .into_iter()
        .map(|dir| dir.join(file))
        .find(|path| path.is_file())
}

fn not_found(base: &Path, file: &str) -> ConfigError {
    ConfigError::NotFound {
        what: file.to_string(),
        searched: site_dir_candidates(base)
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    }
}

/// One row of `HadoopConf::stat`
#[derive(Debug, Clone, Serialize)]
pub struct StatEntry {
    pub subsystem: Subsystem,
    pub site_file: Option<String>,
    pub site_exists: bool,
    pub default_source: Option<String>,
}

/// A cluster's layered configuration
#[derive(Debug, Clone)]
pub struct HadoopConf {
    site_dir: PathBuf,
    config: MultiSourceConfig,
}

impl HadoopConf {
    /// Resolve both defaults and site files from a context
    pub fn resolve(ctx: &ResolveContext) -> Result<Self, ConfigError> {
        let defaults = DefaultSets::locate(&ctx.archive_dir)?;
        Self::load(&ctx.conf_dir, defaults)
    }

    /// Load site files under `conf_base` and layer them over `defaults`.
    ///
    /// Each site file is searched for separately across
    /// [`site_dir_candidates`]. `core-site.xml` and `hdfs-site.xml` must
    /// exist. Other site files may be missing; they start empty, bound to
    /// the directory holding `core-site.xml`, and are created only when
    /// saved.
    pub fn load(conf_base: &Path, mut defaults: DefaultSets) -> Result<Self, ConfigError> {
        let site_dir = find_site_dir(conf_base)?;
        tracing::debug!(site_dir = %site_dir.display(), "using site directory");

        let mut layers = Vec::with_capacity(Subsystem::ALL.len());
        for subsystem in Subsystem::ALL {
            let overrides = match find_site_file(conf_base, subsystem.site_file()) {
                Some(path) => {
                    tracing::debug!(%subsystem, path = %path.display(), "loading site file");
                    PropertySet::load(&path)?
                }
                None if subsystem.is_mandatory() => {
                    return Err(not_found(conf_base, subsystem.site_file()));
                }
                None => {
                    let path = site_dir.join(subsystem.site_file());
                    tracing::warn!(%subsystem, path = %path.display(), "site file missing, starting empty");
                    PropertySet::load_or_empty(&path)?
                }
            };
            layers.push(ConfigLayer::new(subsystem, Some(overrides), defaults.take(subsystem)));
        }

        Ok(Self {
            site_dir,
            config: MultiSourceConfig::new(layers),
        })
    }

    /// Directory the site files were found in
    pub fn site_dir(&self) -> &Path {
        &self.site_dir
    }

    pub fn config(&self) -> &MultiSourceConfig {
        &self.config
    }

    pub fn layer(&self, subsystem: Subsystem) -> Option<&ConfigLayer> {
        self.config.layer(subsystem)
    }

    /// Set `name` in one subsystem's override, creating it if needed
    pub fn set(&mut self, subsystem: Subsystem, name: &str, value: &str) -> Result<String, ConfigError> {
        let layer = self
            .config
            .layer_mut(subsystem)
            .ok_or_else(|| ConfigError::NoOverride {
                subsystem: subsystem.to_string(),
            })?;
        layer.set(name, value)
    }

    /// See [`MultiSourceConfig::set_if_exist`]
    pub fn set_if_exist(
        &mut self,
        name: &str,
        value: &str,
    ) -> Result<(String, Option<Subsystem>), ConfigError> {
        self.config.set_if_exist(name, value)
    }

    /// See [`MultiSourceConfig::save`]; a failure can leave earlier
    /// subsystems saved and later ones untouched.
    pub fn save(&mut self, backup: bool) -> Result<(), ConfigError> {
        self.config.save(backup)
    }

    pub fn stat(&self) -> Vec<StatEntry> {
        self.config
            .layers()
            .iter()
            .map(|layer| StatEntry {
                subsystem: layer.subsystem(),
                site_file: layer
                    .overrides()
                    .and_then(PropertySet::path)
                    .map(|p| p.display().to_string()),
                site_exists: layer.overrides().is_some_and(PropertySet::exists_on_disk),
                default_source: layer.defaults().map(|d| d.origin().location.clone()),
            })
            .collect()
    }
}

impl ConfSource for HadoopConf {
    fn keys(&self) -> BTreeSet<String> {
        self.config.keys()
    }

    fn source_get(&self, name: &str) -> (String, Source) {
        self.config.source_get(name)
    }

    fn describe(&self) -> String {
        self.config.describe()
    }
}

/// Probe `globs` for directories holding a loadable site configuration.
///
/// Returns each distinct site directory found, in probe order.
pub fn discover_candidates(globs: &[&str]) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = Vec::new();
    for glob in globs {
        let dirs = match expand_dir_glob(glob) {
            Ok(dirs) => dirs,
            Err(e) => {
                tracing::debug!(glob, error = %e, "skipping probe pattern");
                continue;
            }
        };
        for dir in dirs {
            match HadoopConf::load(&dir, DefaultSets::default()) {
                Ok(conf) => {
                    if !found.iter().any(|p| p == conf.site_dir()) {
                        found.push(conf.site_dir().to_path_buf());
                    }
                }
                Err(e) => tracing::debug!(dir = %dir.display(), error = %e, "not a configuration directory"),
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const EMPTY: &str = "<configuration></configuration>";

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_context_precedence() {
        let mut s = settings();
        s.conf_dir = Some(PathBuf::from("/from/settings"));

        let ctx = ResolveContext::new(
            Some(PathBuf::from("/from/flag")),
            None,
            false,
            Some("/from/env".to_string()),
            &s,
        );
        assert_eq!(ctx.conf_dir, PathBuf::from("/from/flag"));
        assert_eq!(ctx.archive_dir, PathBuf::from("/from/flag"));
        assert!(ctx.backup);

        let ctx = ResolveContext::new(None, None, false, Some("/from/env".to_string()), &s);
        assert_eq!(ctx.conf_dir, PathBuf::from("/from/env"));

        let ctx = ResolveContext::new(None, None, false, Some(String::new()), &s);
        assert_eq!(ctx.conf_dir, PathBuf::from("/from/settings"));

        let ctx = ResolveContext::new(None, Some(PathBuf::from("/jars")), true, None, &settings());
        assert_eq!(ctx.conf_dir, PathBuf::from("."));
        assert_eq!(ctx.archive_dir, PathBuf::from("/jars"));
        assert!(!ctx.backup);
    }

    #[test]
    fn test_find_site_dir_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("conf")).unwrap();
        fs::write(dir.path().join("conf/core-site.xml"), EMPTY).unwrap();
        fs::write(dir.path().join("core-site.xml"), EMPTY).unwrap();

        assert_eq!(find_site_dir(dir.path()).unwrap(), dir.path().join("conf"));
    }

    #[test]
    fn test_missing_core_site() {
        let dir = TempDir::new().unwrap();
        let err = HadoopConf::load(dir.path(), DefaultSets::default()).unwrap_err();
        assert!(err.is_not_found());
        assert!(err.to_string().contains("core-site.xml"));
    }

    #[test]
    fn test_missing_hdfs_site() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("core-site.xml"), EMPTY).unwrap();

        let err = HadoopConf::load(dir.path(), DefaultSets::default()).unwrap_err();
        assert!(err.to_string().contains("hdfs-site.xml"));
    }

    #[test]
    fn test_site_files_split_across_directories() {
        let dir = TempDir::new().unwrap();
        let etc = dir.path().join("etc/hadoop");
        let conf_dir = dir.path().join("conf");
        fs::create_dir_all(&etc).unwrap();
        fs::create_dir_all(&conf_dir).unwrap();
        fs::write(etc.join("core-site.xml"), EMPTY).unwrap();
        fs::write(conf_dir.join("hdfs-site.xml"), EMPTY).unwrap();
        fs::write(
            conf_dir.join("mapred-site.xml"),
            "<configuration><property><name>mapreduce.framework.name</name>\
             <value>yarn</value></property></configuration>",
        )
        .unwrap();

        let conf = HadoopConf::load(dir.path(), DefaultSets::default()).unwrap();
        assert_eq!(conf.site_dir(), etc);

        let (value, src) = conf.source_get("mapreduce.framework.name");
        assert_eq!(value, "yarn");
        assert_eq!(PathBuf::from(&src.location), conf_dir.join("mapred-site.xml"));

        let stat = conf.stat();
        let site_of = |s: Subsystem| {
            stat.iter()
                .find(|e| e.subsystem == s)
                .and_then(|e| e.site_file.clone())
                .unwrap()
        };
        assert_eq!(site_of(Subsystem::Core), etc.join("core-site.xml").display().to_string());
        assert_eq!(site_of(Subsystem::Hdfs), conf_dir.join("hdfs-site.xml").display().to_string());
        assert_eq!(site_of(Subsystem::Yarn), etc.join("yarn-site.xml").display().to_string());
    }

    #[test]
    fn test_missing_hdfs_site_lists_every_candidate() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("core-site.xml"), EMPTY).unwrap();

        let err = HadoopConf::load(dir.path(), DefaultSets::default()).unwrap_err();
        assert!(err.is_not_found());
        let message = err.to_string();
        assert!(message.contains("etc/hadoop"));
        assert!(message.contains("conf"));
    }

    #[test]
    fn test_optional_site_files_start_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("core-site.xml"), EMPTY).unwrap();
        fs::write(dir.path().join("hdfs-site.xml"), EMPTY).unwrap();

        let conf = HadoopConf::load(dir.path(), DefaultSets::default()).unwrap();

        let stat = conf.stat();
        assert_eq!(stat.len(), 4);
        assert!(stat[0].site_exists);
        assert!(!stat[3].site_exists);
        assert_eq!(stat[3].subsystem, Subsystem::Yarn);
        assert!(stat.iter().all(|e| e.default_source.is_none()));
    }

    #[test]
    fn test_set_on_optional_layer_creates_file_on_save() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("core-site.xml"), EMPTY).unwrap();
        fs::write(dir.path().join("hdfs-site.xml"), EMPTY).unwrap();

        let mut conf = HadoopConf::load(dir.path(), DefaultSets::default()).unwrap();
        conf.save(false).unwrap();
        assert!(!dir.path().join("mapred-site.xml").exists());

        conf.set(Subsystem::Mapred, "mapreduce.framework.name", "yarn").unwrap();
        conf.save(false).unwrap();
        assert!(dir.path().join("mapred-site.xml").exists());

        let reloaded = HadoopConf::load(dir.path(), DefaultSets::default()).unwrap();
        let (value, src) = reloaded.source_get("mapreduce.framework.name");
        assert_eq!(value, "yarn");
        assert_eq!(src.file_name(), "mapred-site.xml");
    }

    #[test]
    fn test_discover_candidates() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("process/1-hdfs");
        fs::create_dir_all(&good).unwrap();
        fs::create_dir_all(dir.path().join("process/2-empty")).unwrap();
        fs::write(good.join("core-site.xml"), EMPTY).unwrap();
        fs::write(good.join("hdfs-site.xml"), EMPTY).unwrap();

        let glob = dir.path().join("process/*").to_string_lossy().to_string();
        let found = discover_candidates(&[glob.as_str()]);

        assert_eq!(found, vec![good]);
    }
}
