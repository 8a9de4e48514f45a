//! Static registry of cluster subsystems
//!
//! Each subsystem knows its site file, the default file packaged inside its
//! archive, which archive names carry that default and where to look for
//! them. Archive base `B` below is the directory passed to the locator.

use serde::Serialize;
use std::fmt;
use std::path::Path;

/// One logical configuration subsystem, in precedence order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Subsystem {
    Core,
    Hdfs,
    Mapred,
    Yarn,
}

/// Properties used by secure HDFS deployments that the packaged
/// hdfs-default.xml does not list.
const HDFS_SECURE_ROLES: &[&str] = &["namenode", "namenode.secondary", "datanode"];
const HDFS_SECURE_SUFFIXES: &[&str] = &["keytab.file", "kerberos.principal", "https.principal"];

impl Subsystem {
    pub const ALL: [Subsystem; 4] = [
        Subsystem::Core,
        Subsystem::Hdfs,
        Subsystem::Mapred,
        Subsystem::Yarn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Subsystem::Core => "core",
            Subsystem::Hdfs => "hdfs",
            Subsystem::Mapred => "mapred",
            Subsystem::Yarn => "yarn",
        }
    }

    /// Site override file name, e.g. `core-site.xml`
    pub fn site_file(self) -> &'static str {
        match self {
            Subsystem::Core => "core-site.xml",
            Subsystem::Hdfs => "hdfs-site.xml",
            Subsystem::Mapred => "mapred-site.xml",
            Subsystem::Yarn => "yarn-site.xml",
        }
    }

    /// Archive member holding the defaults, e.g. `core-default.xml`
    pub fn default_file(self) -> &'static str {
        match self {
            Subsystem::Core => "core-default.xml",
            Subsystem::Hdfs => "hdfs-default.xml",
            Subsystem::Mapred => "mapred-default.xml",
            Subsystem::Yarn => "yarn-default.xml",
        }
    }

    /// Archive file name patterns (regular expressions, whole-name match)
    pub fn archive_patterns(self) -> &'static [&'static str] {
        match self {
            Subsystem::Core => &[
                r"hadoop-(common|core)-[0-9.]+-?([a-zA-Z0-9._]+)?\.jar",
                r"hadoop-common\.jar",
            ],
            Subsystem::Hdfs => &[r"hadoop-(hdfs|core)-[0-9.]+-?([a-zA-Z0-9._]+)?\.jar"],
            Subsystem::Mapred => &[r"hadoop-(mapreduce-client-)?core-[0-9.]+-?([a-zA-Z0-9._]+)?\.jar"],
            Subsystem::Yarn => &[r"hadoop-yarn-common-[0-9.]+-?([a-zA-Z0-9._]+)?\.jar"],
        }
    }

    /// Ordered directory globs searched for this subsystem's archive
    pub fn archive_dirs(self, base: &Path) -> Vec<String> {
        let under = |rel: &str| base.join(rel).to_string_lossy().into_owned();
        let base = base.to_string_lossy().into_owned();
        match self {
            Subsystem::Core => vec![
                base,
                under("share/hadoop/common"),
                "/usr/lib/hadoop".to_string(),
                "/share/hadoop/common".to_string(),
            ],
            Subsystem::Hdfs => vec![
                base,
                under("share/hadoop/hdfs"),
                under("hadoop-hdfs"),
                "/share/hadoop/hdfs".to_string(),
                "/usr/lib/hadoop-hdfs".to_string(),
            ],
            Subsystem::Mapred => vec![
                base,
                under("hadoop-0.20-mapreduce"),
                under("hadoop-mapreduce"),
                under("share/hadoop/mapreduce"),
                "/share/hadoop/mapreduce".to_string(),
                "/usr/lib/hadoop-0.20-mapreduce".to_string(),
                "/usr/lib/hadoop-mapreduce".to_string(),
            ],
            Subsystem::Yarn => vec![
                base,
                under("share/hadoop/yarn"),
                under("hadoop-yarn"),
                "/usr/lib/hadoop-yarn".to_string(),
                "/share/hadoop/yarn".to_string(),
            ],
        }
    }

    /// Mandatory subsystems abort resolution when their default archive or
    /// site file is missing; optional ones degrade to an absent layer.
    pub fn is_mandatory(self) -> bool {
        matches!(self, Subsystem::Core | Subsystem::Hdfs)
    }

    /// Empty-valued keys added to the packaged defaults so they show up in
    /// key listings.
    pub fn extra_default_keys(self) -> Vec<String> {
        match self {
            Subsystem::Hdfs => {
                let mut keys: Vec<String> = HDFS_SECURE_ROLES
                    .iter()
                    .flat_map(|role| {
                        HDFS_SECURE_SUFFIXES
                            .iter()
                            .map(move |suffix| format!("dfs.{}.{}", role, suffix))
                    })
                    .collect();
                keys.push("dfs.datanode.hostname".to_string());
                keys
            }
            _ => Vec::new(),
        }
    }
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
