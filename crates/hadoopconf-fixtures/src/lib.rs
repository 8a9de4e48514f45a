//! Fake Hadoop installations for tests
//!
//! Each install lives in its own `TempDir` and is removed on drop. Jars are
//! real zip files carrying `*-default.xml` members, so the archive locator
//! runs against the same bytes it would see on a cluster.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Render `(name, value)` pairs as a `configuration` document
pub fn configuration_xml(props: &[(&str, &str)]) -> String {
    let mut xml = String::from("<?xml version=\"1.0\"?>\n<configuration>\n");
    for (name, value) in props {
        xml.push_str(&format!(
            "  <property>\n    <name>{}</name>\n    <value>{}</value>\n  </property>\n",
            name, value
        ));
    }
    xml.push_str("</configuration>\n");
    xml
}

/// Write a zip archive with the given `(member, contents)` entries
pub fn write_jar(path: &Path, members: &[(&str, &str)]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file("META-INF/MANIFEST.MF", options).map_err(io::Error::other)?;
    zip.write_all(b"Manifest-Version: 1.0\n")?;
    for (name, body) in members {
        zip.start_file(*name, options).map_err(io::Error::other)?;
        zip.write_all(body.as_bytes())?;
    }
    zip.finish().map_err(io::Error::other)?;
    Ok(())
}

pub const CORE_DEFAULT: &[(&str, &str)] = &[
    ("hadoop.tmp.dir", "/tmp/default"),
    ("fs.defaultFS", "file:///"),
    ("io.file.buffer.size", "4096"),
];

pub const HDFS_DEFAULT: &[(&str, &str)] = &[
    ("dfs.replication", "3"),
    ("dfs.namenode.name.dir", "file://${hadoop.tmp.dir}/dfs/name"),
    ("dfs.blocksize", "134217728"),
];

pub const MAPRED_DEFAULT: &[(&str, &str)] = &[
    ("mapreduce.framework.name", "local"),
    ("mapreduce.job.maps", "2"),
];

pub const YARN_DEFAULT: &[(&str, &str)] = &[
    ("yarn.resourcemanager.hostname", "0.0.0.0"),
    ("yarn.nodemanager.resource.memory-mb", "8192"),
];

pub const HADOOP_ENV: &str = "\
# Set Hadoop-specific environment variables here.

# The java implementation to use.
export JAVA_HOME=${JAVA_HOME}

#export JSVC_HOME=${JSVC_HOME}

export HADOOP_OPTS=\"$HADOOP_OPTS -Djava.net.preferIPv4Stack=true\"
export HADOOP_CLIENT_OPTS=\"-Xmx512m $HADOOP_CLIENT_OPTS\"
";

pub const YARN_ENV: &str = "\
export YARN_OPTS=\"$YARN_OPTS -Dyarn.policy.file=hadoop-policy.xml\"
# export YARN_RESOURCEMANAGER_HEAPSIZE=1000
";

/// Installation layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Hadoop 1: one `hadoop-core` jar at the root, site files in `conf/`
    Hadoop1,
    /// Hadoop 2: per-project jars under `share/hadoop`, site files in
    /// `etc/hadoop/`
    Hadoop2,
}

/// A fake install rooted in a temporary directory
pub struct FakeInstall {
    dir: TempDir,
    layout: Layout,
}

impl FakeInstall {
    /// Hadoop 2 install with all four defaults and the mandatory site files
    pub fn hadoop2() -> io::Result<Self> {
        let install = Self {
            dir: TempDir::new()?,
            layout: Layout::Hadoop2,
        };
        let share = install.root().join("share/hadoop");
        write_jar(
            &share.join("common/hadoop-common-2.2.0.jar"),
            &[("core-default.xml", &configuration_xml(CORE_DEFAULT))],
        )?;
        write_jar(&share.join("common/hadoop-common-2.2.0-beta-tests.jar"), &[])?;
        write_jar(
            &share.join("hdfs/hadoop-hdfs-2.2.0.jar"),
            &[("hdfs-default.xml", &configuration_xml(HDFS_DEFAULT))],
        )?;
        write_jar(
            &share.join("mapreduce/hadoop-mapreduce-client-core-2.2.0.jar"),
            &[("mapred-default.xml", &configuration_xml(MAPRED_DEFAULT))],
        )?;
        write_jar(
            &share.join("yarn/hadoop-yarn-common-2.2.0.jar"),
            &[("yarn-default.xml", &configuration_xml(YARN_DEFAULT))],
        )?;

        install.write_site("core-site.xml", &[("fs.defaultFS", "hdfs://nn:8020")])?;
        install.write_site("hdfs-site.xml", &[])?;
        install.write_env("hadoop-env.sh", HADOOP_ENV)?;
        install.write_env("yarn-env.sh", YARN_ENV)?;
        Ok(install)
    }

    /// Hadoop 1 install: a single `hadoop-core` jar carrying the core, hdfs
    /// and mapred defaults; no yarn.
    pub fn hadoop1() -> io::Result<Self> {
        let install = Self {
            dir: TempDir::new()?,
            layout: Layout::Hadoop1,
        };
        write_jar(
            &install.root().join("hadoop-core-1.2.1.jar"),
            &[
                ("core-default.xml", &configuration_xml(CORE_DEFAULT)),
                ("hdfs-default.xml", &configuration_xml(HDFS_DEFAULT)),
                ("mapred-default.xml", &configuration_xml(MAPRED_DEFAULT)),
            ],
        )?;

        install.write_site("core-site.xml", &[])?;
        install.write_site("hdfs-site.xml", &[("dfs.replication", "1")])?;
        install.write_site("mapred-site.xml", &[])?;
        install.write_env("hadoop-env.sh", HADOOP_ENV)?;
        Ok(install)
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Directory holding the site and env files
    pub fn site_dir(&self) -> PathBuf {
        match self.layout {
            Layout::Hadoop1 => self.root().join("conf"),
            Layout::Hadoop2 => self.root().join("etc/hadoop"),
        }
    }

    /// (Re)write a site file with the given properties
    pub fn write_site(&self, file: &str, props: &[(&str, &str)]) -> io::Result<PathBuf> {
        let dir = self.site_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(file);
        fs::write(&path, configuration_xml(props))?;
        Ok(path)
    }

    /// (Re)write an env file in the site directory
    pub fn write_env(&self, file: &str, contents: &str) -> io::Result<PathBuf> {
        let dir = self.site_dir();
        fs::create_dir_all(&dir)?;
        let path = dir.join(file);
        fs::write(&path, contents)?;
        Ok(path)
    }

    /// Files in the site directory whose names start with `name.` and are
    /// not `name` itself (backups)
    pub fn backups_of(&self, name: &str) -> io::Result<Vec<PathBuf>> {
        let prefix = format!("{}.", name);
        let mut found: Vec<PathBuf> = fs::read_dir(self.site_dir())?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect();
        found.sort();
        Ok(found)
    }
}
