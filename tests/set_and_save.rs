//! Mutation and Save Tests
//!
//! `set_if_exist` routing, save round trips through the site files, and
//! backups.

use std::fs;

use hadoopconf::{ConfSource, HadoopConf, PropertySet, ResolveContext, Settings, Subsystem};
use hadoopconf_fixtures::FakeInstall;

fn resolve(install: &FakeInstall) -> HadoopConf {
    let ctx = ResolveContext::new(
        Some(install.root().to_path_buf()),
        None,
        false,
        None,
        &Settings::default(),
    );
    HadoopConf::resolve(&ctx).unwrap()
}

#[test]
fn test_set_if_exist_writes_to_owning_subsystem() {
    let install = FakeInstall::hadoop2().unwrap();
    let mut conf = resolve(&install);

    let (old, subsystem) = conf.set_if_exist("dfs.replication", "2").unwrap();
    assert_eq!(old, "3");
    assert_eq!(subsystem, Some(Subsystem::Hdfs));
    conf.save(false).unwrap();

    let hdfs_site = PropertySet::load(&install.site_dir().join("hdfs-site.xml")).unwrap();
    assert_eq!(hdfs_site.lookup("dfs.replication"), Some("2"));
    let core_site = PropertySet::load(&install.site_dir().join("core-site.xml")).unwrap();
    assert!(!core_site.contains("dfs.replication"));

    let reloaded = resolve(&install);
    let (value, source) = reloaded.source_get("dfs.replication");
    assert_eq!(value, "2");
    assert_eq!(source.file_name(), "hdfs-site.xml");
}

#[test]
fn test_set_if_exist_never_creates_keys() {
    let install = FakeInstall::hadoop2().unwrap();
    let core_before = fs::read(install.site_dir().join("core-site.xml")).unwrap();
    let mut conf = resolve(&install);

    let (old, subsystem) = conf.set_if_exist("z", "1").unwrap();
    assert_eq!(old, "");
    assert_eq!(subsystem, None);
    assert!(!conf.config().is_dirty());
    assert!(!conf.keys().contains("z"));

    conf.save(true).unwrap();
    assert_eq!(fs::read(install.site_dir().join("core-site.xml")).unwrap(), core_before);
    assert!(install.backups_of("core-site.xml").unwrap().is_empty());
}

#[test]
fn test_set_if_exist_skips_empty_valued_keys() {
    let install = FakeInstall::hadoop2().unwrap();
    let mut conf = resolve(&install);

    // seeded with an empty value for secure clusters
    assert!(conf.keys().contains("dfs.namenode.keytab.file"));
    let (_, subsystem) = conf
        .set_if_exist("dfs.namenode.keytab.file", "/etc/hdfs.keytab")
        .unwrap();
    assert_eq!(subsystem, None);

    conf.set(Subsystem::Hdfs, "dfs.namenode.keytab.file", "/etc/hdfs.keytab")
        .unwrap();
    assert_eq!(conf.get("dfs.namenode.keytab.file"), "/etc/hdfs.keytab");
}

#[test]
fn test_override_existing_core_value() {
    let install = FakeInstall::hadoop2().unwrap();
    let mut conf = resolve(&install);

    let (old, subsystem) = conf.set_if_exist("fs.defaultFS", "hdfs://other:8020").unwrap();
    assert_eq!(old, "hdfs://nn:8020");
    assert_eq!(subsystem, Some(Subsystem::Core));
    conf.save(false).unwrap();

    assert_eq!(resolve(&install).get("fs.defaultFS"), "hdfs://other:8020");
}

#[test]
fn test_save_with_backup_keeps_original() {
    let install = FakeInstall::hadoop1().unwrap();
    let original = fs::read_to_string(install.site_dir().join("hdfs-site.xml")).unwrap();
    let mut conf = resolve(&install);

    conf.set_if_exist("dfs.replication", "5").unwrap();
    conf.save(true).unwrap();

    let backups = install.backups_of("hdfs-site.xml").unwrap();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(&backups[0]).unwrap(), original);
    assert!(install.backups_of("core-site.xml").unwrap().is_empty());
}

#[test]
fn test_saved_file_is_canonical_xml() {
    let install = FakeInstall::hadoop2().unwrap();
    let mut conf = resolve(&install);

    conf.set(Subsystem::Yarn, "yarn.resourcemanager.hostname", "rm.example.com")
        .unwrap();
    conf.save(false).unwrap();

    let text = fs::read_to_string(install.site_dir().join("yarn-site.xml")).unwrap();
    assert!(text.starts_with("<?xml version=\"1.0\"?>\n<configuration>"));
    assert!(text.contains("<name>yarn.resourcemanager.hostname</name>"));
    assert!(text.contains("<value>rm.example.com</value>"));
    assert!(!text.contains("<description"));
}

#[test]
fn test_second_save_is_noop() {
    let install = FakeInstall::hadoop2().unwrap();
    let mut conf = resolve(&install);

    conf.set_if_exist("dfs.blocksize", "268435456").unwrap();
    conf.save(false).unwrap();
    assert!(!conf.config().is_dirty());

    fs::remove_file(install.site_dir().join("hdfs-site.xml")).unwrap();
    conf.save(true).unwrap();
    assert!(!install.site_dir().join("hdfs-site.xml").exists());
}

#[cfg(unix)]
#[test]
fn test_save_error_stops_sequence() {
    use std::os::unix::fs::PermissionsExt;

    let install = FakeInstall::hadoop2().unwrap();
    let mut conf = resolve(&install);
    conf.set_if_exist("fs.defaultFS", "hdfs://other:8020").unwrap();
    conf.set(Subsystem::Yarn, "yarn.x", "1").unwrap();

    let site_dir = install.site_dir();
    let mut perms = fs::metadata(&site_dir).unwrap().permissions();
    perms.set_mode(0o555);
    fs::set_permissions(&site_dir, perms.clone()).unwrap();

    let result = conf.save(false);

    perms.set_mode(0o755);
    fs::set_permissions(&site_dir, perms).unwrap();

    // root ignores directory permissions
    if let Err(err) = result {
        assert!(err.to_string().contains("core-site.xml"));
        assert!(!site_dir.join("yarn-site.xml").exists());
        assert!(conf.config().is_dirty());
    }
}
