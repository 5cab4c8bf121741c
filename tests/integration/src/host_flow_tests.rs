//! End-to-end host scenarios
//!
//! These tests exercise the flow a host application follows: initialize the
//! well-known groups at startup, load what is loadable, install a package at
//! runtime, invalidate and pick up the change.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use entry_manifest::{ENVIRONMENT_FILENAME, ManifestEnvironment};
use entry_registry::{EntryPointRegistry, Error, groups};
use entry_test_utils::{FakeEntry, FakeIndex, FakeSource};
use tempfile::TempDir;

const BASE_ENVIRONMENT: &str = r#"
[[package]]
name = "host-core"
version = "0.9.2"

[package.entry_points.nodes]
"host.echo" = "host_core.nodes:Echo"

[package.entry_points.prototypes]
"host.defaults" = "host_core.prototypes"

[[package]]
name = "feeds-extra"
version = "2.3.0"
requires = ["host-core>=0.9,<1", "http-client~=3.1"]

[package.entry_points.nodes]
"feeds.rss" = "feeds_extra.rss:RssFeed"
"feeds.atom" = "feeds_extra.atom:AtomFeed"

[package.entry_points."nodes.validators"]
"feeds.rss" = "feeds_extra.validators:validate_rss"
"#;

const HTTP_CLIENT: &str = r#"
[[package]]
name = "http-client"
version = "3.1.4"
"#;

fn write_environment(dir: &Path, extra: &str) -> PathBuf {
    let path = dir.join(ENVIRONMENT_FILENAME);
    fs::write(&path, format!("{BASE_ENVIRONMENT}{extra}")).unwrap();
    path
}

fn open(path: &Path) -> EntryPointRegistry<Arc<ManifestEnvironment>, Arc<ManifestEnvironment>> {
    let env = Arc::new(ManifestEnvironment::from_path(path));
    EntryPointRegistry::new(Arc::clone(&env), env)
}

#[test]
fn test_startup_initializes_well_known_groups() {
    let temp = TempDir::new().unwrap();
    let registry = open(&write_environment(temp.path(), ""));

    for group in groups::ALL {
        registry.ensure_group(group).unwrap();
    }

    assert_eq!(registry.cached_groups().len(), groups::ALL.len());
    assert!(registry.map(groups::WEBUI).unwrap().is_empty());
    assert_eq!(
        registry.list_names(groups::NODES).unwrap(),
        ["host.echo", "feeds.rss", "feeds.atom"]
    );
}

#[test]
fn test_missing_dependency_blocks_only_its_package() {
    let temp = TempDir::new().unwrap();
    let registry = open(&write_environment(temp.path(), ""));

    let echo = registry.load(groups::NODES, "host.echo").unwrap();
    assert_eq!(echo.target.to_string(), "host_core.nodes:Echo");
    assert_eq!(
        registry.load(groups::PROTOTYPES, "host.defaults").unwrap().target.module,
        "host_core.prototypes"
    );

    for name in ["feeds.rss", "feeds.atom"] {
        let err = registry.load(groups::NODES, name).unwrap_err();
        assert!(matches!(err, Error::EntryPointNotLoadable { .. }));
        let conflicts: Vec<String> = err.conflicts().iter().map(ToString::to_string).collect();
        assert_eq!(conflicts, ["http-client not installed"]);
    }

    let err = registry.load(groups::NODES_VALIDATORS, "feeds.rss").unwrap_err();
    assert!(err.to_string().contains("http-client not installed"));
}

#[test]
fn test_runtime_install_then_invalidate() {
    let temp = TempDir::new().unwrap();
    let registry = open(&write_environment(temp.path(), ""));
    assert!(registry.load(groups::NODES, "feeds.rss").is_err());

    write_environment(temp.path(), HTTP_CLIENT);
    registry.invalidate();

    let rss = registry.load(groups::NODES, "feeds.rss").unwrap();
    assert_eq!(rss.package, "feeds-extra");
    assert_eq!(rss.target.attr.as_deref(), Some("RssFeed"));
    assert!(registry.map(groups::NODES).unwrap().not_loadable().next().is_none());
}

#[test]
fn test_incompatible_upgrade_reported_after_invalidate() {
    let temp = TempDir::new().unwrap();
    let registry = open(&write_environment(temp.path(), HTTP_CLIENT));
    assert!(registry.load(groups::NODES, "feeds.atom").is_ok());

    let upgraded = BASE_ENVIRONMENT.replace("0.9.2", "1.0.0");
    fs::write(temp.path().join(ENVIRONMENT_FILENAME), format!("{upgraded}{HTTP_CLIENT}")).unwrap();
    registry.invalidate();

    let err = registry.load(groups::NODES, "feeds.atom").unwrap_err();
    assert_eq!(
        err.to_string(),
        "entry point nodes:feeds.atom not loadable: \
         host-core==1.0.0 not compatible with host-core<1,>=0.9"
    );
}

#[test]
fn test_shared_registry_across_threads() {
    let temp = TempDir::new().unwrap();
    let registry = Arc::new(open(&write_environment(temp.path(), HTTP_CLIENT)));

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let name = if i % 2 == 0 { "feeds.rss" } else { "host.echo" };
                registry.load(groups::NODES, name).unwrap().name
            })
        })
        .collect();

    let mut loaded: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    loaded.sort();
    assert_eq!(loaded, ["feeds.rss", "feeds.rss", "host.echo", "host.echo"]);
    assert_eq!(registry.cached_groups(), [groups::NODES]);
}

#[test]
fn test_fake_collaborators_match_manifest_semantics() {
    let source = FakeSource::new()
        .with_entry(groups::API, FakeEntry::new("status", "api-1.0").requires(&["host-core>=1"]));
    let index = FakeIndex::new().with_package("host-core", "0.9.2");
    let registry = EntryPointRegistry::new(source, index);

    let err = registry.load(groups::API, "status").unwrap_err();
    assert_eq!(
        err.to_string(),
        "entry point api:status not loadable: host-core==0.9.2 not compatible with host-core>=1"
    );

    registry.index().install("host-core", "1.0");
    registry.invalidate();
    assert_eq!(registry.load(groups::API, "status").unwrap(), "api-1.0:status");
}
