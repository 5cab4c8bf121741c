//! File-backed environment tests.

use std::fs;
use std::sync::Arc;

use entry_manifest::{ENVIRONMENT_FILENAME, ManifestEnvironment};
use entry_registry::{EntryPointRegistry, Error as RegistryError, ExtensionSource, PackageIndex};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const BEFORE_UPGRADE: &str = r#"
[[package]]
name = "acme-nodes"
version = "1.2.0"
requires = ["core-lib>=2.0"]

[package.entry_points.nodes]
"acme.feed" = "acme_nodes.feed:FeedNode"
"acme.miner" = "acme_nodes.miner:MinerNode"

[[package]]
name = "core-lib"
version = "1.9"
"#;

const AFTER_UPGRADE: &str = r#"
[[package]]
name = "acme-nodes"
version = "1.2.0"
requires = ["core-lib>=2.0"]

[package.entry_points.nodes]
"acme.feed" = "acme_nodes.feed:FeedNode"
"acme.miner" = "acme_nodes.miner:MinerNode"

[[package]]
name = "core-lib"
version = "2.0"

[package.entry_points.api]
"core.status" = "core_lib.api:status"
"#;

fn write_env(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(ENVIRONMENT_FILENAME);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_snapshot_reads_current_file() {
    let dir = TempDir::new().unwrap();
    let path = write_env(&dir, BEFORE_UPGRADE);
    let env = ManifestEnvironment::from_path(&path);

    assert_eq!(env.snapshot().unwrap().get("core-lib").unwrap().version, "1.9");
    write_env(&dir, AFTER_UPGRADE);
    assert_eq!(env.snapshot().unwrap().get("core-lib").unwrap().version, "2.0");
}

#[test]
fn test_enumeration_uses_working_set_until_refresh() {
    let dir = TempDir::new().unwrap();
    let path = write_env(&dir, BEFORE_UPGRADE);
    let env = ManifestEnvironment::from_path(&path);

    assert!(env.enumerate("api").unwrap().is_empty());
    write_env(&dir, AFTER_UPGRADE);
    assert!(env.enumerate("api").unwrap().is_empty());

    env.refresh();
    assert_eq!(env.enumerate("api").unwrap().len(), 1);
}

#[test]
fn test_registry_picks_up_upgrade_after_invalidate() {
    let dir = TempDir::new().unwrap();
    let path = write_env(&dir, BEFORE_UPGRADE);
    let env = Arc::new(ManifestEnvironment::from_path(&path));
    let registry = EntryPointRegistry::new(Arc::clone(&env), env);

    let err = registry.load("nodes", "acme.miner").unwrap_err();
    assert_eq!(
        err.to_string(),
        "entry point nodes:acme.miner not loadable: core-lib==1.9 not compatible with core-lib>=2.0"
    );

    write_env(&dir, AFTER_UPGRADE);
    assert!(registry.load("nodes", "acme.miner").is_err());
    assert!(registry.list_names("api").unwrap().is_empty());

    registry.invalidate();
    let loaded = registry.load("nodes", "acme.miner").unwrap();
    assert_eq!(loaded.target.to_string(), "acme_nodes.miner:MinerNode");
    assert_eq!(registry.list_names("api").unwrap(), ["core.status"]);
}

#[test]
fn test_missing_file_surfaces_as_index_error() {
    let dir = TempDir::new().unwrap();
    let env = Arc::new(ManifestEnvironment::from_path(dir.path().join("missing.toml")));
    let registry = EntryPointRegistry::new(Arc::clone(&env), env);

    let err = registry.map("nodes").unwrap_err();
    assert!(matches!(err, RegistryError::Index(_)));
    assert!(err.to_string().starts_with("environment manifest not found"));
    assert!(!registry.is_cached("nodes"));
}

#[test]
fn test_groups_lists_declared_groups() {
    let dir = TempDir::new().unwrap();
    let env = ManifestEnvironment::from_path(write_env(&dir, AFTER_UPGRADE));
    assert_eq!(env.groups().unwrap(), ["api", "nodes"]);
    assert!(env.path().is_some());
}
