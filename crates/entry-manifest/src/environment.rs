//! [`ManifestEnvironment`]: an environment manifest served to the registry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use entry_registry::{
    DeclaredEntryPoint, ExtensionSource, InstalledPackages, PackageIndex, SourceError,
};
use tracing::debug;

use crate::error::Result;
use crate::manifest::EnvironmentManifest;
use crate::target::EntryPointTarget;

/// Reference to one declared entry point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPointHandle {
    pub group: String,
    pub name: String,
    /// Name of the owning package.
    pub package: String,
    /// Target reference as written in the manifest.
    pub target: String,
}

/// An entry point resolved to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedEntryPoint {
    pub group: String,
    pub name: String,
    pub package: String,
    pub target: EntryPointTarget,
}

type Declared = DeclaredEntryPoint<EntryPointHandle>;

/// Entry points of every package, grouped. Built once and reused until
/// [`ExtensionSource::refresh`].
#[derive(Debug, Default)]
struct WorkingSet {
    groups: HashMap<String, Vec<Declared>>,
}

impl WorkingSet {
    fn build(manifest: &EnvironmentManifest) -> Result<Self> {
        let mut groups: HashMap<String, Vec<Declared>> = HashMap::new();
        for package in &manifest.packages {
            let requirements = package.requirements()?;
            let identity = package.identity();
            for group in package.entry_points.keys() {
                let declared = groups.entry(group.clone()).or_default();
                for (name, target) in package.entry_points(group) {
                    declared.push(DeclaredEntryPoint {
                        name: name.to_string(),
                        package: identity.clone(),
                        requirements: requirements.clone(),
                        handle: EntryPointHandle {
                            group: group.clone(),
                            name: name.to_string(),
                            package: package.name.clone(),
                            target: target.to_string(),
                        },
                    });
                }
            }
        }
        Ok(Self { groups })
    }
}

#[derive(Debug)]
enum Backing {
    /// Re-read from disk on every snapshot and working-set rebuild.
    File(PathBuf),
    Fixed(Arc<EnvironmentManifest>),
}

/// An environment described by an [`EnvironmentManifest`].
///
/// Acts as both the [`PackageIndex`] and the [`ExtensionSource`] of a
/// registry. When file-backed, every snapshot reads the file again, while
/// enumeration uses a working set parsed once and dropped by `refresh`.
#[derive(Debug)]
pub struct ManifestEnvironment {
    backing: Backing,
    working_set: Mutex<Option<Arc<WorkingSet>>>,
}

impl ManifestEnvironment {
    /// An environment read from `path`.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            backing: Backing::File(path.into()),
            working_set: Mutex::new(None),
        }
    }

    /// An environment fixed to an already parsed manifest.
    pub fn from_manifest(manifest: EnvironmentManifest) -> Self {
        Self {
            backing: Backing::Fixed(Arc::new(manifest)),
            working_set: Mutex::new(None),
        }
    }

    /// Path of the manifest file, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::File(path) => Some(path.as_path()),
            Backing::Fixed(_) => None,
        }
    }

    /// Current manifest contents.
    pub fn manifest(&self) -> Result<Arc<EnvironmentManifest>> {
        match &self.backing {
            Backing::File(path) => Ok(Arc::new(EnvironmentManifest::from_path(path)?)),
            Backing::Fixed(manifest) => Ok(Arc::clone(manifest)),
        }
    }

    /// Every group with declared entry points, sorted.
    pub fn groups(&self) -> Result<Vec<String>> {
        Ok(self.manifest()?.groups())
    }

    fn working_set(&self) -> Result<Arc<WorkingSet>> {
        let mut cached = self.working_set.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(working_set) = cached.as_ref() {
            return Ok(Arc::clone(working_set));
        }
        let working_set = Arc::new(WorkingSet::build(&*self.manifest()?)?);
        debug!(groups = working_set.groups.len(), "Built entry point working set");
        *cached = Some(Arc::clone(&working_set));
        Ok(working_set)
    }
}

impl PackageIndex for ManifestEnvironment {
    fn snapshot(&self) -> std::result::Result<InstalledPackages, SourceError> {
        Ok(self.manifest()?.installed())
    }
}

impl ExtensionSource for ManifestEnvironment {
    type Handle = EntryPointHandle;
    type Loaded = LoadedEntryPoint;

    fn enumerate(&self, group: &str) -> std::result::Result<Vec<Declared>, SourceError> {
        Ok(self
            .working_set()?
            .groups
            .get(group)
            .cloned()
            .unwrap_or_default())
    }

    fn load(&self, handle: &EntryPointHandle) -> std::result::Result<LoadedEntryPoint, SourceError> {
        let target = EntryPointTarget::parse(&handle.target)?;
        Ok(LoadedEntryPoint {
            group: handle.group.clone(),
            name: handle.name.clone(),
            package: handle.package.clone(),
            target,
        })
    }

    fn refresh(&self) {
        *self.working_set.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entry_registry::EntryPointRegistry;

    fn environment() -> ManifestEnvironment {
        let manifest = EnvironmentManifest::from_toml(
            r#"
[[package]]
name = "acme-nodes"
version = "1.2.0"
requires = ["core-lib>=2.0"]

[package.entry_points.nodes]
"acme.feed" = "acme_nodes.feed:FeedNode"

[[package]]
name = "core-lib"
version = "2.1"

[package.entry_points.nodes]
"core.echo" = "core_lib.echo:EchoNode"
"#,
        )
        .unwrap();
        ManifestEnvironment::from_manifest(manifest)
    }

    #[test]
    fn test_enumerate_in_package_order() {
        let env = environment();
        let declared = env.enumerate("nodes").unwrap();
        let names: Vec<_> = declared.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["acme.feed", "core.echo"]);
        assert_eq!(declared[0].package, "acme-nodes-1.2.0");
        assert_eq!(declared[0].requirements.len(), 1);
        assert!(env.enumerate("api").unwrap().is_empty());
    }

    #[test]
    fn test_working_set_is_reused_until_refresh() {
        let env = environment();
        let first = env.working_set().unwrap();
        assert!(Arc::ptr_eq(&first, &env.working_set().unwrap()));

        env.refresh();
        assert!(!Arc::ptr_eq(&first, &env.working_set().unwrap()));
    }

    #[test]
    fn test_load_resolves_target() {
        let env = environment();
        let handle = env.enumerate("nodes").unwrap().remove(1).handle;
        let loaded = env.load(&handle).unwrap();
        assert_eq!(loaded.package, "core-lib");
        assert_eq!(loaded.target.module, "core_lib.echo");
        assert_eq!(loaded.target.attr.as_deref(), Some("EchoNode"));
    }

    #[test]
    fn test_load_rejects_malformed_handle() {
        let env = environment();
        let handle = EntryPointHandle {
            group: "nodes".to_string(),
            name: "bad".to_string(),
            package: "x".to_string(),
            target: "::".to_string(),
        };
        let err = env.load(&handle).unwrap_err();
        assert!(err.to_string().starts_with("invalid entry point target"));
    }

    #[test]
    fn test_registry_over_fixed_manifest() {
        let registry = EntryPointRegistry::new(environment(), environment());
        let group = registry.map("nodes").unwrap();
        assert!(group.get("acme.feed").unwrap().is_loadable());
        assert!(group.get("core.echo").unwrap().is_loadable());
        assert_eq!(
            registry.load("nodes", "acme.feed").unwrap().target.to_string(),
            "acme_nodes.feed:FeedNode"
        );
    }
}
