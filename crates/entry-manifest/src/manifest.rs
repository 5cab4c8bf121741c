//! Environment manifest parsing.
//!
//! An environment manifest describes the installed packages a registry sees.
//! The canonical filename is [`ENVIRONMENT_FILENAME`](crate::ENVIRONMENT_FILENAME)
//! (`environment.toml`).
//!
//! # Example TOML
//!
//! ```toml
//! [[package]]
//! name = "acme-nodes"
//! version = "1.2.0"
//! requires = ["core-lib>=2.0", "helpers"]
//!
//! [package.entry_points.nodes]
//! "acme.feed" = "acme_nodes.feed:FeedNode"
//! "acme.miner" = "acme_nodes.miner:MinerNode"
//!
//! [[package]]
//! name = "core-lib"
//! version = "2.1"
//! ```
//!
//! Entry points keep their declaration order within a group.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use entry_registry::{InstalledPackageRecord, InstalledPackages, PackageRequirement};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::target::EntryPointTarget;

/// Every installed package of one environment.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EnvironmentManifest {
    #[serde(default, rename = "package")]
    pub packages: Vec<PackageManifest>,
}

/// One installed package.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PackageManifest {
    /// Package name as referenced by requirement strings.
    pub name: String,
    /// Installed version. Versions that do not parse fail every constraint.
    pub version: String,
    /// Requirement strings, e.g. `core-lib>=2.0,<3`.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Entry points by group, each mapping entry-point name to its target.
    #[serde(default)]
    pub entry_points: BTreeMap<String, toml::Table>,
}

impl PackageManifest {
    /// Identity shared by every entry point this package declares.
    pub fn identity(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    pub fn requirements(&self) -> Result<Vec<PackageRequirement>> {
        self.requires
            .iter()
            .map(|spec| {
                PackageRequirement::parse(spec).map_err(|source| Error::Requirement {
                    package: self.name.clone(),
                    source,
                })
            })
            .collect()
    }

    /// `(name, target)` pairs declared for `group`, in declaration order.
    ///
    /// Non-string targets are skipped; [`EnvironmentManifest::from_toml`]
    /// rejects them up front.
    pub fn entry_points(&self, group: &str) -> impl Iterator<Item = (&str, &str)> {
        self.entry_points
            .get(group)
            .into_iter()
            .flat_map(|table| table.iter())
            .filter_map(|(name, target)| target.as_str().map(|t| (name.as_str(), t)))
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Error::InvalidPackage {
            name: self.name.clone(),
            reason,
        };

        if self.name.is_empty()
            || !self
                .name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return Err(invalid(
                "name must be non-empty and contain only alphanumerics, '-', '_' or '.'"
                    .to_string(),
            ));
        }
        if self.version.trim().is_empty() {
            return Err(invalid("version must not be empty".to_string()));
        }

        self.requirements()?;

        for (group, table) in &self.entry_points {
            if group.is_empty() {
                return Err(invalid("entry point group name must not be empty".to_string()));
            }
            for (name, target) in table {
                let target = target.as_str().ok_or_else(|| {
                    invalid(format!("entry point {group}:{name} target must be a string"))
                })?;
                if name.is_empty() {
                    return Err(invalid(format!("empty entry point name in group {group}")));
                }
                EntryPointTarget::parse(target)?;
            }
        }
        Ok(())
    }
}

impl EnvironmentManifest {
    /// Parse and validate an environment manifest.
    pub fn from_toml(content: &str) -> Result<Self> {
        let manifest: Self = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::ManifestNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ManifestSerialize(e.to_string()))
    }

    pub fn package(&self, name: &str) -> Option<&PackageManifest> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// Installed name/version pairs.
    pub fn installed(&self) -> InstalledPackages {
        self.packages
            .iter()
            .map(|p| InstalledPackageRecord::new(&p.name, &p.version))
            .collect()
    }

    /// Every group with at least one declared entry point, sorted.
    pub fn groups(&self) -> Vec<String> {
        self.packages
            .iter()
            .flat_map(|p| p.entry_points.iter())
            .filter(|(_, table)| !table.is_empty())
            .map(|(group, _)| group.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for package in &self.packages {
            package.validate()?;
            if !seen.insert(package.name.as_str()) {
                return Err(Error::DuplicatePackage(package.name.clone()));
            }
        }
        Ok(())
    }
}
