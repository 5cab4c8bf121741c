//! Declared package requirements and installed-package snapshots.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::version::VersionConstraint;

/// A dependency declared by the package that owns an entry point.
///
/// Parsed from strings such as `core-lib>=2.0,<3`, `helpers` or
/// `toolkit[yaml]~=1.4`. Extras are kept for display but do not take part in
/// compatibility checks.
#[derive(Debug, Clone)]
pub struct PackageRequirement {
    package: String,
    extras: Vec<String>,
    constraint: Option<VersionConstraint>,
}

impl PackageRequirement {
    /// A requirement on any installed version of `package`.
    pub fn any(package: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            extras: Vec::new(),
            constraint: None,
        }
    }

    pub fn parse(requirement: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidRequirement {
            requirement: requirement.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = requirement.trim();
        let name_end = trimmed
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(trimmed.len());
        let (package, mut rest) = trimmed.split_at(name_end);
        if package.is_empty() {
            return Err(invalid("missing package name"));
        }

        let mut extras = Vec::new();
        if let Some(after) = rest.trim_start().strip_prefix('[') {
            let close = after.find(']').ok_or_else(|| invalid("unclosed extras"))?;
            extras = after[..close]
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(str::to_string)
                .collect();
            rest = &after[close + 1..];
        }

        let spec: String = rest.chars().filter(|c| !c.is_whitespace()).collect();
        // Legacy form: `pkg (>=1.0)`.
        let spec = spec
            .strip_prefix('(')
            .and_then(|inner| inner.strip_suffix(')'))
            .unwrap_or(spec.as_str());
        let constraint = if spec.is_empty() {
            None
        } else {
            Some(VersionConstraint::parse(spec)?)
        };

        Ok(Self {
            package: package.to_string(),
            extras,
            constraint,
        })
    }

    /// Name of the required package.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn extras(&self) -> &[String] {
        &self.extras
    }

    pub fn constraint(&self) -> Option<&VersionConstraint> {
        self.constraint.as_ref()
    }

    /// Whether `version` meets the constraint. Unconstrained requirements
    /// accept every installed version.
    pub fn is_satisfied_by(&self, version: &str) -> bool {
        self.constraint
            .as_ref()
            .is_none_or(|constraint| constraint.satisfies(version))
    }
}

/// Canonical form: no whitespace, extras and constraint clauses sorted
/// (`core-lib[json,yaml]<3,>=2.0`).
impl fmt::Display for PackageRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.package)?;
        if !self.extras.is_empty() {
            let mut extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
            extras.sort_unstable();
            write!(f, "[{}]", extras.join(","))?;
        }
        if let Some(constraint) = &self.constraint {
            write!(f, "{constraint}")?;
        }
        Ok(())
    }
}

impl FromStr for PackageRequirement {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A package as it is installed right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackageRecord {
    pub name: String,
    pub version: String,
}

impl InstalledPackageRecord {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// Point-in-time view of the installed packages, keyed by package name.
#[derive(Debug, Clone, Default)]
pub struct InstalledPackages {
    packages: HashMap<String, InstalledPackageRecord>,
}

impl InstalledPackages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a package, replacing any previous record with the same name.
    pub fn insert(&mut self, record: InstalledPackageRecord) {
        self.packages.insert(record.name.clone(), record);
    }

    pub fn get(&self, name: &str) -> Option<&InstalledPackageRecord> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &InstalledPackageRecord> {
        self.packages.values()
    }
}

impl FromIterator<InstalledPackageRecord> for InstalledPackages {
    fn from_iter<T: IntoIterator<Item = InstalledPackageRecord>>(iter: T) -> Self {
        let mut packages = Self::new();
        for record in iter {
            packages.insert(record);
        }
        packages
    }
}
