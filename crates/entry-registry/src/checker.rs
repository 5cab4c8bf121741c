//! Compatibility checking of declared requirements against installed packages.

use std::fmt;

use crate::requirement::{InstalledPackages, PackageRequirement};

/// One unsatisfied requirement.
///
/// The `Display` form is the diagnostic text shown to users and carried in
/// [`Error::EntryPointNotLoadable`](crate::Error::EntryPointNotLoadable).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conflict {
    /// The required package is not installed at all.
    NotInstalled { package: String },
    /// The package is installed at a version the requirement rejects.
    Incompatible {
        package: String,
        installed: String,
        requirement: String,
    },
}

impl Conflict {
    pub fn package(&self) -> &str {
        match self {
            Self::NotInstalled { package } | Self::Incompatible { package, .. } => package,
        }
    }
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInstalled { package } => write!(f, "{package} not installed"),
            Self::Incompatible {
                package,
                installed,
                requirement,
            } => write!(f, "{package}=={installed} not compatible with {requirement}"),
        }
    }
}

/// Computes the conflicts between a requirement set and a snapshot.
///
/// The registry calls this once per owning package per group initialization.
pub trait CompatibilityCheck: Send + Sync {
    fn conflicts(
        &self,
        requirements: &[PackageRequirement],
        installed: &InstalledPackages,
    ) -> Vec<Conflict>;
}

/// The default checker, backed by [`check`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RequirementChecker;

impl CompatibilityCheck for RequirementChecker {
    fn conflicts(
        &self,
        requirements: &[PackageRequirement],
        installed: &InstalledPackages,
    ) -> Vec<Conflict> {
        check(requirements, installed)
    }
}

/// Check every requirement against `installed`, in order.
///
/// An empty result means the requirement set is fully satisfied.
pub fn check(requirements: &[PackageRequirement], installed: &InstalledPackages) -> Vec<Conflict> {
    requirements
        .iter()
        .filter_map(|requirement| match installed.get(requirement.package()) {
            None => Some(Conflict::NotInstalled {
                package: requirement.package().to_string(),
            }),
            Some(record) if !requirement.is_satisfied_by(&record.version) => {
                Some(Conflict::Incompatible {
                    package: record.name.clone(),
                    installed: record.version.clone(),
                    requirement: requirement.to_string(),
                })
            }
            Some(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::InstalledPackageRecord;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn installed(packages: &[(&str, &str)]) -> InstalledPackages {
        packages
            .iter()
            .map(|(name, version)| InstalledPackageRecord::new(*name, *version))
            .collect()
    }

    fn reqs(specs: &[&str]) -> Vec<PackageRequirement> {
        specs
            .iter()
            .map(|s| PackageRequirement::parse(s).unwrap())
            .collect()
    }

    fn messages(conflicts: &[Conflict]) -> Vec<String> {
        conflicts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_incompatible_version_message() {
        let conflicts = check(&reqs(&["pkgA==2.0"]), &installed(&[("pkgA", "1.5")]));
        assert_eq!(messages(&conflicts), ["pkgA==1.5 not compatible with pkgA==2.0"]);
    }

    #[test]
    fn test_missing_package_message() {
        let conflicts = check(&reqs(&["pkgA==2.0"]), &installed(&[]));
        assert_eq!(messages(&conflicts), ["pkgA not installed"]);
        assert_eq!(
            conflicts[0],
            Conflict::NotInstalled {
                package: "pkgA".to_string()
            }
        );
    }

    #[test]
    fn test_satisfied_requirement_is_empty() {
        let conflicts = check(&reqs(&["pkgA>=1.0", "pkgB"]), &installed(&[("pkgA", "1.5"), ("pkgB", "0.1")]));
        assert!(conflicts.is_empty());
    }

    #[rstest]
    #[case("pkgA>=1.0", "1.2.3.4")]
    #[case("pkgA>=1.0", "2.0rc1")]
    #[case("pkgA>=1.0", "1.0.post1")]
    #[case("pkgA==2.0", "2.0.0+local")]
    #[case("pkgA~=1.4", "1.4.0.1")]
    fn test_python_style_versions_are_compatible(#[case] requirement: &str, #[case] version: &str) {
        let conflicts = check(&reqs(&[requirement]), &installed(&[("pkgA", version)]));
        assert_eq!(messages(&conflicts), Vec::<String>::new());
    }

    #[test]
    fn test_malformed_installed_version_is_incompatible() {
        let conflicts = check(&reqs(&["pkgA>=1.0"]), &installed(&[("pkgA", "unknown")]));
        assert_eq!(messages(&conflicts), ["pkgA==unknown not compatible with pkgA>=1.0"]);
    }

    #[test]
    fn test_message_uses_sorted_requirement() {
        let conflicts = check(&reqs(&["core-lib >=2.0, <3"]), &installed(&[("core-lib", "3.1")]));
        assert_eq!(messages(&conflicts), ["core-lib==3.1 not compatible with core-lib<3,>=2.0"]);
    }

    #[test]
    fn test_order_follows_requirements() {
        let conflicts = check(
            &reqs(&["zeta", "alpha<1", "mid>=0.1"]),
            &installed(&[("alpha", "1.2"), ("mid", "0.2")]),
        );
        assert_eq!(
            messages(&conflicts),
            ["zeta not installed", "alpha==1.2 not compatible with alpha<1"]
        );
        assert_eq!(conflicts[1].package(), "alpha");
    }

    #[test]
    fn test_no_requirements_is_compatible() {
        assert!(check(&[], &installed(&[])).is_empty());
    }

    #[test]
    fn test_checker_trait_delegates() {
        let checker = RequirementChecker;
        let conflicts = checker.conflicts(&reqs(&["pkgA"]), &installed(&[]));
        assert_eq!(messages(&conflicts), ["pkgA not installed"]);
    }
}
