//! Entry-point registry.
//!
//! Discovers extensions registered under named groups, checks each owning
//! package's requirements against what is installed, and exposes a lazy,
//! cached lookup and load interface. Package metadata and the loading
//! mechanism are supplied by the host through [`PackageIndex`] and
//! [`ExtensionSource`].
//!
//! # Example
//!
//! ```no_run
//! # fn demo<S, I>(registry: entry_registry::EntryPointRegistry<S, I>) -> entry_registry::Result<()>
//! # where S: entry_registry::ExtensionSource, I: entry_registry::PackageIndex {
//! use entry_registry::groups;
//!
//! for name in registry.list_names(groups::NODES)? {
//!     println!("{name}");
//! }
//! let node = registry.load(groups::NODES, "acme.feed")?;
//! # let _ = node;
//! # Ok(())
//! # }
//! ```

pub mod checker;
pub mod error;
pub mod group;
pub mod groups;
pub mod registry;
pub mod requirement;
pub mod source;
pub mod version;

pub use checker::{CompatibilityCheck, Conflict, RequirementChecker, check};
pub use error::{Error, Result};
pub use group::{EntryPointGroup, ExtensionRecord};
pub use registry::EntryPointRegistry;
pub use requirement::{InstalledPackageRecord, InstalledPackages, PackageRequirement};
pub use source::{DeclaredEntryPoint, ExtensionSource, PackageIndex, SourceError};
pub use version::{PackageVersion, VersionConstraint};
