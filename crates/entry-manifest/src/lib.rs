//! TOML-described installed environment.
//!
//! An environment manifest lists installed packages with their versions,
//! declared requirements and entry points. [`ManifestEnvironment`] serves it
//! to an [`EntryPointRegistry`](entry_registry::EntryPointRegistry) as both
//! the installed-package index and the extension source.

pub mod environment;
pub mod error;
pub mod manifest;
pub mod target;

/// Default environment manifest filename.
pub const ENVIRONMENT_FILENAME: &str = "environment.toml";

pub use environment::{EntryPointHandle, LoadedEntryPoint, ManifestEnvironment};
pub use error::{Error, Result};
pub use manifest::{EnvironmentManifest, PackageManifest};
pub use target::EntryPointTarget;
