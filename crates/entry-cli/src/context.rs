//! Registry wiring for a single CLI invocation.

use std::path::Path;
use std::sync::Arc;

use entry_manifest::ManifestEnvironment;
use entry_registry::EntryPointRegistry;

use crate::error::{CliError, Result};

pub type Registry = EntryPointRegistry<Arc<ManifestEnvironment>, Arc<ManifestEnvironment>>;

/// The environment and a registry serving it.
pub struct CliContext {
    pub environment: Arc<ManifestEnvironment>,
    pub registry: Registry,
}

impl CliContext {
    /// Open the environment manifest at `path`.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CliError::user(format!(
                "Environment manifest '{}' not found. Pass --env or set ENTRIES_ENV.",
                path.display()
            )));
        }
        let environment = Arc::new(ManifestEnvironment::from_path(path));
        let registry = EntryPointRegistry::new(Arc::clone(&environment), Arc::clone(&environment));
        tracing::debug!(path = %path.display(), "Opened environment");
        Ok(Self {
            environment,
            registry,
        })
    }
}
