//! [`CountingChecker`] for asserting on conflict memoization.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use entry_registry::{
    CompatibilityCheck, Conflict, InstalledPackages, PackageRequirement, RequirementChecker,
};

/// Delegates to [`RequirementChecker`] and counts invocations.
///
/// Clones share the counter, so a test can hand one clone to the registry
/// and keep another for assertions.
#[derive(Debug, Clone, Default)]
pub struct CountingChecker {
    calls: Arc<AtomicUsize>,
}

impl CountingChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many requirement sets have been checked.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompatibilityCheck for CountingChecker {
    fn conflicts(
        &self,
        requirements: &[PackageRequirement],
        installed: &InstalledPackages,
    ) -> Vec<Conflict> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        RequirementChecker.conflicts(requirements, installed)
    }
}
