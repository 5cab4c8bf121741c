//! [`FakeIndex`]: an installed-package index tests can edit between calls.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use entry_registry::{InstalledPackageRecord, InstalledPackages, PackageIndex, SourceError};

/// Index failure injected with [`FakeIndex::fail_with`].
#[derive(Debug, thiserror::Error)]
#[error("index unavailable: {0}")]
pub struct IndexFailure(pub String);

/// In-memory [`PackageIndex`] that counts snapshots.
#[derive(Debug, Default)]
pub struct FakeIndex {
    packages: Mutex<InstalledPackages>,
    failure: Mutex<Option<String>>,
    snapshots: AtomicUsize,
}

impl FakeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`install`](Self::install).
    pub fn with_package(self, name: &str, version: &str) -> Self {
        self.install(name, version);
        self
    }

    /// Install or upgrade a package.
    pub fn install(&self, name: &str, version: &str) {
        self.packages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(InstalledPackageRecord::new(name, version));
    }

    /// Remove a package by rebuilding the set without it.
    pub fn uninstall(&self, name: &str) {
        let mut packages = self.packages.lock().unwrap_or_else(PoisonError::into_inner);
        *packages = packages
            .iter()
            .filter(|record| record.name != name)
            .cloned()
            .collect();
    }

    /// Make every following snapshot fail, or succeed again with `None`.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) =
            message.map(str::to_string);
    }

    /// Number of snapshots taken so far, failed ones included.
    pub fn snapshot_count(&self) -> usize {
        self.snapshots.load(Ordering::SeqCst)
    }
}

impl PackageIndex for FakeIndex {
    fn snapshot(&self) -> Result<InstalledPackages, SourceError> {
        self.snapshots.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.failure.lock().unwrap_or_else(PoisonError::into_inner).clone() {
            return Err(Box::new(IndexFailure(message)));
        }
        Ok(self.packages.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}
