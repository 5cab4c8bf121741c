//! [`FakeSource`]: an in-memory extension source with call counters.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use entry_registry::{DeclaredEntryPoint, ExtensionSource, PackageRequirement, SourceError};

/// Enumeration failure injected with [`FakeSource::fail_group`].
#[derive(Debug, thiserror::Error)]
#[error("cannot enumerate group {group}")]
pub struct EnumerationFailure {
    pub group: String,
}

/// Load failure for entries built with [`FakeEntry::failing_load`].
#[derive(Debug, thiserror::Error)]
#[error("cannot import {target}")]
pub struct LoadFailure {
    pub target: String,
}

/// Handle given to the registry for each fake entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeHandle {
    pub target: String,
    pub fail_load: bool,
}

/// A declared entry point for [`FakeSource`].
#[derive(Debug, Clone)]
pub struct FakeEntry {
    name: String,
    package: String,
    requirements: Vec<PackageRequirement>,
    target: String,
    fail_load: bool,
}

impl FakeEntry {
    /// An entry owned by `package` with no requirements. Its load target
    /// defaults to `"<package>:<name>"`.
    pub fn new(name: &str, package: &str) -> Self {
        Self {
            name: name.to_string(),
            package: package.to_string(),
            requirements: Vec::new(),
            target: format!("{package}:{name}"),
            fail_load: false,
        }
    }

    pub fn requires(mut self, specs: &[&str]) -> Self {
        self.requirements = crate::requirements(specs);
        self
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = target.to_string();
        self
    }

    /// Loading this entry fails with [`LoadFailure`].
    pub fn failing_load(mut self) -> Self {
        self.fail_load = true;
        self
    }
}

/// In-memory [`ExtensionSource`].
///
/// Loading a handle returns its target string.
#[derive(Debug, Default)]
pub struct FakeSource {
    groups: Mutex<HashMap<String, Vec<FakeEntry>>>,
    failing: Mutex<HashSet<String>>,
    enumerations: Mutex<HashMap<String, usize>>,
    loads: AtomicUsize,
    refreshes: AtomicUsize,
    delay: Option<Duration>,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`declare`](Self::declare).
    pub fn with_entry(self, group: &str, entry: FakeEntry) -> Self {
        self.declare(group, entry);
        self
    }

    /// Sleep for `delay` inside every enumeration, widening race windows.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Append an entry to `group`.
    pub fn declare(&self, group: &str, entry: FakeEntry) {
        lock(&self.groups)
            .entry(group.to_string())
            .or_default()
            .push(entry);
    }

    /// Make enumeration of `group` fail until [`heal_group`](Self::heal_group).
    pub fn fail_group(&self, group: &str) {
        lock(&self.failing).insert(group.to_string());
    }

    pub fn heal_group(&self, group: &str) {
        lock(&self.failing).remove(group);
    }

    /// Number of enumerations of `group`, failed ones included.
    pub fn enumeration_count(&self, group: &str) -> usize {
        lock(&self.enumerations).get(group).copied().unwrap_or(0)
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }
}

impl ExtensionSource for FakeSource {
    type Handle = FakeHandle;
    type Loaded = String;

    fn enumerate(&self, group: &str) -> Result<Vec<DeclaredEntryPoint<FakeHandle>>, SourceError> {
        *lock(&self.enumerations).entry(group.to_string()).or_default() += 1;
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }
        if lock(&self.failing).contains(group) {
            return Err(Box::new(EnumerationFailure {
                group: group.to_string(),
            }));
        }

        let declared = lock(&self.groups)
            .get(group)
            .map(|entries| {
                entries
                    .iter()
                    .map(|entry| DeclaredEntryPoint {
                        name: entry.name.clone(),
                        package: entry.package.clone(),
                        requirements: entry.requirements.clone(),
                        handle: FakeHandle {
                            target: entry.target.clone(),
                            fail_load: entry.fail_load,
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(declared)
    }

    fn load(&self, handle: &FakeHandle) -> Result<String, SourceError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if handle.fail_load {
            return Err(Box::new(LoadFailure {
                target: handle.target.clone(),
            }));
        }
        Ok(handle.target.clone())
    }

    fn refresh(&self) {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
