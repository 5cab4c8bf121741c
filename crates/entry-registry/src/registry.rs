//! The entry-point registry: lazy group population, caching and loading.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, error, info, warn};

use crate::checker::{CompatibilityCheck, Conflict, RequirementChecker};
use crate::error::{Error, Result};
use crate::group::{EntryPointGroup, ExtensionRecord};
use crate::source::{ExtensionSource, PackageIndex};

type Group<S> = EntryPointGroup<<S as ExtensionSource>::Handle>;

struct GroupCache<H> {
    groups: HashMap<String, Arc<EntryPointGroup<H>>>,
    generation: u64,
}

/// Registry of entry points, grouped by name and gated on package
/// compatibility.
///
/// Groups are populated on first access and served from cache until
/// [`invalidate`](Self::invalidate) is called. The registry is `Sync`; share
/// it behind an `Arc` to use it from several threads.
pub struct EntryPointRegistry<S: ExtensionSource, I: PackageIndex> {
    source: S,
    index: I,
    checker: Box<dyn CompatibilityCheck>,
    cache: RwLock<GroupCache<S::Handle>>,
    /// Serializes group population and invalidation.
    init_lock: Mutex<()>,
}

impl<S: ExtensionSource, I: PackageIndex> EntryPointRegistry<S, I> {
    /// Create a registry with an empty cache.
    pub fn new(source: S, index: I) -> Self {
        Self {
            source,
            index,
            checker: Box::new(RequirementChecker),
            cache: RwLock::new(GroupCache {
                groups: HashMap::new(),
                generation: 0,
            }),
            init_lock: Mutex::new(()),
        }
    }

    /// Replace the compatibility checker used for new group populations.
    pub fn with_checker(mut self, checker: impl CompatibilityCheck + 'static) -> Self {
        self.checker = Box::new(checker);
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn index(&self) -> &I {
        &self.index
    }

    /// Return the resolved group, populating it first if it is not cached.
    ///
    /// Repeated calls return the same `Arc` until the cache is invalidated.
    /// If population fails the cache is left untouched and the collaborator
    /// error is returned.
    pub fn ensure_group(&self, group: &str) -> Result<Arc<Group<S>>> {
        if let Some(cached) = self.cached(group) {
            return Ok(cached);
        }

        let _init = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished populating while we waited.
        if let Some(cached) = self.cached(group) {
            return Ok(cached);
        }

        let populated = Arc::new(self.populate(group)?);
        self.write_cache()
            .groups
            .insert(group.to_string(), Arc::clone(&populated));
        Ok(populated)
    }

    /// Names of every entry point in `group`, in enumeration order.
    pub fn list_names(&self, group: &str) -> Result<Vec<String>> {
        Ok(self.ensure_group(group)?.names())
    }

    /// The full resolved mapping for `group`.
    pub fn map(&self, group: &str) -> Result<Arc<Group<S>>> {
        self.ensure_group(group)
    }

    /// Load the named entry point through the extension source.
    ///
    /// # Errors
    ///
    /// - [`Error::UnknownEntryPoint`] if the group has no such entry point.
    /// - [`Error::EntryPointNotLoadable`] if its requirements are not met.
    /// - [`Error::Source`] carrying the extension source's own load error.
    pub fn load(&self, group: &str, name: &str) -> Result<S::Loaded> {
        info!("Loading {group}:{name}");
        let entries = self.ensure_group(group)?;

        let record = entries.get(name).ok_or_else(|| Error::UnknownEntryPoint {
            group: group.to_string(),
            name: name.to_string(),
        })?;

        if !record.is_loadable() {
            return Err(Error::EntryPointNotLoadable {
                group: group.to_string(),
                name: name.to_string(),
                conflicts: record.conflicts().to_vec(),
            });
        }

        self.source.load(record.handle()).map_err(Error::Source)
    }

    /// Drop every cached group and any state held by the extension source.
    ///
    /// Waits for an in-flight population to finish, so a population that
    /// started before the call can never reappear after it.
    pub fn invalidate(&self) {
        let _init = self.init_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = {
            let mut cache = self.write_cache();
            cache.groups.clear();
            cache.generation += 1;
            cache.generation
        };
        self.source.refresh();
        info!(generation, "Entry point cache invalidated");
    }

    /// Whether `group` is currently cached.
    pub fn is_cached(&self, group: &str) -> bool {
        self.read_cache().groups.contains_key(group)
    }

    /// Names of the cached groups, sorted.
    pub fn cached_groups(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read_cache().groups.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of invalidations performed so far.
    pub fn generation(&self) -> u64 {
        self.read_cache().generation
    }

    fn cached(&self, group: &str) -> Option<Arc<Group<S>>> {
        self.read_cache().groups.get(group).cloned()
    }

    fn populate(&self, group: &str) -> Result<Group<S>> {
        debug!(group, "Initializing entry point group");

        let installed = self.index.snapshot().map_err(Error::Index)?;
        let declared = self.source.enumerate(group).map_err(Error::Source)?;

        let mut memo: HashMap<String, Arc<[Conflict]>> = HashMap::new();
        let mut entries = EntryPointGroup::new(group);

        for entry in declared {
            let conflicts = Arc::clone(memo.entry(entry.package.clone()).or_insert_with(|| {
                self.checker
                    .conflicts(&entry.requirements, &installed)
                    .into()
            }));

            let record = ExtensionRecord::new(entry.name, entry.handle, conflicts);
            if !record.is_loadable() {
                let reasons: Vec<String> =
                    record.conflicts().iter().map(ToString::to_string).collect();
                error!("{} not loadable: {}", record.name(), reasons.join(", "));
            }

            if let Some(previous) = entries.insert(record) {
                warn!(
                    group,
                    name = previous.name(),
                    "Duplicate entry point name, keeping the later declaration"
                );
            }
        }

        debug!(
            group,
            entries = entries.len(),
            packages = memo.len(),
            "Entry point group initialized"
        );
        Ok(entries)
    }

    fn read_cache(&self) -> RwLockReadGuard<'_, GroupCache<S::Handle>> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, GroupCache<S::Handle>> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: ExtensionSource, I: PackageIndex> std::fmt::Debug for EntryPointRegistry<S, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryPointRegistry")
            .field("cached_groups", &self.cached_groups())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}
