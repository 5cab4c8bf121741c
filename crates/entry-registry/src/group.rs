//! Resolved entry-point groups.

use std::collections::HashMap;
use std::sync::Arc;

use crate::checker::Conflict;

/// An entry point after its compatibility check.
///
/// An entry point is loadable exactly when it has no conflicts.
#[derive(Debug, Clone)]
pub struct ExtensionRecord<H> {
    name: String,
    handle: H,
    conflicts: Arc<[Conflict]>,
}

impl<H> ExtensionRecord<H> {
    pub fn new(name: impl Into<String>, handle: H, conflicts: Arc<[Conflict]>) -> Self {
        Self {
            name: name.into(),
            handle,
            conflicts,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> &H {
        &self.handle
    }

    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    pub fn is_loadable(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// All entry points of one group, in enumeration order.
#[derive(Debug)]
pub struct EntryPointGroup<H> {
    name: String,
    records: Vec<ExtensionRecord<H>>,
    index: HashMap<String, usize>,
}

impl<H> EntryPointGroup<H> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Group name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a record. A record with an existing name replaces the earlier one
    /// in place and the replaced record is returned.
    pub fn insert(&mut self, record: ExtensionRecord<H>) -> Option<ExtensionRecord<H>> {
        match self.index.get(record.name()) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position], record)),
            None => {
                self.index.insert(record.name().to_string(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ExtensionRecord<H>> {
        self.index.get(name).map(|&position| &self.records[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.records.iter().map(|r| r.name().to_string()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExtensionRecord<H>> {
        self.records.iter()
    }

    pub fn loadable(&self) -> impl Iterator<Item = &ExtensionRecord<H>> {
        self.records.iter().filter(|r| r.is_loadable())
    }

    pub fn not_loadable(&self) -> impl Iterator<Item = &ExtensionRecord<H>> {
        self.records.iter().filter(|r| !r.is_loadable())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a, H> IntoIterator for &'a EntryPointGroup<H> {
    type Item = &'a ExtensionRecord<H>;
    type IntoIter = std::slice::Iter<'a, ExtensionRecord<H>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
