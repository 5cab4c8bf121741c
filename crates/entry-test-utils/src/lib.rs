//! Shared test utilities for the entry-registry workspace.
//!
//! Fakes of both registry collaborators that record how often they are
//! called, so tests can assert on caching and memoization. Dev-dependency
//! only, never published.
//!
//! # Modules
//!
//! - [`index`]: [`FakeIndex`], an editable installed-package index
//! - [`source`]: [`FakeSource`], an in-memory extension source
//! - [`checker`]: [`CountingChecker`], a call-counting compatibility checker

pub mod checker;
pub mod index;
pub mod source;

pub use checker::CountingChecker;
pub use index::{FakeIndex, IndexFailure};
pub use source::{EnumerationFailure, FakeEntry, FakeHandle, FakeSource, LoadFailure};

use entry_registry::PackageRequirement;

/// Parse requirement strings.
///
/// # Panics
/// Panics if any string is not a valid requirement.
pub fn requirements(specs: &[&str]) -> Vec<PackageRequirement> {
    specs
        .iter()
        .map(|spec| {
            PackageRequirement::parse(spec)
                .unwrap_or_else(|e| panic!("requirements: invalid requirement {spec:?}: {e}"))
        })
        .collect()
}
