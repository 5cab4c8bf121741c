//! Collaborator interfaces the registry consumes.
//!
//! The registry never discovers packages or imports code itself. A host
//! provides a [`PackageIndex`] that reports what is installed and an
//! [`ExtensionSource`] that enumerates declared entry points and turns a
//! handle into something usable.

use std::sync::Arc;

use crate::requirement::{InstalledPackages, PackageRequirement};

/// Error raised by a collaborator. The registry passes it through untouched.
pub type SourceError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Reports the packages installed at call time.
pub trait PackageIndex: Send + Sync {
    fn snapshot(&self) -> Result<InstalledPackages, SourceError>;
}

/// An entry point as declared by its owning package.
#[derive(Debug, Clone)]
pub struct DeclaredEntryPoint<H> {
    /// Name, unique within its group.
    pub name: String,
    /// Identity of the owning package (name and version). Entry points
    /// sharing an identity share one conflict computation.
    pub package: String,
    /// Requirements declared by the owning package.
    pub requirements: Vec<PackageRequirement>,
    /// Opaque reference handed back to [`ExtensionSource::load`].
    pub handle: H,
}

/// Enumerates and loads entry points.
pub trait ExtensionSource: Send + Sync {
    /// Opaque reference to a declared entry point.
    type Handle: Send + Sync;
    /// Whatever loading a handle produces.
    type Loaded;

    /// All entry points declared for `group`, in declaration order.
    fn enumerate(&self, group: &str) -> Result<Vec<DeclaredEntryPoint<Self::Handle>>, SourceError>;

    fn load(&self, handle: &Self::Handle) -> Result<Self::Loaded, SourceError>;

    /// Drop any state cached between enumerations. Called on invalidation.
    fn refresh(&self) {}
}

impl<T: PackageIndex + ?Sized> PackageIndex for Arc<T> {
    fn snapshot(&self) -> Result<InstalledPackages, SourceError> {
        (**self).snapshot()
    }
}

impl<T: ExtensionSource + ?Sized> ExtensionSource for Arc<T> {
    type Handle = T::Handle;
    type Loaded = T::Loaded;

    fn enumerate(&self, group: &str) -> Result<Vec<DeclaredEntryPoint<Self::Handle>>, SourceError> {
        (**self).enumerate(group)
    }

    fn load(&self, handle: &Self::Handle) -> Result<Self::Loaded, SourceError> {
        (**self).load(handle)
    }

    fn refresh(&self) {
        (**self).refresh()
    }
}
