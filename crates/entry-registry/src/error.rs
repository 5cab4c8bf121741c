use crate::checker::Conflict;
use crate::source::SourceError;

/// Errors that can occur while resolving or loading entry points.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The group was populated but holds no entry point with this name.
    #[error("unknown entry point: {group}:{name}")]
    UnknownEntryPoint { group: String, name: String },

    /// The entry point exists but its package requirements are not satisfied.
    #[error("entry point {group}:{name} not loadable: {}", join_conflicts(.conflicts))]
    EntryPointNotLoadable {
        group: String,
        name: String,
        conflicts: Vec<Conflict>,
    },

    /// The extension source failed to enumerate a group or load an entry.
    #[error(transparent)]
    Source(SourceError),

    /// The installed-package index failed to produce a snapshot.
    #[error(transparent)]
    Index(SourceError),

    /// A version string could not be parsed.
    #[error("invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A version constraint could not be parsed.
    #[error("invalid version constraint '{constraint}': {reason}")]
    VersionConstraintParse { constraint: String, reason: String },

    /// A requirement string could not be parsed.
    #[error("invalid requirement '{requirement}': {reason}")]
    InvalidRequirement { requirement: String, reason: String },
}

impl Error {
    /// Conflicts carried by an [`Error::EntryPointNotLoadable`], empty otherwise.
    pub fn conflicts(&self) -> &[Conflict] {
        match self {
            Self::EntryPointNotLoadable { conflicts, .. } => conflicts,
            _ => &[],
        }
    }
}

fn join_conflicts(conflicts: &[Conflict]) -> String {
    conflicts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, Error>;
