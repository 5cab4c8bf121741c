use std::path::PathBuf;

/// Errors raised while reading an environment manifest or resolving targets.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse environment manifest TOML.
    #[error("failed to parse environment manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    /// Environment manifest file not found at the expected path.
    #[error("environment manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    /// Failed to serialize environment manifest.
    #[error("failed to serialize environment manifest: {0}")]
    ManifestSerialize(String),

    /// I/O error reading the manifest.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A package entry is malformed.
    #[error("invalid package '{name}': {reason}")]
    InvalidPackage { name: String, reason: String },

    /// Two packages share a name.
    #[error("package '{0}' is declared more than once")]
    DuplicatePackage(String),

    /// A requirement or version constraint did not parse.
    #[error("package '{package}': {source}")]
    Requirement {
        package: String,
        source: entry_registry::Error,
    },

    /// An entry-point target is not of the form `module:attr`.
    #[error("invalid entry point target '{target}': {reason}")]
    InvalidTarget { target: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
