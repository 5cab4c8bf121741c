//! Names of the entry-point groups a host application looks extensions up in.

/// Node implementations.
pub const NODES: &str = "nodes";
/// Garbage-collection hooks for node state.
pub const NODES_GCS: &str = "nodes.gcs";
/// Configuration validators for node types.
pub const NODES_VALIDATORS: &str = "nodes.validators";
/// Prototype libraries.
pub const PROTOTYPES: &str = "prototypes";
/// API extensions.
pub const API: &str = "api";
/// Web UI extensions.
pub const WEBUI: &str = "webui";

/// Every well-known group, in the order hosts usually initialize them.
pub const ALL: &[&str] = &[NODES, NODES_GCS, NODES_VALIDATORS, PROTOTYPES, API, WEBUI];
