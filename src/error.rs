use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// tool reads golden reports, reshapes resource documents, or writes them back.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON parsing or serialization fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raised when a resource document has no `resources` array.
    #[error("no resources array found in document")]
    MissingResources,

    /// Raised when a resource covered by the golden structure does not follow
    /// the `{name, costComponents, subResources}` shape.
    #[error("invalid resource '{name}': {source}")]
    InvalidResource {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
