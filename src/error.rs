//! Errors surfaced by the pruning core.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Structural failures that stop a prune before the tree is touched.
///
/// Per-entry filesystem trouble (vanished entries, permission errors, non-empty
/// directories) never shows up here; it is recorded on the `PruneResult` instead.
#[derive(Debug, Error)]
pub enum SlimError {
    /// The root does not exist.
    #[error("root {0} does not exist")]
    RootNotFound(PathBuf),

    /// The root exists but is not a directory.
    #[error("root {0} is not a directory")]
    RootNotDirectory(PathBuf),

    /// A path could not be made absolute or its metadata could not be read.
    #[error("failed to resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A marker pattern uses more than one wildcard or is empty.
    #[error("invalid marker pattern '{0}'")]
    InvalidMarker(String),
}

pub type Result<T> = std::result::Result<T, SlimError>;
