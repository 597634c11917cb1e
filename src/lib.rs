//! gitslim - Prune installed source trees down to their declared files
//!
//! Given a root directory and the root-relative paths that must survive, gitslim deletes
//! every other file, symlink and now-empty directory under the root. Ancestor directories
//! of kept files always survive, as do root-level marker files (`*.gemspec` by default).
//!
//! ## Architecture
//!
//! - `keep`: builds the keep-set (allowed files, their ancestors, marker matches)
//! - `paths`: root resolution, lexical normalization, deepest-first enumeration
//! - `prune`: the deletion pass and its per-entry outcomes
//! - `config`, `manifest`, `selection`, `report`: configuration, allow-list sources,
//!   root-selection policy and human-readable output used by the CLI

pub mod config;
pub mod error;
pub mod keep;
pub mod manifest;
pub mod markers;
pub mod paths;
pub mod prune;
pub mod report;
pub mod selection;

// Re-export commonly used items
pub use config::SlimConfig;
pub use error::SlimError;
pub use keep::{build_keep_set, KeepSet};
pub use markers::{MarkerPattern, MarkerSet};
pub use paths::enumerate_tree;
pub use prune::{prune, prune_with, PruneEvent, PruneFailure, PruneOptions, PruneResult, Removal};
pub use report::format_bytes;
