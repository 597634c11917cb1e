//! Root resolution, lexical normalization of allowed paths and tree enumeration.

use crate::error::{Result, SlimError};
use ignore::WalkBuilder;
use path_absolutize::Absolutize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// An entry found under the root, with its depth in path segments (root children are 1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: PathBuf,
    pub depth: usize,
}

/// Something the walker could not read.
#[derive(Debug, Clone)]
pub struct WalkFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Make `root` absolute and lexically clean, then check it is an existing directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let abs = root
        .absolutize()
        .map_err(|source| SlimError::Resolve {
            path: root.to_path_buf(),
            source,
        })?
        .to_path_buf();

    match fs::metadata(&abs) {
        Ok(meta) if meta.is_dir() => Ok(abs),
        Ok(_) => Err(SlimError::RootNotDirectory(abs)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(SlimError::RootNotFound(abs)),
        Err(source) => Err(SlimError::Resolve { path: abs, source }),
    }
}

/// Resolve an allowed path against `root` without touching the filesystem.
///
/// `.` and `..` segments are collapsed. Returns `None` when the result lands outside
/// `root`; an absolute input is accepted only if it already lies under `root`.
pub fn resolve_allowed(root: &Path, allowed: &Path) -> Option<PathBuf> {
    let joined = root.join(allowed);
    let cleaned = joined.absolutize().ok()?.to_path_buf();
    cleaned.starts_with(root).then_some(cleaned)
}

/// Walk every entry below `root` (hidden ones included, links not followed) and
/// return them deepest-first along with anything that could not be read.
pub(crate) fn walk_deepest_first(root: &Path) -> (Vec<TreeEntry>, Vec<WalkFailure>) {
    let walker = WalkBuilder::new(root)
        .hidden(false)
        // Ignore files carry no meaning here: every entry is a candidate.
        .ignore(false)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .parents(false)
        .require_git(false)
        .follow_links(false)
        .build();

    let mut entries = Vec::new();
    let mut failures = Vec::new();

    for result in walker {
        match result {
            Ok(entry) => {
                if entry.depth() == 0 {
                    continue;
                }
                entries.push(TreeEntry {
                    path: entry.path().to_path_buf(),
                    depth: entry.depth(),
                });
            }
            Err(err) => {
                let path = error_path(&err).unwrap_or(root).to_path_buf();
                tracing::warn!("Skipping unreadable entry {}: {}", path.display(), err);
                failures.push(WalkFailure {
                    path,
                    error: err.to_string(),
                });
            }
        }
    }

    // Stable sort: siblings keep walk order, children always precede their parent.
    entries.sort_by(|a, b| b.depth.cmp(&a.depth));

    (entries, failures)
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        _ => None,
    }
}

/// List every entry under `root` as absolute paths, deepest first.
///
/// Unreadable entries are logged and left out rather than failing the call.
pub fn enumerate_tree(root: &Path) -> Result<Vec<PathBuf>> {
    let root = resolve_root(root)?;
    let (entries, _failures) = walk_deepest_first(&root);
    Ok(entries.into_iter().map(|e| e.path).collect())
}
