//! Keep-set construction: the closed set of paths a prune must never delete.

use crate::error::{Result, SlimError};
use crate::markers::MarkerSet;
use crate::paths::{resolve_allowed, resolve_root};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Absolute paths protected from deletion: allowed files, every ancestor of each up to
/// and including the root, and the root-level marker matches.
#[derive(Debug, Clone)]
pub struct KeepSet {
    root: PathBuf,
    paths: HashSet<PathBuf>,
    markers: Vec<PathBuf>,
    rejected: Vec<PathBuf>,
}

impl KeepSet {
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    /// Root-level entries kept because they matched a marker pattern.
    pub fn markers(&self) -> &[PathBuf] {
        &self.markers
    }

    /// Allowed paths dropped because they resolved outside the root.
    pub fn rejected(&self) -> &[PathBuf] {
        &self.rejected
    }

    fn insert_with_ancestors(&mut self, path: PathBuf) {
        for ancestor in path.ancestors() {
            // Ancestors already present mean the rest of the chain is too.
            if !self.paths.insert(ancestor.to_path_buf()) {
                break;
            }
            if ancestor == self.root {
                break;
            }
        }
    }
}

/// Build the keep-set for `root`.
///
/// Allowed paths need not exist. Paths that escape the root are logged and recorded
/// on [`KeepSet::rejected`] instead of being kept.
pub fn build_keep_set<P: AsRef<Path>>(
    root: &Path,
    allowed: &[P],
    markers: &MarkerSet,
) -> Result<KeepSet> {
    let root = resolve_root(root)?;
    let mut keep = KeepSet {
        paths: HashSet::from([root.clone()]),
        root,
        markers: Vec::new(),
        rejected: Vec::new(),
    };

    for rel in allowed {
        let rel = rel.as_ref();
        match resolve_allowed(&keep.root, rel) {
            Some(path) => keep.insert_with_ancestors(path),
            None => {
                tracing::warn!(
                    "Ignoring allowed path {} outside {}",
                    rel.display(),
                    keep.root.display()
                );
                keep.rejected.push(rel.to_path_buf());
            }
        }
    }

    if !markers.is_empty() {
        let entries = fs::read_dir(&keep.root).map_err(|source| SlimError::Resolve {
            path: keep.root.clone(),
            source,
        })?;
        for entry in entries.flatten() {
            let path = entry.path();
            if markers.is_marker(&path) {
                tracing::debug!("Keeping marker {}", path.display());
                keep.paths.insert(path.clone());
                keep.markers.push(path);
            }
        }
        keep.markers.sort();
    }

    Ok(keep)
}
