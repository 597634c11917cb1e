//! The deletion pass: remove everything under a root that the keep-set does not protect.

use crate::error::Result;
use crate::keep::build_keep_set;
use crate::markers::MarkerSet;
use crate::paths::walk_deepest_first;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Runtime options for a prune.
#[derive(Debug, Clone, Default)]
pub struct PruneOptions {
    pub markers: MarkerSet,
    /// Report what would be removed without deleting anything.
    pub dry_run: bool,
}

/// What happened to a single non-kept entry.
#[derive(Debug)]
pub enum Removal {
    /// A file or symlink was removed; `bytes` is its size before removal.
    File { bytes: u64 },
    /// An empty directory was removed.
    Directory,
    /// The directory still had children and stays for now.
    KeptNonEmpty,
    /// The entry was already gone by the time we got to it.
    Vanished,
    /// Removal failed for another reason (usually permissions).
    Failed(io::Error),
}

impl Removal {
    pub fn is_removed(&self) -> bool {
        matches!(self, Removal::File { .. } | Removal::Directory)
    }
}

/// One visited, non-kept entry and its outcome, handed to the caller's sink.
#[derive(Debug)]
pub struct PruneEvent<'a> {
    pub path: &'a Path,
    pub outcome: Removal,
}

/// An entry left in place because of an error other than "not empty".
#[derive(Debug, Clone)]
pub struct PruneFailure {
    pub path: PathBuf,
    pub action: &'static str,
    pub error: String,
}

/// Aggregate outcome of one prune.
#[derive(Debug, Clone, Default)]
pub struct PruneResult {
    pub files_removed: u64,
    pub bytes_removed: u64,
    pub dirs_removed: u64,
    pub dry_run: bool,
    pub failures: Vec<PruneFailure>,
}

impl PruneResult {
    fn record(&mut self, path: &Path, outcome: &Removal) {
        match outcome {
            Removal::File { bytes } => {
                self.files_removed += 1;
                self.bytes_removed = self.bytes_removed.saturating_add(*bytes);
            }
            Removal::Directory => self.dirs_removed += 1,
            Removal::KeptNonEmpty | Removal::Vanished => {}
            Removal::Failed(err) => self.failures.push(PruneFailure {
                path: path.to_path_buf(),
                action: "remove",
                error: err.to_string(),
            }),
        }
    }
}

/// Prune `root` down to `allowed` plus the default `*.gemspec` markers.
pub fn prune<P: AsRef<Path>>(root: &Path, allowed: &[P]) -> Result<PruneResult> {
    prune_with(root, allowed, &PruneOptions::default(), &mut |_: &PruneEvent<'_>| {})
}

/// Prune `root` with explicit options, reporting every non-kept entry to `sink`.
///
/// Fails only when the root is unusable, and always before anything is deleted.
pub fn prune_with<P: AsRef<Path>>(
    root: &Path,
    allowed: &[P],
    options: &PruneOptions,
    sink: &mut dyn FnMut(&PruneEvent<'_>),
) -> Result<PruneResult> {
    let keep = build_keep_set(root, allowed, &options.markers)?;
    let (entries, walk_failures) = walk_deepest_first(keep.root());

    let mut result = PruneResult {
        dry_run: options.dry_run,
        ..PruneResult::default()
    };
    result
        .failures
        .extend(walk_failures.into_iter().map(|f| PruneFailure {
            path: f.path,
            action: "read",
            error: f.error,
        }));

    let mut pass = Pass {
        dry_run: options.dry_run,
        planned: HashSet::new(),
    };

    for entry in &entries {
        if keep.contains(&entry.path) {
            continue;
        }

        let outcome = pass.visit(&entry.path);
        match &outcome {
            Removal::Failed(err) => {
                tracing::warn!("Could not remove {}: {}", entry.path.display(), err)
            }
            Removal::KeptNonEmpty => {}
            outcome => tracing::debug!("{}: {:?}", entry.path.display(), outcome),
        }
        result.record(&entry.path, &outcome);
        sink(&PruneEvent {
            path: &entry.path,
            outcome,
        });
    }

    tracing::info!(
        "Pruned {}: {} files ({} bytes), {} directories{}",
        keep.root().display(),
        result.files_removed,
        result.bytes_removed,
        result.dirs_removed,
        if options.dry_run { " (dry run)" } else { "" }
    );

    Ok(result)
}

/// State for one deepest-first pass over the entries.
struct Pass {
    dry_run: bool,
    /// Entries a dry run pretends to have removed.
    planned: HashSet<PathBuf>,
}

impl Pass {
    fn visit(&mut self, path: &Path) -> Removal {
        let metadata = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Removal::Vanished,
            Err(err) => return Removal::Failed(err),
        };

        // Symlinks to directories land here too: they are removed as links.
        if metadata.is_dir() {
            self.remove_dir(path)
        } else {
            self.remove_file(path, metadata.len())
        }
    }

    fn remove_dir(&mut self, path: &Path) -> Removal {
        if self.dry_run {
            return if self.would_be_empty(path) {
                self.planned.insert(path.to_path_buf());
                Removal::Directory
            } else {
                Removal::KeptNonEmpty
            };
        }

        match fs::remove_dir(path) {
            Ok(()) => Removal::Directory,
            Err(err) if err.kind() == io::ErrorKind::NotFound => Removal::Vanished,
            Err(err) => {
                if has_children(path) {
                    Removal::KeptNonEmpty
                } else {
                    Removal::Failed(err)
                }
            }
        }
    }

    fn remove_file(&mut self, path: &Path, bytes: u64) -> Removal {
        if self.dry_run {
            self.planned.insert(path.to_path_buf());
            return Removal::File { bytes };
        }

        match fs::remove_file(path) {
            Ok(()) => Removal::File { bytes },
            Err(err) if err.kind() == io::ErrorKind::NotFound => Removal::Vanished,
            Err(err) => Removal::Failed(err),
        }
    }

    /// A dry-run directory is empty once every child is planned for removal.
    fn would_be_empty(&self, path: &Path) -> bool {
        match fs::read_dir(path) {
            Ok(entries) => entries
                .flatten()
                .all(|entry| self.planned.contains(&entry.path())),
            Err(_) => false,
        }
    }
}

fn has_children(path: &Path) -> bool {
    fs::read_dir(path)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
