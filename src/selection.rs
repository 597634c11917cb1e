//! Which roots get pruned at all. This is policy layered on top of the core prune.

use std::path::Path;

/// Why a root was passed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Skip {
    /// The root is not strictly below the configured base directory.
    OutsideBase,
    /// No allowed paths were found, so pruning would empty the tree.
    EmptyAllowList,
}

impl Skip {
    pub fn reason(self) -> &'static str {
        match self {
            Skip::OutsideBase => "outside the base directory",
            Skip::EmptyAllowList => "no allowed files declared",
        }
    }
}

/// Root-selection policy applied before pruning.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selection<'a> {
    pub base: Option<&'a Path>,
    pub allow_empty: bool,
}

impl Selection<'_> {
    /// `root` and `base` are expected to be absolute and lexically clean.
    pub fn check(&self, root: &Path, allowed_count: usize) -> Result<(), Skip> {
        if let Some(base) = self.base {
            if !is_strictly_under(root, base) {
                return Err(Skip::OutsideBase);
            }
        }
        if allowed_count == 0 && !self.allow_empty {
            return Err(Skip::EmptyAllowList);
        }
        Ok(())
    }
}

/// Component-wise containment that excludes `base` itself.
pub fn is_strictly_under(path: &Path, base: &Path) -> bool {
    path != base && path.starts_with(base)
}
