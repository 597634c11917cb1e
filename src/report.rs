//! Human-readable summaries of prune results.

use crate::prune::{PruneFailure, PruneResult};
use humansize::{format_size, FormatSizeOptions, WINDOWS};
use std::path::Path;

/// Binary-scaled sizes with short unit names (B, KB, MB, GB) and one decimal place.
///
/// Zero is written as `0 B`; everything else keeps its decimal, so 5 GiB is `5.0 GB`.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let options = FormatSizeOptions::from(WINDOWS)
        .decimal_places(1)
        .decimal_zeroes(1);
    let formatted = format_size(bytes, options);
    match formatted.strip_suffix(" kB") {
        Some(number) => format!("{} KB", number),
        None => formatted,
    }
}

/// One line per entry that could not be removed.
pub fn failure_line(failure: &PruneFailure) -> String {
    format!(
        "Could not {} {}: {}",
        failure.action,
        failure.path.display(),
        failure.error
    )
}

/// Display name for a root: its last path component.
pub fn root_name(root: &Path) -> String {
    root.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| root.display().to_string())
}

/// Per-root line, or `None` when nothing was removed.
pub fn root_summary(name: &str, result: &PruneResult) -> Option<String> {
    if result.files_removed == 0 {
        return None;
    }
    let verb = if result.dry_run { "Would slim" } else { "Slimmed" };
    Some(format!(
        "{} {} ({} files, {})",
        verb,
        name,
        result.files_removed,
        format_bytes(result.bytes_removed)
    ))
}

/// Running totals across every pruned root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Totals {
    pub roots: u64,
    pub files: u64,
    pub bytes: u64,
}

impl Totals {
    pub fn add(&mut self, result: &PruneResult) {
        self.roots += 1;
        self.files += result.files_removed;
        self.bytes = self.bytes.saturating_add(result.bytes_removed);
    }

    pub fn summary(&self, dry_run: bool) -> String {
        if self.files == 0 {
            "All trees already slim.".to_string()
        } else if dry_run {
            format!(
                "Done. Would remove {} files ({}) total.",
                self.files,
                format_bytes(self.bytes)
            )
        } else {
            format!(
                "Done. Removed {} files ({}) total.",
                self.files,
                format_bytes(self.bytes)
            )
        }
    }
}
