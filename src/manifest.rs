//! Allow-list sources: inline paths, list files, and a root's git-tracked files.

use anyhow::{bail, Context, Result};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Parse a newline-separated file list. Blank lines and `#` comments are skipped.
pub fn parse_file_list(text: &str) -> Vec<PathBuf> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect()
}

/// Read a file list from `path`, or from stdin when `path` is `-`.
pub fn read_file_list(path: &Path) -> Result<Vec<PathBuf>> {
    let text = if path == Path::new("-") {
        let mut text = String::new();
        io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read file list from stdin")?;
        text
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("Failed to read file list {}", path.display()))?
    };
    Ok(parse_file_list(&text))
}

/// Files git tracks under `root`, relative to `root`.
///
/// Runs `git ls-files -z` inside the root so paths come back root-relative even when
/// the repository itself starts higher up.
pub fn git_tracked_files(root: &Path) -> Result<Vec<PathBuf>> {
    let output = Command::new("git")
        .arg("ls-files")
        .arg("-z")
        .current_dir(root)
        .output()
        .with_context(|| format!("Failed to run git ls-files in {}", root.display()))?;

    if !output.status.success() {
        bail!(
            "git ls-files failed in {}: {}",
            root.display(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .split('\0')
        .filter(|entry| !entry.is_empty())
        .map(PathBuf::from)
        .collect())
}

/// Where the allowed paths for each root come from. Sources are merged.
#[derive(Debug, Clone, Default)]
pub struct AllowListSource {
    /// Paths given directly, shared by every root.
    pub inline: Vec<PathBuf>,
    /// Paths read from list files, shared by every root.
    pub listed: Vec<PathBuf>,
    /// Add each root's git-tracked files.
    pub git: bool,
}

impl AllowListSource {
    /// Collect the allowed paths for `root`.
    pub fn collect(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut allowed = Vec::with_capacity(self.inline.len() + self.listed.len());
        allowed.extend(self.inline.iter().cloned());
        allowed.extend(self.listed.iter().cloned());
        if self.git {
            allowed.extend(git_tracked_files(root)?);
        }
        Ok(allowed)
    }
}
