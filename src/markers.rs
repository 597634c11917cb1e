//! Marker patterns: root-level entries that always survive pruning.

use crate::error::{Result, SlimError};
use std::path::Path;

/// Pattern used when nothing else is configured.
pub const DEFAULT_MARKER: &str = "*.gemspec";

/// A single filename pattern with at most one `*` wildcard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPattern {
    pattern: String,
    prefix: String,
    /// `None` for exact-name patterns.
    suffix: Option<String>,
}

impl MarkerPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() || pattern.matches('*').count() > 1 || pattern.contains('/') {
            return Err(SlimError::InvalidMarker(pattern.to_string()));
        }

        let (prefix, suffix) = match pattern.split_once('*') {
            Some((prefix, suffix)) => (prefix.to_string(), Some(suffix.to_string())),
            None => (pattern.to_string(), None),
        };

        Ok(MarkerPattern {
            pattern: pattern.to_string(),
            prefix,
            suffix,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    /// Match against a bare filename (no directory part).
    pub fn matches(&self, filename: &str) -> bool {
        match &self.suffix {
            None => filename == self.prefix,
            Some(suffix) => {
                // Shell glob rule: a leading `*` never matches a hidden name.
                if self.prefix.is_empty() && filename.starts_with('.') {
                    return false;
                }
                // prefix and suffix may not overlap
                filename.len() >= self.prefix.len() + suffix.len()
                    && filename.starts_with(self.prefix.as_str())
                    && filename.ends_with(suffix.as_str())
            }
        }
    }
}

/// The full set of marker patterns applied to a root's direct children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerSet {
    patterns: Vec<MarkerPattern>,
}

impl MarkerSet {
    /// A set that matches nothing.
    pub fn empty() -> Self {
        MarkerSet {
            patterns: Vec::new(),
        }
    }

    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| MarkerPattern::new(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(MarkerSet { patterns })
    }

    pub fn push(&mut self, pattern: MarkerPattern) {
        if !self.patterns.contains(&pattern) {
            self.patterns.push(pattern);
        }
    }

    pub fn patterns(&self) -> &[MarkerPattern] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check whether the last component of `path` matches any pattern.
    pub fn is_marker(&self, path: &Path) -> bool {
        let Some(filename) = path.file_name() else {
            return false;
        };
        let filename = filename.to_string_lossy();
        self.patterns.iter().any(|p| p.matches(&filename))
    }
}

impl Default for MarkerSet {
    fn default() -> Self {
        MarkerSet {
            patterns: vec![MarkerPattern {
                pattern: DEFAULT_MARKER.to_string(),
                prefix: String::new(),
                suffix: Some(".gemspec".to_string()),
            }],
        }
    }
}
