//! Configuration: marker patterns and root-selection policy.

use crate::markers::MarkerSet;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

// Embed the default configuration directly in the binary at compile time
const DEFAULT_CONFIG_TOML: &str = include_str!("../gitslim.toml");

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlimConfig {
    #[serde(default)]
    pub markers: MarkersConfig,
    #[serde(default)]
    pub selection: SelectionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MarkersConfig {
    #[serde(default = "default_patterns")]
    pub patterns: Vec<String>,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        MarkersConfig {
            patterns: default_patterns(),
        }
    }
}

fn default_patterns() -> Vec<String> {
    vec![crate::markers::DEFAULT_MARKER.to_string()]
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SelectionConfig {
    /// Only roots strictly below this directory are pruned.
    pub base: Option<PathBuf>,
    /// Prune roots even when their allow-list is empty.
    #[serde(default)]
    pub allow_empty: bool,
}

impl SlimConfig {
    /// Parse configuration from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse gitslim configuration")
    }

    /// The configuration compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG_TOML)
    }

    /// Load `path` if given, otherwise fall back to the embedded defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config {}", path.display()))?;
                Self::from_toml(&text)
                    .with_context(|| format!("Invalid config {}", path.display()))
            }
            None => Self::embedded(),
        }
    }

    pub fn marker_set(&self) -> Result<MarkerSet> {
        MarkerSet::from_patterns(&self.markers.patterns).context("Invalid marker pattern in config")
    }
}
