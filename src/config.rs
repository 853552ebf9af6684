//! Engine configuration from TOML files and environment variables.
//!
//! Environment variables (`TRIPLINE_*`) override file values, so deployed
//! embedders can tweak behavior without shipping a config file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Synthetic leading rows the UI renders before the first step of a
    /// plan (a "home/base" row). Reorder target indices are display
    /// indices and get offset down by this amount, clamped at 0.
    #[serde(default)]
    pub leading_rows: usize,

    /// Directory for the file-backed timeline cache, if any.
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,

    /// Resolve route distances automatically after every refresh.
    #[serde(default = "default_auto_distances")]
    pub auto_distances: bool,
}

fn default_auto_distances() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            leading_rows: 0,
            cache_dir: None,
            auto_distances: true,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("Failed to parse engine config")
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(value) = std::env::var("TRIPLINE_LEADING_ROWS") {
            self.leading_rows = value
                .parse()
                .context("TRIPLINE_LEADING_ROWS must be an unsigned integer")?;
        }
        if let Ok(value) = std::env::var("TRIPLINE_CACHE_DIR") {
            if !value.is_empty() {
                self.cache_dir = Some(PathBuf::from(value));
            }
        }
        if let Ok(value) = std::env::var("TRIPLINE_AUTO_DISTANCES") {
            self.auto_distances = value
                .parse()
                .context("TRIPLINE_AUTO_DISTANCES must be true or false")?;
        }
        Ok(self)
    }
}
