//! Configuration handling for form containers

use crate::error::{FormError, Result};
use crate::state::InitialValuePolicy;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Behaviour switches shared by every form built with this config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Whether a second `record_initial_value` for a field replaces the first
    pub initial_value_policy: InitialValuePolicy,
    /// Coalesce the store writes of one operation into a single notification
    pub batch_notifications: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            initial_value_policy: InitialValuePolicy::FirstWriteWins,
            batch_notifications: true,
        }
    }
}

impl FormConfig {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("io", "centy", "form-state")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the platform config directory
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| FormError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| FormError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), ?config, "loaded form config");
        Ok(config)
    }

    /// Save configuration to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let write_err = |source: std::io::Error| FormError::ConfigWrite {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(FormError::ConfigSerialize)?;
        fs::write(path, content).map_err(write_err)?;
        Ok(())
    }
}
