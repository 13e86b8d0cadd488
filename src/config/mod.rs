//! Gate configuration loaded from `.ci-gate/config.yaml`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::plan::PlanRules;
use crate::targets::TargetRules;
use crate::title::TitleRules;

/// Directory holding per-repository gate configuration.
pub const CONFIG_DIR: &str = ".ci-gate";

/// Configuration file name inside [`CONFIG_DIR`].
pub const CONFIG_FILE: &str = "config.yaml";

/// Rules for every gate. Missing sections fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GateConfig {
    /// Title validation rules.
    pub title: TitleRules,
    /// Target extraction rules.
    pub targets: TargetRules,
    /// Plan duplicate-name rules.
    pub plan: PlanRules,
}

/// Locates, loads and saves [`GateConfig`].
pub struct ConfigManager {
    config_path: PathBuf,
    explicit: bool,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            config_path: Self::default_config_path(),
            explicit: false,
        }
    }
}

impl ConfigManager {
    /// Creates a manager for the default location.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager for an explicit file, which must exist when loaded.
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            config_path: path,
            explicit: true,
        }
    }

    /// Uses `path` when given, the default location otherwise.
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or_else(Self::new, Self::with_path)
    }

    /// Returns `.ci-gate/config.yaml` relative to the working directory.
    pub fn default_config_path() -> PathBuf {
        Path::new(CONFIG_DIR).join(CONFIG_FILE)
    }

    /// Returns the file this manager reads and writes.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Loads the configuration. A missing default file yields defaults.
    pub fn load_config(&self) -> Result<GateConfig> {
        if !self.config_path.exists() {
            if self.explicit {
                anyhow::bail!("Config file not found: {}", self.config_path.display());
            }
            tracing::debug!(
                "No config at {}, using defaults",
                self.config_path.display()
            );
            return Ok(GateConfig::default());
        }

        let content = std::fs::read_to_string(&self.config_path).with_context(|| {
            format!("Failed to read config file: {}", self.config_path.display())
        })?;

        let config: GateConfig = serde_yaml::from_str(&content).with_context(|| {
            format!("Failed to parse config file: {}", self.config_path.display())
        })?;

        tracing::debug!("Loaded config from {}", self.config_path.display());
        Ok(config)
    }

    /// Saves the configuration, creating the parent directory if needed.
    pub fn save_config(&self, config: &GateConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = serde_yaml::to_string(config).context("Failed to serialize config")?;

        std::fs::write(&self.config_path, content).with_context(|| {
            format!("Failed to write config file: {}", self.config_path.display())
        })?;

        Ok(())
    }
}
