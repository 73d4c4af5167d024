//! `hemrisk.toml` configuration.
//!
//! Every section is optional; missing keys fall back to the defaults of
//! the reference deployment (thresholds 10% / 50%, `best_model_stack.json`).
//! Relative paths in a loaded file are taken from the file's directory.

use hemrisk_core::{ConfigurationError, Thresholds};
use hemrisk_report::{ExplanationAssets, ReportSettings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "hemrisk.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid thresholds in config: {0}")]
    Thresholds(#[from] ConfigurationError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub path: PathBuf,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("best_model_stack.json"),
        }
    }
}

/// Band boundaries on the percent scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdSettings {
    pub low: f64,
    pub high: f64,
}

impl Default for ThresholdSettings {
    fn default() -> Self {
        Self {
            low: Thresholds::DEFAULT_LOW,
            high: Thresholds::DEFAULT_HIGH,
        }
    }
}

impl ThresholdSettings {
    pub fn validated(&self) -> Result<Thresholds, ConfigurationError> {
        Thresholds::new(self.low, self.high)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelSettings,
    pub thresholds: ThresholdSettings,
    pub report: ReportSettings,
    pub assets: ExplanationAssets,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(text)?;
        config.thresholds.validated()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        log::debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Resolve relative model and image paths against `base`. Absolute
    /// paths are left as they are.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        self.model.path = base.join(&self.model.path);
        self.assets = self.assets.relative_to(base);
    }

    /// Load `explicit` if given, else `hemrisk.toml` in the working
    /// directory if present, else the defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::load(fallback)
                } else {
                    log::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}
