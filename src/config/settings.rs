//! TOML-based configuration for `sq`.
//!
//! Example configuration:
//! ```toml
//! [describe]
//! sections = ["table", "aggregation", "breakout", "filter"]
//! rich = false
//!
//! [logging]
//! level = "debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::describe::{DescribeOptions, Section};

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Description rendering.
    pub describe: DescribeSettings,

    /// Diagnostics output.
    pub logging: LogSettings,
}

/// Description settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DescribeSettings {
    /// Sections to render, in order.
    pub sections: Vec<String>,

    /// Tag metric and segment names in the output.
    pub rich: bool,
}

impl Default for DescribeSettings {
    fn default() -> Self {
        Self {
            sections: Section::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            rich: false,
        }
    }
}

impl DescribeSettings {
    /// Build describe options, rejecting unknown section names.
    pub fn to_options(&self) -> Result<DescribeOptions, SettingsError> {
        let sections = self
            .sections
            .iter()
            .map(|name| {
                Section::parse(name)
                    .ok_or_else(|| SettingsError::InvalidConfig(format!("unknown describe section: {name}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DescribeOptions {
            rich: self.rich,
            sections,
        })
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive (e.g., "warn", "structured_query=debug").
    /// `RUST_LOG` takes precedence when set.
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse and validate settings from TOML text.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.describe.to_options()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `SQ_CONFIG`
    /// 2. `./sq.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("SQ_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("sq.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        Ok(Settings::default())
    }
}
