//! Configuration module for `sq`.
//!
//! Handles the TOML settings file: description defaults and log level.

mod settings;

pub use settings::{DescribeSettings, LogSettings, Settings, SettingsError};
