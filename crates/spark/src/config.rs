//! Runtime configuration and setup errors.
//!
//! Everything has a default, so an empty YAML document (or no file at all)
//! yields the stock behavior:
//!
//! ```yaml
//! color: auto          # auto | always | never
//! verbose_errors: false
//! messages: lang/fr.yaml
//! help:
//!   heading_color: yellow
//!   item_color: green
//!   indent: 2
//!   extra: 2
//! ```

use crate::help::HelpConfig;
use crate::output::ColorMode;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Errors raised while configuring or assembling a command registry.
#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    /// Two registered commands declare the same name.
    #[error("duplicate command name: {0}")]
    DuplicateCommand(String),

    /// Invalid configuration or message catalog.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_yaml::Error> for SetupError {
    fn from(err: serde_yaml::Error) -> Self {
        SetupError::Config(err.to_string())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Styling for console output.
    pub color: ColorMode,
    /// Include the source chain when rendering errors.
    pub verbose_errors: bool,
    /// Optional YAML message catalog overlaid on the English defaults.
    pub messages: Option<PathBuf>,
    pub help: HelpConfig,
}

impl Config {
    pub fn from_yaml_str(source: &str) -> Result<Self, SetupError> {
        if source.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(source)?)
    }

    /// Loads configuration from a YAML file.
    ///
    /// A relative `messages` path is resolved against the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SetupError> {
        let path = path.as_ref();
        let mut config = Self::from_yaml_str(&std::fs::read_to_string(path)?)?;
        if let (Some(messages), Some(dir)) = (config.messages.as_mut(), path.parent()) {
            if messages.is_relative() {
                *messages = dir.join(&*messages);
            }
        }
        Ok(config)
    }
}
