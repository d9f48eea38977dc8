//! Tool configuration parsing.
//!
//! Configuration lives in `ppmgrid.toml` next to where the tool is run,
//! or wherever `--config` points. Every section is optional.
//!
//! # Example ppmgrid.toml
//!
//! ```toml
//! [decode]
//! channels = "lenient"
//!
//! [output]
//! format = "png"
//! ```

use std::fs;
use std::io;
use std::path::Path;

use log::debug;
use serde::Deserialize;

use crate::format::ImageFormat;
use crate::ppm::DecodeOptions;

/// File looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "ppmgrid.toml";

/// Settings for the `convert` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target format when the output path has no recognizable extension.
    pub format: ImageFormat,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: ImageFormat::Png,
        }
    }
}

/// Loaded configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub decode: DecodeOptions,
    pub output: OutputConfig,
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Toml(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Toml(e) => write!(f, "TOML parse error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<io::Error> for ConfigError {
    fn from(e: io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Toml(e)
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load `path` if given, else the default file if present, else defaults.
    ///
    /// A missing default file is fine; a missing explicit file is an error.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    debug!("using {}", DEFAULT_CONFIG_FILE);
                    Self::load(default)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}
