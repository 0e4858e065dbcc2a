//! Configuration management for the CLI
//!
//! This module handles loading configuration from:
//! - Default values
//! - Configuration files (YAML/JSON/TOML)
//! - Command-line arguments

use crate::error::{Error, Result};
use jmul_core::transformation::{strategy_by_name, DEFAULT_MAX_DEPTH, HIGHEST_PRIORITY};
use jmul_core::xml::ObjectToXml;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Engine settings
    pub transformation: TransformationConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformationConfig {
    /// Rule application strategy (highest-priority, first-applicable)
    pub strategy: String,

    /// Maximum nesting depth of a single transformation
    pub max_depth: usize,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Indent written XML and JSON
    pub pretty: bool,

    /// Use colored output by default
    pub color: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no -v flag is given (trace, debug, info, warn, error)
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,
}

impl Default for TransformationConfig {
    fn default() -> Self {
        Self {
            strategy: HIGHEST_PRIORITY.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            color: true,
        }
    }
}

/// Serialization format of a config file, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileFormat {
    Yaml,
    Json,
    Toml,
}

impl FileFormat {
    fn of(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("toml") => FileFormat::Toml,
            _ => FileFormat::Json,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config = match FileFormat::of(path) {
            FileFormat::Yaml => serde_yaml::from_str(&content)?,
            FileFormat::Json => serde_json::from_str(&content)?,
            FileFormat::Toml => toml::from_str(&content)
                .map_err(|e| Error::config(format!("Failed to parse {}: {}", path.display(), e)))?,
        };

        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        eprintln!("Warning: Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        // Return default config if no config file found
        Ok(Self::default())
    }

    /// Load configuration from a specific file or default locations
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let config = match file {
            Some(path) if !path.exists() => {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Get default configuration file paths to check
    pub fn default_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".jmul.yaml"),
            PathBuf::from(".jmul.yml"),
            PathBuf::from(".jmul.json"),
            PathBuf::from(".jmul.toml"),
        ];

        // User config directory
        if let Some(config_dir) = dirs::config_dir() {
            let jmul_dir = config_dir.join("jmul");
            paths.push(jmul_dir.join("config.yaml"));
            paths.push(jmul_dir.join("config.json"));
        }

        // Home directory
        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".jmul.yaml"));
            paths.push(home_dir.join(".jmul.json"));
        }

        paths
    }

    /// Check values the engine would reject later
    pub fn validate(&self) -> Result<()> {
        strategy_by_name::<ObjectToXml>(&self.transformation.strategy)?;

        if self.transformation.max_depth == 0 {
            return Err(Error::config("transformation.max_depth must be at least 1"));
        }

        if let Some(format) = &self.logging.format {
            if !matches!(format.as_str(), "compact" | "full" | "json") {
                return Err(Error::config(format!(
                    "logging.format must be compact, full or json, got '{}'",
                    format
                )));
            }
        }

        Ok(())
    }

    /// Render the configuration as YAML, JSON or TOML text
    pub fn to_string_as(&self, format: crate::cli::ConfigFormat) -> Result<String> {
        use crate::cli::ConfigFormat;

        match format {
            ConfigFormat::Yaml => Ok(serde_yaml::to_string(self)?),
            ConfigFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            ConfigFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| Error::config(format!("Failed to serialize as TOML: {}", e))),
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        use crate::cli::ConfigFormat;

        let content = match FileFormat::of(path) {
            FileFormat::Yaml => self.to_string_as(ConfigFormat::Yaml)?,
            FileFormat::Json => self.to_string_as(ConfigFormat::Json)?,
            FileFormat::Toml => self.to_string_as(ConfigFormat::Toml)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}
