//! Configuration management for autocomplete
//!
//! This module handles loading, parsing, and managing configuration from:
//! - Configuration files (TOML format)
//! - Command-line arguments (applied by the `cli` module)
//!
//! Configuration precedence (highest to lowest):
//! 1. Command-line arguments
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ConfigError, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Dropdown menu configuration
    #[serde(default)]
    pub menu: MenuConfig,

    /// Completion strategies, in priority order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<StrategyConfig>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: LogLevel,

    /// Enable timestamps in logs
    #[serde(default = "default_log_timestamps")]
    pub timestamps: bool,
}

/// Log level options
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Dropdown menu configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MenuConfig {
    /// Highlight the focused row with color
    #[serde(default = "default_menu_color")]
    pub color: bool,

    /// Extra horizontal offset applied to the menu placement
    #[serde(default)]
    pub offset_x: i32,

    /// Extra vertical offset applied to the menu placement
    #[serde(default)]
    pub offset_y: i32,
}

/// One declarative word-list strategy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StrategyConfig {
    /// Unique strategy name
    pub name: String,

    /// Regular expression the scanned token must match in full
    pub trigger: String,

    /// Leading characters to strip from the token before searching
    #[serde(default)]
    pub index: Option<usize>,

    /// Candidate vocabulary
    #[serde(default)]
    pub words: Vec<String>,

    /// Maximum number of rows rendered per search
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Simulated search latency in milliseconds
    #[serde(default)]
    pub latency_ms: u64,

    /// Text inserted before the chosen candidate
    #[serde(default)]
    pub prefix: String,

    /// Text inserted after the chosen candidate
    #[serde(default = "default_suffix")]
    pub suffix: String,
}

// Default value functions
fn default_log_level() -> LogLevel {
    LogLevel::Warn
}

fn default_log_timestamps() -> bool {
    false
}

fn default_menu_color() -> bool {
    true
}

fn default_max_results() -> usize {
    8
}

fn default_suffix() -> String {
    " ".to_string()
}

fn default_strategies() -> Vec<StrategyConfig> {
    vec![
        StrategyConfig {
            name: "mention".to_string(),
            trigger: r"^@\w*$".to_string(),
            index: Some(1),
            words: ["alice", "albert", "bob", "carol", "dave", "eve", "mallory"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_results: default_max_results(),
            latency_ms: 0,
            prefix: "@".to_string(),
            suffix: default_suffix(),
        },
        StrategyConfig {
            name: "tag".to_string(),
            trigger: r"^#\w*$".to_string(),
            index: Some(1),
            words: ["bug", "build", "docs", "feature", "question", "release"]
                .into_iter()
                .map(String::from)
                .collect(),
            max_results: default_max_results(),
            latency_ms: 0,
            prefix: "#".to_string(),
            suffix: default_suffix(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            menu: MenuConfig::default(),
            strategies: default_strategies(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            timestamps: default_log_timestamps(),
        }
    }
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            color: default_menu_color(),
            offset_x: 0,
            offset_y: 0,
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load configuration from a file
    ///
    /// # Arguments
    /// * `path` - Path to the configuration file (TOML format)
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound(path.display().to_string()).into()
            } else {
                crate::error::AutocompleteError::Io(e)
            }
        })?;
        Self::from_toml_str(&text)
    }

    /// Load configuration, falling back to defaults when no file exists
    ///
    /// An explicitly given path must exist; the default path is optional.
    pub fn load_from_file(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = Self::default_config_path();
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".autocomplete")
            .join("config.toml")
    }

    /// Serialize the configuration to TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save configuration to a file, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Validate the configuration
    ///
    /// Strategy names must be non-empty and unique, and every trigger must
    /// compile as a regular expression.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for strategy in &self.strategies {
            if strategy.name.trim().is_empty() {
                return Err(ConfigError::MissingField("strategies.name".to_string()).into());
            }
            if !seen.insert(strategy.name.as_str()) {
                return Err(ConfigError::Duplicate(strategy.name.clone()).into());
            }
            if let Err(e) = regex::Regex::new(&strategy.trigger) {
                return Err(ConfigError::InvalidValue {
                    field: format!("strategies.{}.trigger", strategy.name),
                    value: format!("{} ({e})", strategy.trigger),
                }
                .into());
            }
            if strategy.max_results == 0 {
                return Err(ConfigError::InvalidValue {
                    field: format!("strategies.{}.max_results", strategy.name),
                    value: "0".to_string(),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl StrategyConfig {
    /// Simulated search latency as Duration
    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}
