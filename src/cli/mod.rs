//! Command-line interface for autocomplete
//!
//! This module handles:
//! - Command-line argument parsing using clap
//! - Configuration loading and validation
//! - Subcommand dispatch (demo, scan, replay, config, completion, version)

pub mod completion;
mod replay;

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::{Config, LogLevel};
use crate::error::Result;
use crate::scanner::{self, TriggerMatch};
use crate::strategy;

pub use replay::{ReplayReport, replay};

/// Trigger-driven autocomplete overlay
#[derive(Parser, Debug)]
#[command(
    name = "autocomplete",
    version,
    about = "Trigger-driven autocomplete for text editors",
    long_about = "Detects trigger tokens such as @mentions and #tags before the cursor, \
searches the matching strategy and lets you pick a completion from a dropdown."
)]
pub struct CliArgs {
    /// Configuration file path
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Verbose mode (debug logging)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Very verbose mode (trace logging)
    #[arg(long = "vv", global = true)]
    pub very_verbose: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands for autocomplete
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Interactive terminal editor with the dropdown (default)
    Demo,

    /// Run the trigger scanner once and print the match as JSON
    Scan {
        /// Document text
        #[arg(long, value_name = "TEXT")]
        text: String,

        /// Cursor offset in characters
        #[arg(long, value_name = "N")]
        cursor: usize,
    },

    /// Drive a session with key names and print the resulting document
    Replay {
        /// Document text
        #[arg(long, value_name = "TEXT")]
        text: String,

        /// Cursor offset in characters (defaults to the end of the text)
        #[arg(long, value_name = "N")]
        cursor: Option<usize>,

        /// Keys to press: up, down, enter, tab, esc, backspace, space or a
        /// single character
        #[arg(value_name = "KEYS")]
        keys: Vec<String>,
    },

    /// Show or validate configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Validate configuration file
        #[arg(long)]
        validate: bool,
    },

    /// Generate shell completion script
    Completion {
        /// Shell type (bash, zsh, fish)
        #[arg(value_name = "SHELL")]
        shell: String,
    },

    /// Show version information
    Version,
}

/// JSON shape printed by `scan`
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub strategy_name: String,
    #[serde(flatten)]
    pub found: TriggerMatch,
}

/// CLI interface handler
pub struct CliInterface {
    /// Parsed command-line arguments
    args: CliArgs,

    /// Loaded configuration
    config: Config,
}

impl CliInterface {
    /// Parse process arguments and load configuration
    pub fn new() -> Result<Self> {
        Self::from_args(CliArgs::parse())
    }

    /// Build from already parsed arguments
    pub fn from_args(args: CliArgs) -> Result<Self> {
        let config = Self::load_config(&args)?;
        Ok(Self { args, config })
    }

    /// Load configuration from file and apply argument overrides
    fn load_config(args: &CliArgs) -> Result<Config> {
        let mut config = Config::load_from_file(args.config_file.as_deref())?;
        config.validate()?;
        Self::apply_args_to_config(&mut config, args);
        Ok(config)
    }

    fn apply_args_to_config(config: &mut Config, args: &CliArgs) {
        if args.no_color {
            config.menu.color = false;
        }
        if args.very_verbose {
            config.logging.level = LogLevel::Trace;
        } else if args.verbose {
            config.logging.level = LogLevel::Debug;
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn args(&self) -> &CliArgs {
        &self.args
    }

    /// Selected subcommand, `demo` when none was given
    pub fn command(&self) -> Commands {
        self.args.command.clone().unwrap_or(Commands::Demo)
    }

    /// Execute the selected subcommand
    pub async fn execute(&self) -> Result<()> {
        match self.command() {
            Commands::Demo => {
                let text = crate::terminal::run(&self.config).await?;
                println!("{text}");
            }
            Commands::Scan { text, cursor } => {
                let report = self.scan(&text, cursor)?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Commands::Replay { text, cursor, keys } => {
                let report = replay(&self.config, &text, cursor, &keys).await?;
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            Commands::Config { show, validate } => {
                self.handle_config_command(show, validate)?;
            }
            Commands::Completion { shell } => {
                completion::generate_completion(&shell)?;
            }
            Commands::Version => self.show_version(),
        }
        Ok(())
    }

    /// Run the scanner against the configured strategies
    pub fn scan(&self, text: &str, cursor: usize) -> Result<Option<ScanReport>> {
        let strategies = strategy::from_config(&self.config)?;
        Ok(
            scanner::evaluate(text, cursor, &strategies).map(|found| ScanReport {
                strategy_name: strategies[found.strategy].name().to_string(),
                found,
            }),
        )
    }

    fn show_version(&self) {
        println!("autocomplete version {}", env!("CARGO_PKG_VERSION"));
        println!("Rust version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }

    fn handle_config_command(&self, show: bool, validate: bool) -> Result<()> {
        if validate {
            // Loading already validated; reaching here means it passed.
            println!("Configuration is valid: {}", self.get_config_path().display());
        }

        if show || !validate {
            println!("# Configuration file: {}", self.get_config_path().display());
            println!("{}", self.config.to_toml()?);
        }

        Ok(())
    }

    /// Get configuration file path (from args or default)
    fn get_config_path(&self) -> PathBuf {
        self.args
            .config_file
            .clone()
            .unwrap_or_else(Config::default_config_path)
    }
}
