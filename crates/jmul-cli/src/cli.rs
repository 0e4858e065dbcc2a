//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use jmul_core::{DeclaredType, TransformationPath};
use std::path::PathBuf;

/// JMUL CLI - Serialize object graphs to XML and back
///
/// Encodes JSON documents into the reference-preserving XML object-graph
/// format, decodes them back, and inspects the registered transformation rules.
#[derive(Parser, Debug)]
#[command(
    name = "jmul",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "JMUL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for reports and status messages
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Encode a JSON document into the XML object-graph format
    Encode(EncodeArgs),

    /// Decode an XML object graph back into JSON
    Decode(DecodeArgs),

    /// List the registered transformation rules
    Rules(RulesArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the encode command
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// Path to the JSON input
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the XML here instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Write the XML on a single line
    #[arg(long)]
    pub compact: bool,

    /// Declared type of the root (e.g. list, map, record:Order)
    #[arg(long, value_name = "TYPE")]
    pub declared_type: Option<DeclaredType>,

    /// Rule application strategy, overriding the configuration
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyName>,
}

/// Arguments for the decode command
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// Path to the XML object graph
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Write the JSON here instead of stdout
    #[arg(long = "save-to", value_name = "OUTPUT_FILE")]
    pub save_to: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Rule application strategy, overriding the configuration
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyName>,
}

/// Arguments for the rules command
#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// Only list rules of this path (e.g. Object:XML)
    #[arg(short, long, value_name = "ORIGIN:DESTINATION")]
    pub path: Option<TransformationPath>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Show the effective configuration
    Show(ConfigShowArgs),
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Where to write the file (defaults to .jmul.yaml)
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Force overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "yaml")]
    pub format: ConfigFormat,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    /// TOML format
    Toml,
    /// JSON format
    Json,
    /// YAML format
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Rule application strategies selectable from the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyName {
    /// Apply the single most preferred rule, failing on ties
    HighestPriority,
    /// Apply the first applicable rule in registration order
    FirstApplicable,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    /// Bash shell
    Bash,
    /// Zsh shell
    Zsh,
    /// Fish shell
    Fish,
    /// PowerShell
    PowerShell,
    /// Elvish shell
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl StrategyName {
    /// The name the core engine knows this strategy by
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyName::HighestPriority => jmul_core::transformation::HIGHEST_PRIORITY,
            StrategyName::FirstApplicable => jmul_core::transformation::FIRST_APPLICABLE,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}
