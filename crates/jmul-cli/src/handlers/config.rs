//! Configuration command handlers

use crate::cli::{ConfigAction, ConfigArgs, ConfigInitArgs, ConfigShowArgs};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use std::path::PathBuf;

/// File written by `config init` when no path is given
const DEFAULT_CONFIG_FILE: &str = ".jmul.yaml";

/// Handle the config command
pub fn handle_config(args: ConfigArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    match args.action {
        ConfigAction::Init(init_args) => handle_config_init(init_args, output),
        ConfigAction::Show(show_args) => handle_config_show(show_args, config, output),
    }
}

/// Handle config init subcommand
fn handle_config_init(args: ConfigInitArgs, output: &mut OutputWriter) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    if path.exists() && !args.force {
        return Err(Error::AlreadyExists { path });
    }

    Config::default().save(&path)?;
    output.success(&format!("✓ Created config at {}", path.display()))?;
    Ok(())
}

/// Handle config show subcommand
fn handle_config_show(args: ConfigShowArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let content = config.to_string_as(args.format)?;
    output.writeln(content.trim_end())
}
