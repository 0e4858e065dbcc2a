//! JMUL CLI - Command-line interface for object graph serialization
//!
//! This is the main entry point for the JMUL CLI application, providing
//! commands for encoding JSON documents into the XML object-graph format,
//! decoding them back, and inspecting the registered transformation rules.

mod cli;
mod config;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use config::Config;
use error::Result;
use logging::{timing::Timer, LoggingConfig};
use output::OutputWriter;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Load configuration before logging so its logging section applies
    let config = Config::load_with_file(cli.config.as_deref());

    // Set up colored output
    let use_color = cli.use_color() && config.as_ref().map_or(true, |c| c.output.color);
    control::set_override(use_color);

    // Initialize logging
    if let Err(e) = init_logging(&cli, config.as_ref().ok()) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = config.and_then(|config| run(cli, &config, use_color));

    match result {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", error::format_error(&e, use_color));

            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }

            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli, config), fields(command = ?cli.command))]
fn run(cli: Cli, config: &Config, use_color: bool) -> Result<()> {
    let _timer = Timer::new("cli_execution");

    let mut output = OutputWriter::new(cli.output, use_color, cli.quiet);

    tracing::info!(
        command = ?cli.command,
        verbosity = cli.verbosity_level(),
        strategy = %config.transformation.strategy,
        "Executing command"
    );

    match cli.command {
        Commands::Encode(args) => handlers::handle_encode(args, config, &mut output),
        Commands::Decode(args) => handlers::handle_decode(args, config, &mut output),
        Commands::Rules(args) => handlers::handle_rules(args, config, &mut output),
        Commands::Config(args) => handlers::handle_config(args, config, &mut output),
        Commands::Completions(args) => handlers::handle_completions(args),
    }
}

/// Initialize the logging system
fn init_logging(cli: &Cli, config: Option<&Config>) -> Result<()> {
    // Create logging configuration from CLI args, config file and environment
    let mut logging_config = LoggingConfig::from_verbosity(cli.verbosity_level());
    if let Some(config) = config {
        logging_config.merge_with_file(&config.logging, cli.verbosity_level());
    }
    logging_config.merge_with_env();

    // If quiet mode, only log errors
    if cli.quiet {
        logging_config.level = "error".to_string();
        logging_config.console = false;
    }

    logging::init_logging(logging_config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(["jmul", "decode", "graph.xml", "--pretty"]);
        assert_eq!(cli.verbosity_level(), 0);
        assert!(matches!(cli.command, Commands::Decode(ref args) if args.pretty));

        let cli = Cli::parse_from(["jmul", "-vvv", "rules"]);
        assert_eq!(cli.verbosity_level(), 3);

        let cli = Cli::parse_from(["jmul", "--quiet", "config", "show", "--format", "json"]);
        assert_eq!(cli.verbosity_level(), 0);
    }
}
