//! Shared utilities for command handlers

use crate::cli::StrategyName;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use jmul_core::transformation::{strategy_by_name, TransformationFactory, TransformationScheme};
use std::path::Path;
use tracing::debug;

/// Apply the configured strategy and depth limit to a built-in engine
///
/// A strategy given on the command line wins over the config file.
pub fn configure<S: TransformationScheme>(
    engine: TransformationFactory<S>,
    config: &Config,
    strategy: Option<StrategyName>,
) -> Result<TransformationFactory<S>> {
    let name = strategy
        .map(StrategyName::as_str)
        .unwrap_or(config.transformation.strategy.as_str());
    debug!(strategy = name, max_depth = config.transformation.max_depth, "Configuring engine");

    Ok(engine
        .with_boxed_strategy(strategy_by_name(name)?)
        .with_max_depth(config.transformation.max_depth))
}

/// Fail with `FileNotFound` unless `path` exists
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_path_buf(),
        })
    }
}

/// Write `content` to `save_to`, or to the output writer when no file is given
pub fn emit(content: &str, save_to: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    match save_to {
        Some(path) => {
            std::fs::write(path, content)?;
            debug!(path = %path.display(), bytes = content.len(), "Saved output");
            Ok(())
        }
        None => output.writeln(content),
    }
}
